use crate::abort_registry::{AbortRegistry, ConcurrencyPolicy};
use crate::case::Case;
use crate::case_result::CaseResult;
use crate::case_status::{CaseState, Status, StatusFlags, StatusTracker};
use crate::state_store::StateStore;
use crate::{Abortable, State};
use futures_signals::signal::{MutableSignalCloned, SignalStream};
use std::future::Future;
use std::sync::Arc;

/// Runs factory-created [`Case`] instances and tracks their lifecycle.
///
/// One runner owns one [`AbortRegistry`] and one [`StatusTracker`] for one
/// logical caller scope; neither is ever shared between scopes. Each `run`
/// creates a fresh case from the factory, watches it, executes it, and
/// applies the outcome to the tracker only when the case is still watched
/// after the await. A case unwatched while suspended (aborted, or superseded
/// under [`ConcurrencyPolicy::Last`]) is stale: its result is still returned
/// to the caller that awaited it, but the tracked state never sees it. That
/// membership re-check, not settlement order, decides which overlapping run
/// wins the tracker.
///
/// Dropping the runner drops the registry, which aborts everything still in
/// flight.
pub struct CaseRunner<C: Case> {
    factory: Box<dyn Fn() -> C + Send + Sync>,
    registry: AbortRegistry,
    tracker: StatusTracker<C::Value, C::Error>,
    origin: Option<String>,
}

impl<C: Case> CaseRunner<C> {
    pub fn new(factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
        Self::with_policy(ConcurrencyPolicy::All, factory)
    }

    pub fn with_policy(
        policy: ConcurrencyPolicy,
        factory: impl Fn() -> C + Send + Sync + 'static,
    ) -> Self {
        CaseRunner {
            factory: Box::new(factory),
            registry: AbortRegistry::new(policy),
            tracker: StatusTracker::new(),
            origin: None,
        }
    }

    /// Factory with access to shared state: each invocation receives a handle
    /// to the store for snapshots (`get_state`) and dispatch (`set_state`).
    pub fn for_store<S: State>(
        store: Arc<StateStore<S>>,
        factory: impl Fn(Arc<StateStore<S>>) -> C + Send + Sync + 'static,
    ) -> Self {
        Self::new(move || factory(store.clone()))
    }

    pub fn for_store_with_policy<S: State>(
        policy: ConcurrencyPolicy,
        store: Arc<StateStore<S>>,
        factory: impl Fn(Arc<StateStore<S>>) -> C + Send + Sync + 'static,
    ) -> Self {
        Self::with_policy(policy, move || factory(store.clone()))
    }

    /// Default origin stamped on every run that does not pass its own.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub async fn run(&self, params: C::Params) -> CaseResult<C::Value, C::Error> {
        self.run_with_origin(params, None).await
    }

    /// Runs one fresh case instance to settlement.
    ///
    /// The tracker is started only when the registry accepts the watch; under
    /// [`ConcurrencyPolicy::First`] a refused case still executes (already
    /// aborted on arrival, so a cooperative case settles early) and its
    /// outcome is returned to the caller without touching the tracker.
    pub async fn run_with_origin(
        &self,
        params: C::Params,
        origin: Option<&str>,
    ) -> CaseResult<C::Value, C::Error> {
        let case = Arc::new((self.factory)());
        let handle: Arc<dyn Abortable> = case.clone();
        let accepted = self.registry.watch(handle);

        let origin = origin.or(self.origin.as_deref());
        if accepted {
            self.tracker.start(origin);
        }

        let result = case.execute(params, origin).await;

        // Freshness is decided here, after the await: the case may have been
        // aborted or superseded while suspended.
        if self.registry.watched(case.as_ref()) {
            self.registry.unwatch(case.as_ref());
            match &result {
                CaseResult::Ok {
                    value,
                    origin: result_origin,
                } => self
                    .tracker
                    .resolve(value.clone(), result_origin.as_deref().or(origin)),
                CaseResult::Err {
                    error,
                    origin: result_origin,
                } => self
                    .tracker
                    .reject(error.clone(), result_origin.as_deref().or(origin)),
            }
        }

        result
    }

    /// Aborts every case currently in flight for this runner.
    pub fn abort(&self) {
        self.registry.abort();
    }

    /// Resets the tracker to its initial state. In-flight cases are left
    /// alone; their results will apply as usual unless aborted.
    pub fn reset(&self) {
        self.tracker.reset();
    }

    pub fn state(&self) -> CaseState<C::Value, C::Error> {
        self.tracker.get()
    }

    pub fn status(&self) -> Status {
        self.tracker.status()
    }

    pub fn flags(&self) -> StatusFlags {
        self.tracker.flags()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<CaseState<C::Value, C::Error>> {
        self.tracker.to_signal()
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<CaseState<C::Value, C::Error>>> {
        self.tracker.to_stream()
    }

    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }
}

/// Runs function-style cases: a plain async function re-invoked fresh per
/// call with a clone of the runner's options.
///
/// There is no registry here; a function case has no abort hook, so
/// cancellation stays external (a token inside the options, or none at all)
/// and every outcome is applied to the tracker.
pub struct FnCaseRunner<O, F, V: Clone, E: Clone> {
    func: F,
    options: O,
    tracker: StatusTracker<V, E>,
    origin: Option<String>,
}

impl<O, F, V, E> FnCaseRunner<O, F, V, E>
where
    O: Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(options: O, func: F) -> Self {
        FnCaseRunner {
            func,
            options,
            tracker: StatusTracker::new(),
            origin: None,
        }
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub async fn run<P, Fut>(&self, params: P) -> CaseResult<V, E>
    where
        F: Fn(P, O, Option<String>) -> Fut,
        Fut: Future<Output = CaseResult<V, E>>,
    {
        self.run_with_origin(params, None).await
    }

    pub async fn run_with_origin<P, Fut>(
        &self,
        params: P,
        origin: Option<&str>,
    ) -> CaseResult<V, E>
    where
        F: Fn(P, O, Option<String>) -> Fut,
        Fut: Future<Output = CaseResult<V, E>>,
    {
        let origin = origin.or(self.origin.as_deref()).map(str::to_owned);
        self.tracker.start(origin.as_deref());

        let result = (self.func)(params, self.options.clone(), origin.clone()).await;

        match &result {
            CaseResult::Ok {
                value,
                origin: result_origin,
            } => self
                .tracker
                .resolve(value.clone(), result_origin.as_deref().or(origin.as_deref())),
            CaseResult::Err {
                error,
                origin: result_origin,
            } => self
                .tracker
                .reject(error.clone(), result_origin.as_deref().or(origin.as_deref())),
        }

        result
    }

    pub fn reset(&self) {
        self.tracker.reset();
    }

    pub fn state(&self) -> CaseState<V, E> {
        self.tracker.get()
    }

    pub fn status(&self) -> Status {
        self.tracker.status()
    }

    pub fn flags(&self) -> StatusFlags {
        self.tracker.flags()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<CaseState<V, E>> {
        self.tracker.to_signal()
    }
}

/// Builds a function-style runner whose function receives the store handle as
/// its first argument on every call.
pub fn fn_case_runner_for_store<S, O, P, V, E, G, Fut>(
    store: Arc<StateStore<S>>,
    options: O,
    func: G,
) -> FnCaseRunner<O, impl Fn(P, O, Option<String>) -> Fut, V, E>
where
    S: State,
    O: Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    G: Fn(Arc<StateStore<S>>, P, O, Option<String>) -> Fut,
    Fut: Future<Output = CaseResult<V, E>>,
{
    FnCaseRunner::new(options, move |params, options, origin| {
        func(store.clone(), params, options, origin)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCase, MockParams};
    use crate::CaseError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_run_resolves_double() {
        let runner = CaseRunner::new(|| MockCase::create("double"));
        assert!(runner.status().is_initial());

        let result = runner.run(MockParams { run_param: 5 }).await;
        assert_eq!(result, CaseResult::ok("Double - 10".to_string()));

        let state = runner.state();
        assert_eq!(state.status, Status::Resolved);
        assert_eq!(state.value.as_deref(), Some("Double - 10"));
        assert!(state.error.is_none());
        assert_eq!(runner.in_flight(), 0);

        // A second run reuses the same tracker.
        let result = runner.run(MockParams { run_param: 3 }).await;
        assert_eq!(result.into_value().as_deref(), Some("Double - 6"));
    }

    #[tokio::test]
    async fn test_run_rejects_unsupported_option() {
        let runner = CaseRunner::new(|| MockCase::create("unsupported"));

        let result = runner.run(MockParams { run_param: 1 }).await;
        assert!(result.is_err());
        assert_eq!(
            result.error(),
            Some(&CaseError::message("Invalid testOption value"))
        );

        let state = runner.state();
        assert_eq!(state.status, Status::Rejected);
        assert!(state.value.is_none());
        assert_eq!(
            state.error,
            Some(CaseError::message("Invalid testOption value"))
        );
    }

    #[tokio::test]
    async fn test_origin_stamping_and_fallback() {
        let runner = CaseRunner::new(|| MockCase::create("once")).origin("runner-default");

        runner.run(MockParams { run_param: 1 }).await;
        assert_eq!(runner.state().origin.as_deref(), Some("runner-default"));

        runner
            .run_with_origin(MockParams { run_param: 2 }, Some("per-call"))
            .await;
        assert_eq!(runner.state().origin.as_deref(), Some("per-call"));
    }

    #[tokio::test]
    async fn test_abort_returns_true_result_but_skips_tracker() {
        let runner =
            CaseRunner::new(|| MockCase::with_delay("once", Duration::from_millis(100)));

        let run = runner.run_with_origin(MockParams { run_param: 7 }, Some("slow"));
        let interrupt = async {
            sleep(Duration::from_millis(20)).await;
            runner.abort();
        };
        let (result, ()) = tokio::join!(run, interrupt);

        // The direct caller sees the case's true outcome.
        assert_eq!(result.into_error(), Some(CaseError::Aborted));

        // The stale settlement never reached the tracker.
        let state = runner.state();
        assert_eq!(state.status, Status::Pending);
        assert!(state.value.is_none());
        assert!(state.error.is_none());
        assert_eq!(runner.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_last_policy_superseding_run_wins_regardless_of_settlement_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = CaseRunner::with_policy(ConcurrencyPolicy::Last, {
            let calls = calls.clone();
            move || {
                // First invocation is slow, the superseding one is fast.
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    MockCase::with_delay("once", Duration::from_millis(100))
                } else {
                    MockCase::create("double")
                }
            }
        });

        let slow = runner.run_with_origin(MockParams { run_param: 1 }, Some("slow"));
        let fast = async {
            sleep(Duration::from_millis(20)).await;
            runner
                .run_with_origin(MockParams { run_param: 5 }, Some("fast"))
                .await
        };
        let (slow_result, fast_result) = tokio::join!(slow, fast);

        // The superseded case was aborted but still reports its own outcome.
        assert_eq!(slow_result.into_error(), Some(CaseError::Aborted));
        assert_eq!(fast_result, CaseResult::ok("Double - 10".to_string()));

        // Only the superseding run reached the tracker, even though the slow
        // case settled last.
        let state = runner.state();
        assert_eq!(state.status, Status::Resolved);
        assert_eq!(state.value.as_deref(), Some("Double - 10"));
        assert_eq!(state.origin.as_deref(), Some("fast"));
    }

    #[tokio::test]
    async fn test_first_policy_refuses_newcomer_without_touching_tracker() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = CaseRunner::with_policy(ConcurrencyPolicy::First, {
            let calls = calls.clone();
            move || {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    MockCase::with_delay("double", Duration::from_millis(50))
                } else {
                    MockCase::create("triple")
                }
            }
        });

        let first = runner.run_with_origin(MockParams { run_param: 5 }, Some("first"));
        let second = async {
            sleep(Duration::from_millis(10)).await;
            runner
                .run_with_origin(MockParams { run_param: 5 }, Some("second"))
                .await
        };
        let (first_result, second_result) = tokio::join!(first, second);

        assert_eq!(first_result, CaseResult::ok("Double - 10".to_string()));
        // Aborted on arrival; the cooperative case settled early.
        assert_eq!(second_result.into_error(), Some(CaseError::Aborted));

        // The refused run never started nor settled the tracker.
        let state = runner.state();
        assert_eq!(state.status, Status::Resolved);
        assert_eq!(state.value.as_deref(), Some("Double - 10"));
        assert_eq!(state.origin.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_reset_clears_tracker() {
        let runner = CaseRunner::new(|| MockCase::create("once"));
        runner.run(MockParams { run_param: 9 }).await;
        assert!(runner.status().is_resolved());

        runner.reset();
        let state = runner.state();
        assert_eq!(state.status, Status::Initial);
        assert!(state.value.is_none());
        assert!(state.origin.is_none());
    }

    #[tokio::test]
    async fn test_fn_case_runner_applies_outcomes() {
        let runner = FnCaseRunner::new(
            "double".to_string(),
            |params: i64, options: String, _origin: Option<String>| async move {
                match options.as_str() {
                    "double" => CaseResult::ok(params * 2),
                    _ => CaseResult::err(CaseError::message("Invalid testOption value")),
                }
            },
        );

        let result = runner.run_with_origin(21, Some("calc")).await;
        assert_eq!(result, CaseResult::ok(42));

        let state = runner.state();
        assert_eq!(state.status, Status::Resolved);
        assert_eq!(state.value, Some(42));
        assert_eq!(state.origin.as_deref(), Some("calc"));
    }

    #[tokio::test]
    async fn test_fn_case_runner_rejects() {
        let runner = FnCaseRunner::new(
            "unsupported".to_string(),
            |_params: i64, options: String, _origin: Option<String>| async move {
                match options.as_str() {
                    "double" => CaseResult::ok(0i64),
                    _ => CaseResult::err(CaseError::message("Invalid testOption value")),
                }
            },
        )
        .origin("fn-case");

        let result = runner.run(1).await;
        assert!(result.is_err());

        let state = runner.state();
        assert_eq!(state.status, Status::Rejected);
        assert_eq!(state.origin.as_deref(), Some("fn-case"));
    }

    #[derive(Clone, Debug, PartialEq, Default)]
    struct TallyState {
        total: i64,
    }

    impl State for TallyState {}

    struct AddToTallyCase {
        store: Arc<StateStore<TallyState>>,
    }

    impl Abortable for AddToTallyCase {}

    impl Case for AddToTallyCase {
        type Params = i64;
        type Value = i64;
        type Error = CaseError;

        fn execute(
            &self,
            params: Self::Params,
            _origin: Option<&str>,
        ) -> impl Future<Output = CaseResult<Self::Value, Self::Error>> + Send {
            let store = self.store.clone();
            async move {
                store.set_state(move |state| TallyState {
                    total: state.total + params,
                });
                match store.await_state().await {
                    Ok(state) => CaseResult::ok(state.total),
                    Err(e) => CaseResult::err(CaseError::message(e.to_string())),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_store_aware_case_dispatches_and_snapshots() {
        let store = Arc::new(StateStore::new(TallyState::default()));
        let runner =
            CaseRunner::for_store(store.clone(), |store| AddToTallyCase { store });

        let result = runner.run(5).await;
        assert_eq!(result, CaseResult::ok(5));
        let result = runner.run(7).await;
        assert_eq!(result, CaseResult::ok(12));

        assert_eq!(store.get_state().total, 12);
        assert_eq!(runner.state().value, Some(12));
    }

    #[tokio::test]
    async fn test_fn_case_runner_for_store() {
        let store = Arc::new(StateStore::new(TallyState::default()));
        let runner = fn_case_runner_for_store(
            store.clone(),
            (),
            |store: Arc<StateStore<TallyState>>, params: i64, _options: (), _origin: Option<String>| async move {
                store.set_state(move |state| TallyState {
                    total: state.total + params,
                });
                match store.await_state().await {
                    Ok(state) => CaseResult::ok(state.total),
                    Err(e) => CaseResult::err(CaseError::message(e.to_string())),
                }
            },
        );

        let result = runner.run(3).await;
        assert_eq!(result, CaseResult::ok(3));
        assert_eq!(store.get_state().total, 3);
        assert_eq!(runner.status(), Status::Resolved);
    }
}
