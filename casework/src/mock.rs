//! Test doubles for exercising runners and registries without a real backend.

use crate::{Abortable, Case, CaseError, CaseResult};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Parameters accepted by [`MockCase::execute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockParams {
    pub run_param: i64,
}

/// Configurable fake case with a short simulated workload.
///
/// The configured option selects the outcome: `"once"`, `"double"` and
/// `"triple"` resolve with a formatted string, anything else rejects with an
/// "Invalid testOption value" message. The case holds its own cancellation
/// token, checks it before and after the simulated delay, and settles with
/// [`CaseError::Aborted`] when it finds the token tripped.
pub struct MockCase {
    test_option: String,
    delay: Duration,
    token: CancellationToken,
}

impl MockCase {
    /// Factory; one instance per invocation, 10ms of simulated work.
    pub fn create(test_option: impl Into<String>) -> Self {
        Self::with_delay(test_option, Duration::from_millis(10))
    }

    /// Factory with a custom workload duration, for staleness scenarios.
    pub fn with_delay(test_option: impl Into<String>, delay: Duration) -> Self {
        MockCase {
            test_option: test_option.into(),
            delay,
            token: CancellationToken::new(),
        }
    }
}

impl Abortable for MockCase {
    fn on_abort(&self) {
        self.token.cancel();
    }
}

impl Case for MockCase {
    type Params = MockParams;
    type Value = String;
    type Error = CaseError;

    fn execute(
        &self,
        params: Self::Params,
        _origin: Option<&str>,
    ) -> impl Future<Output = CaseResult<Self::Value, Self::Error>> + Send {
        let test_option = self.test_option.clone();
        let delay = self.delay;
        let token = self.token.clone();
        async move {
            if token.is_cancelled() {
                return CaseResult::err(CaseError::Aborted);
            }

            sleep(delay).await;

            if token.is_cancelled() {
                return CaseResult::err(CaseError::Aborted);
            }

            match test_option.as_str() {
                "once" => CaseResult::ok(format!("Once - {}", params.run_param)),
                "double" => CaseResult::ok(format!("Double - {}", params.run_param * 2)),
                "triple" => CaseResult::ok(format!("Triple - {}", params.run_param * 3)),
                _ => CaseResult::err(CaseError::message("Invalid testOption value")),
            }
        }
    }
}

/// Abortable that only counts how often it was asked to abort.
#[derive(Debug, Default)]
pub struct AbortProbe {
    aborts: AtomicUsize,
}

impl AbortProbe {
    pub fn new() -> Self {
        AbortProbe::default()
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

impl Abortable for AbortProbe {
    fn on_abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}
