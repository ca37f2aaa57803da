use crate::State;
use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::RecvError;

type Reducer<S> = Box<dyn FnOnce(S) -> S + Send>;
type Inspector<S> = Box<dyn FnOnce(S) + Send>;

/// Shared state container consumed by store-aware cases.
///
/// Cases only need its two capabilities: `get_state` for a snapshot and
/// `set_state` for a dispatched mutation. Reducers are serialized through an
/// internal queue on a dedicated task, so from the outside every update is
/// atomic. Reads queued with `with_state` run on the same task; the `biased`
/// select lets queued writes land before queued reads.
pub struct StateStore<S: State> {
    state: Mutable<S>,
    reducer_tx: UnboundedSender<Reducer<S>>,
    inspector_tx: UnboundedSender<Inspector<S>>,
}

impl<S: State> StateStore<S> {
    /// Spawns the queue-processing task; requires a running tokio runtime.
    pub fn new(initial_state: S) -> Self {
        let state = Mutable::new(initial_state);
        let (reducer_tx, reducer_rx) = mpsc::unbounded_channel();
        let (inspector_tx, inspector_rx) = mpsc::unbounded_channel();

        let queue_state = state.clone();
        tokio::spawn(async move {
            Self::process_queue(queue_state, reducer_rx, inspector_rx).await;
        });

        StateStore {
            state,
            reducer_tx,
            inspector_tx,
        }
    }

    async fn process_queue(
        state: Mutable<S>,
        mut reducer_rx: UnboundedReceiver<Reducer<S>>,
        mut inspector_rx: UnboundedReceiver<Inspector<S>>,
    ) {
        loop {
            tokio::select! {
                biased;
                Some(reducer) = reducer_rx.recv() => {
                    let next = reducer(state.get_cloned());
                    state.set(next);
                }
                Some(inspector) = inspector_rx.recv() => {
                    inspector(state.get_cloned());
                }
                else => break,
            }
        }
    }

    /// Dispatches a state mutation.
    pub fn set_state<F>(&self, reducer: F)
    where
        F: FnOnce(S) -> S + Send + 'static,
    {
        let _ = self.reducer_tx.send(Box::new(reducer));
    }

    /// Queues a read of the state behind all previously dispatched mutations.
    pub fn with_state<F>(&self, action: F)
    where
        F: FnOnce(S) + Send + 'static,
    {
        let _ = self.inspector_tx.send(Box::new(action));
    }

    /// Immediate snapshot of the current state.
    pub fn get_state(&self) -> S {
        self.state.get_cloned()
    }

    /// Snapshot taken after all currently queued mutations have applied.
    pub async fn await_state(&self) -> Result<S, RecvError> {
        let (tx, rx) = oneshot::channel();
        self.with_state(|state| {
            let _ = tx.send(state);
        });
        rx.await
    }

    pub fn to_signal(&self) -> MutableSignalCloned<S> {
        self.state.signal_cloned()
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<S>> {
        self.state.signal_cloned().to_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq, Default)]
    struct CounterState {
        counter: i32,
        label: String,
    }

    impl State for CounterState {}

    #[tokio::test]
    async fn test_initial_state() {
        let store = StateStore::new(CounterState {
            counter: 10,
            label: "ten".into(),
        });
        let state = store.get_state();
        assert_eq!(state.counter, 10);
        assert_eq!(state.label, "ten");
    }

    #[tokio::test]
    async fn test_set_state_applies_in_order() {
        let store = StateStore::new(CounterState::default());

        store.set_state(|state| CounterState {
            counter: state.counter + 1,
            ..state
        });
        store.set_state(|state| CounterState {
            counter: state.counter * 10,
            ..state
        });

        let state = store.await_state().await.unwrap();
        assert_eq!(state.counter, 10);
    }

    #[tokio::test]
    async fn test_with_state_sees_queued_mutations() {
        let store = StateStore::new(CounterState::default());
        let seen = Arc::new(Mutex::new(0));

        store.set_state(|state| CounterState {
            counter: 42,
            ..state
        });
        let seen_clone = seen.clone();
        store.with_state(move |state| {
            *seen_clone.lock().unwrap() = state.counter;
        });

        store.await_state().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_await_state() {
        let store = StateStore::new(CounterState::default());
        store.set_state(|state| CounterState {
            label: "updated".into(),
            ..state
        });
        let state = store.await_state().await.unwrap();
        assert_eq!(state.label, "updated");
    }
}
