use tokio_util::sync::CancellationToken;

/// Capability of being cancelled while in flight.
///
/// Cancellation is cooperative and advisory: `on_abort` signals the work to
/// stop early, it never preempts it. Work that ignores the signal runs to
/// completion and its result is simply discarded from tracked state by the
/// registry's staleness check. The provided no-op body covers work with
/// nothing to cancel.
///
/// `on_abort` is called at most once per watch cycle by [`AbortRegistry`],
/// but implementations should tolerate repeated calls.
///
/// [`AbortRegistry`]: crate::AbortRegistry
pub trait Abortable: Send + Sync {
    fn on_abort(&self) {}
}

/// A token is its own abort handle.
impl Abortable for CancellationToken {
    fn on_abort(&self) {
        self.cancel();
    }
}
