use crate::{Abortable, CaseResult};
use std::future::Future;

/// One ephemeral unit of asynchronous work.
///
/// A case is created by its factory for every invocation, executes once, and
/// settles with a [`CaseResult`]. Expected failures come back as `Err`; a
/// case must not panic for conditions it anticipates. Cancellation is the
/// case's own job: it carries whatever handle it needs (typically a
/// `CancellationToken` wired into [`Abortable::on_abort`]), checks it at safe
/// points, and settles with its own "aborted" error when it finds the handle
/// tripped. The runner never synthesizes that error for it.
pub trait Case: Abortable + Send + Sync + 'static {
    type Params: Send;
    type Value: Clone + Send + Sync + 'static;
    type Error: Clone + Send + Sync + 'static;

    /// Runs the case once. `origin` tags the invocation for provenance
    /// tracking; cases that do not care may ignore it or echo it into the
    /// result.
    fn execute(
        &self,
        params: Self::Params,
        origin: Option<&str>,
    ) -> impl Future<Output = CaseResult<Self::Value, Self::Error>> + Send;
}
