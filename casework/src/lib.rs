mod abort_registry;
mod abortable;
mod case;
mod case_error;
mod case_result;
mod case_runner;
mod case_status;
mod state_store;
mod stream_ext;
pub mod mock;

pub use abort_registry::*;
pub use abortable::*;
pub use case::*;
pub use case_error::*;
pub use case_result::*;
pub use case_runner::*;
pub use case_status::*;
pub use state_store::*;
pub use stream_ext::*;

/// Marker for application state held in a [`StateStore`].
pub trait State: Clone + Send + Sync + 'static {}
