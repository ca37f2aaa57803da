use crate::todo::todo_api::{ApiError, TodoApi};
use crate::todo::todo_state::{Todo, TodoState};
use casework::{Abortable, Case, CaseResult, StateStore};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Reloads the list from the backend using the filter currently in the
/// store, then dispatches the fresh list. Abortable: superseding runs cancel
/// the in-flight request through the token.
pub struct SynchronizeListCase {
    store: Arc<StateStore<TodoState>>,
    api: Arc<TodoApi>,
    token: CancellationToken,
}

impl SynchronizeListCase {
    pub fn create(store: Arc<StateStore<TodoState>>, api: Arc<TodoApi>) -> Self {
        SynchronizeListCase {
            store,
            api,
            token: CancellationToken::new(),
        }
    }
}

impl Abortable for SynchronizeListCase {
    fn on_abort(&self) {
        self.token.cancel();
    }
}

impl Case for SynchronizeListCase {
    type Params = ();
    type Value = Vec<Todo>;
    type Error = ApiError;

    fn execute(
        &self,
        _params: (),
        _origin: Option<&str>,
    ) -> impl Future<Output = CaseResult<Self::Value, Self::Error>> + Send {
        async move {
            // A filter dispatched just before this run is still in the reducer
            // queue; the snapshot has to queue behind it to see it applied.
            let filter = match self.store.await_state().await {
                Ok(state) => state.filter,
                Err(_) => self.store.get_state().filter,
            };
            match self.api.list(&filter, Some(&self.token)).await {
                Ok(list) => {
                    let fresh = list.clone();
                    self.store.set_state(move |state| state.updated_list(fresh));
                    CaseResult::ok(list)
                }
                Err(error) => {
                    warn!("SynchronizeListCase | {error}");
                    CaseResult::err(error)
                }
            }
        }
    }
}

/// Adds an item through the backend, then chains a synchronize so the list
/// reflects it.
pub struct AddItemCase {
    api: Arc<TodoApi>,
    sync: SynchronizeListCase,
}

impl AddItemCase {
    pub fn create(store: Arc<StateStore<TodoState>>, api: Arc<TodoApi>) -> Self {
        AddItemCase {
            api: api.clone(),
            sync: SynchronizeListCase::create(store, api),
        }
    }
}

impl Abortable for AddItemCase {}

impl Case for AddItemCase {
    type Params = Todo;
    type Value = ();
    type Error = ApiError;

    fn execute(
        &self,
        item: Todo,
        origin: Option<&str>,
    ) -> impl Future<Output = CaseResult<Self::Value, Self::Error>> + Send {
        async move {
            if let Err(error) = self.api.add(item, None).await {
                warn!("AddItemCase | {error}");
                return CaseResult::err(error);
            }

            // Chained case: the add is only as good as the reload after it.
            if let CaseResult::Err { error, origin } = self.sync.execute((), origin).await {
                return CaseResult::Err { error, origin };
            }

            CaseResult::ok(())
        }
    }
}

/// Removes an item optimistically: the store drops it immediately, the
/// backend confirms later, and the list is marked dirty either way.
pub struct RemoveItemCase {
    store: Arc<StateStore<TodoState>>,
    api: Arc<TodoApi>,
}

impl RemoveItemCase {
    pub fn create(store: Arc<StateStore<TodoState>>, api: Arc<TodoApi>) -> Self {
        RemoveItemCase { store, api }
    }
}

impl Abortable for RemoveItemCase {}

impl Case for RemoveItemCase {
    type Params = String;
    type Value = ();
    type Error = ApiError;

    fn execute(
        &self,
        id: String,
        _origin: Option<&str>,
    ) -> impl Future<Output = CaseResult<Self::Value, Self::Error>> + Send {
        async move {
            let optimistic = id.clone();
            self.store
                .set_state(move |state| state.removed_item(&optimistic));

            let result = self.api.remove(&id, None).await;
            if let Err(error) = &result {
                warn!("RemoveItemCase | {error}");
            }

            self.store.set_state(TodoState::marked_dirty);
            result.into()
        }
    }
}
