use crate::todo::cases::{AddItemCase, RemoveItemCase, SynchronizeListCase};
use crate::todo::todo_api::{ApiError, TodoApi};
use crate::todo::todo_state::{Todo, TodoState};
use crate::todo::todo_view::show_todos;
use crate::tracing_setup::tracing_init;
use casework::{
    fn_case_runner_for_store, CaseResult, CaseRunner, CaseStreamExt, ConcurrencyPolicy, StateStore,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

mod todo;
mod tracing_setup;

#[tokio::main]
async fn main() {
    tracing_init();

    let store = Arc::new(StateStore::new(TodoState::default()));
    let api = Arc::new(TodoApi::new());

    let scenario_store = store.clone();
    tokio::spawn(async move {
        run_scenario(scenario_store, api).await;
    });

    store
        .to_stream()
        .stop_after(|state| state.exit)
        .for_each(|state| {
            show_todos(&state);
            async {}
        })
        .await;

    info!("=================================");
    info!("  Main thread | Finish");
}

async fn run_scenario(store: Arc<StateStore<TodoState>>, api: Arc<TodoApi>) {
    let add_runner = CaseRunner::for_store(store.clone(), {
        let api = api.clone();
        move |store| AddItemCase::create(store, api.clone())
    })
    .origin("add-form");

    let remove_runner = CaseRunner::for_store(store.clone(), {
        let api = api.clone();
        move |store| RemoveItemCase::create(store, api.clone())
    })
    .origin("remove-button");

    // Superseding reloads cancel the one in flight.
    let sync_runner = CaseRunner::for_store_with_policy(ConcurrencyPolicy::Last, store.clone(), {
        let api = api.clone();
        move |store| SynchronizeListCase::create(store, api.clone())
    })
    .origin("sync");

    let filter_runner = fn_case_runner_for_store(
        store.clone(),
        (),
        |store: Arc<StateStore<TodoState>>, filter: String, _options: (), _origin: Option<String>| async move {
            let dispatched = filter.clone();
            store.set_state(move |state| state.updated_filter(dispatched));
            CaseResult::<String, ApiError>::ok(filter)
        },
    )
    .origin("filter-box");

    warn!("Scenario | add three items");
    for (id, title) in [
        ("1", "Learn Async Rust"),
        ("2", "Water the plants"),
        ("3", "Read the Rust book"),
    ] {
        let result = add_runner.run(Todo::new(id, title)).await;
        info!("Scenario | add {title:?} -> ok: {}", result.is_ok());
    }
    sleep(Duration::from_millis(300)).await;

    warn!("Scenario | filter while a reload is in flight (last one wins)");
    let stale = sync_runner.run_with_origin((), Some("reload-all"));
    let fresh = async {
        sleep(Duration::from_millis(50)).await;
        filter_runner.run("rust".to_string()).await;
        sync_runner.run_with_origin((), Some("reload-filtered")).await
    };
    let (stale_result, fresh_result) = tokio::join!(stale, fresh);
    info!(
        "Scenario | superseded reload: {:?}, applied reload: {} item(s)",
        stale_result.into_error(),
        fresh_result.into_value().map_or(0, |list| list.len()),
    );
    info!("Scenario | sync tracker: {:?}", sync_runner.state().origin);
    sleep(Duration::from_millis(300)).await;

    warn!("Scenario | clear the filter and reload");
    filter_runner.run(String::new()).await;
    sync_runner.run(()).await;
    sleep(Duration::from_millis(300)).await;

    warn!("Scenario | remove an item optimistically");
    let result = remove_runner.run("2".to_string()).await;
    info!("Scenario | remove -> ok: {}", result.is_ok());
    sync_runner.run(()).await;
    sleep(Duration::from_millis(300)).await;

    store.set_state(TodoState::set_exit);
}
