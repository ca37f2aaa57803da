use crate::todo::todo_state::TodoState;
use tracing::{debug, info};

pub fn show_todos(state: &TodoState) {
    info!("=================================");
    debug!("| filter: {:?} dirty: {}", state.filter, state.dirty);
    if state.list.is_empty() {
        debug!("| no todos");
    } else {
        for todo in &state.list {
            debug!("| [{}] {}", todo.id, todo.title);
        }
    }
}
