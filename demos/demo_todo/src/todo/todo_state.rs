use casework::State;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Todo {
    pub id: String,
    pub title: String,
}

impl Todo {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Todo {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Shared application state for the to-do demo.
///
/// `dirty` counts how many times the list needs reloading; cases bump it
/// instead of reloading inline when they only invalidate the list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoState {
    pub list: Vec<Todo>,
    pub filter: String,
    pub dirty: u64,
    pub exit: bool,
}

impl State for TodoState {}

impl TodoState {
    pub fn updated_list(self, list: Vec<Todo>) -> Self {
        TodoState { list, ..self }
    }

    /// Optimistic removal, applied before the backend confirms.
    pub fn removed_item(mut self, id: &str) -> Self {
        self.list.retain(|todo| todo.id != id);
        self
    }

    pub fn updated_filter(self, filter: String) -> Self {
        if self.filter == filter {
            return self;
        }
        TodoState {
            filter,
            dirty: self.dirty + 1,
            ..self
        }
    }

    pub fn marked_dirty(self) -> Self {
        TodoState {
            dirty: self.dirty + 1,
            ..self
        }
    }

    pub fn set_exit(self) -> Self {
        TodoState { exit: true, ..self }
    }
}
