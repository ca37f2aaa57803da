pub mod cases;
pub mod todo_api;
pub mod todo_state;
pub mod todo_view;
