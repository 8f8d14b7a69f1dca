pub mod todo;

pub use todo::{NewTodoItem, TITLE_MAX_LENGTH, TodoItem, UpdateTodoItem};
