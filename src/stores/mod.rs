//! The application's stores: a counter and a persisted todo list.

mod counter;
mod todo;

pub use counter::{CounterState, CounterStore};
pub use todo::{Todo, TodoError, TodoState, TodoStore, TODO_SCHEMA_VERSION, TODO_STORAGE_KEY};
