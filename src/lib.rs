// TodoStore - To-do list state container with durable key-value persistence

pub mod error;
pub mod filter;
pub mod storage;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use filter::{Filter, ParseFilterError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::{LoadOutcome, TODOS_KEY, TodoStore};
pub use task::{Task, TaskId, now_ms};
