// Error types for TodoStore

use crate::task::TaskId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Index {index} out of range (list has {len} tasks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Storage could not be read or written. Never fatal: in-memory state is kept.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A stored value exists but cannot be decoded as text
    #[error("Corrupt stored value for '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "Index 3 out of range (list has 2 tasks)");

        let err = Error::Persistence("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Persistence error: quota exceeded");

        let err = Error::Corrupt {
            key: "todos".to_string(),
            reason: "invalid utf-8".to_string(),
        };
        assert_eq!(err.to_string(), "Corrupt stored value for 'todos': invalid utf-8");
    }

    #[test]
    fn test_io_error_maps_to_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Persistence(ref msg) if msg.contains("denied")));
    }
}
