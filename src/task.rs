// Task data model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned to a task when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh, time-ordered id
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            text: text.into(),
            done: false,
            created_at: now_ms(),
        }
    }
}

/// A task as found in storage. Lists written before tasks carried ids have
/// no `id`, and their `editing` field is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredTask {
    id: Option<TaskId>,
    text: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    created_at: i64,
}

impl StoredTask {
    /// Convert into a task, generating an id if none was stored.
    /// The flag is true when a new id had to be assigned.
    pub(crate) fn into_task(self) -> (Task, bool) {
        let assigned = self.id.is_none();
        let task = Task {
            id: self.id.unwrap_or_default(),
            text: self.text,
            done: self.done,
            created_at: self.created_at,
        };
        (task, assigned)
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("buy milk");
        assert_eq!(task.text, "buy milk");
        assert!(!task.done);
        assert!(task.created_at > 0);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("a");
        let b = Task::new("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_task_serialization() {
        let task = Task::new("write docs");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"text\":\"write docs\""));
        assert!(json.contains("\"done\":false"));
        assert!(!json.contains("editing"));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_legacy_task_without_id() {
        let json = r#"{"text":"old entry","done":true,"editing":true}"#;
        let stored: StoredTask = serde_json::from_str(json).unwrap();
        let (task, assigned) = stored.into_task();
        assert!(assigned);
        assert_eq!(task.text, "old entry");
        assert!(task.done);
        assert_eq!(task.created_at, 0);
    }

    #[test]
    fn test_stored_task_keeps_id() {
        let original = Task::new("current");
        let json = serde_json::to_string(&original).unwrap();
        let stored: StoredTask = serde_json::from_str(&json).unwrap();
        let (task, assigned) = stored.into_task();
        assert!(!assigned);
        assert_eq!(task, original);
    }

    #[test]
    fn test_task_id_parse() {
        let id = TaskId::new();
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<TaskId>().is_err());
    }
}
