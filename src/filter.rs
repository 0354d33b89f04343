// Display filter for the task list

use crate::task::Task;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which tasks a filtered view exposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Active,
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.done,
            Filter::Active => !task.done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Active => "active",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when parsing a filter name that isn't all/completed/active
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter '{0}' (expected all, completed or active)")]
pub struct ParseFilterError(String);

impl std::str::FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "completed" => Ok(Filter::Completed),
            "active" => Ok(Filter::Active),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all() {
        assert_eq!(Filter::default(), Filter::All);
    }

    #[test]
    fn test_filter_matches() {
        let mut task = Task::new("x");
        assert!(Filter::All.matches(&task));
        assert!(Filter::Active.matches(&task));
        assert!(!Filter::Completed.matches(&task));

        task.done = true;
        assert!(Filter::All.matches(&task));
        assert!(!Filter::Active.matches(&task));
        assert!(Filter::Completed.matches(&task));
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!("Completed".parse::<Filter>().unwrap(), Filter::Completed);
        assert_eq!(" active ".parse::<Filter>().unwrap(), Filter::Active);
        let err = "done".parse::<Filter>().unwrap_err();
        assert_eq!(err.to_string(), "unknown filter 'done' (expected all, completed or active)");
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::All.to_string(), "all");
        assert_eq!(Filter::Completed.to_string(), "completed");
        assert_eq!(Filter::Active.to_string(), "active");
    }

    #[test]
    fn test_filter_serialization() {
        let json = serde_json::to_string(&Filter::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
