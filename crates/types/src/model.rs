//! Typed domain model for the task backend.
//!
//! These are the parsed shapes of the backend's response envelope, stripped of
//! its wire quirks (single-vs-array fields, stringly-typed flags). The backend
//! crate owns the parsing; everything above it works with these types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque per-mutation transaction handle issued by the backend.
///
/// Obtained fresh before every mutating call and discarded afterwards; never
/// cached, reused or persisted. Its sole purpose is to give the backend an
/// undo scope for one logical action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline(pub String);

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The id triple addressing one task instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub list_id: String,
    pub taskseries_id: String,
    pub task_id: String,
}

/// Task priority as the backend encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    None,
}

impl Priority {
    /// Wire value for the backend's `priority` parameter.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::High => "1",
            Self::Medium => "2",
            Self::Low => "3",
            Self::None => "N",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::High),
            "2" => Ok(Self::Medium),
            "3" => Ok(Self::Low),
            "N" | "n" | "" => Ok(Self::None),
            other => Err(format!("priority must be 1, 2, 3 or N, got '{other}'")),
        }
    }
}

/// A task list (including smart lists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub name: String,
    pub smart: bool,
    pub archived: bool,
}

/// One task instance within a series (recurring tasks have several).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Due date string as the backend reports it; empty when unset.
    pub due: String,
    /// Completion timestamp; empty while the task is open.
    pub completed: String,
    pub priority: Priority,
}

impl Task {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.completed.is_empty()
    }
}

/// A note attached to a task series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
}

/// A task series: the named unit carrying tags, notes and task instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSeries {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
}

/// Task series grouped under the list that owns them, as the backend returns
/// them from a task query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBucket {
    pub list_id: String,
    pub series: Vec<TaskSeries>,
}

/// Account-level user settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub timezone: String,
    /// 0 = European (14/02/2026), 1 = American (02/14/2026).
    pub date_format: u8,
    /// Empty when the account has no default list.
    pub default_list_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_param_roundtrip() {
        for p in [Priority::High, Priority::Medium, Priority::Low, Priority::None] {
            assert_eq!(p.as_param().parse::<Priority>().unwrap(), p);
        }
    }

    #[test]
    fn test_priority_rejects_garbage() {
        assert!("4".parse::<Priority>().is_err());
        assert!("high".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_blank_is_none() {
        assert_eq!("".parse::<Priority>().unwrap(), Priority::None);
    }

    #[test]
    fn test_task_completion() {
        let open = Task {
            id: "t1".into(),
            due: String::new(),
            completed: String::new(),
            priority: Priority::None,
        };
        let done = Task {
            completed: "2026-08-01T10:00:00Z".into(),
            ..open.clone()
        };
        assert!(!open.is_completed());
        assert!(done.is_completed());
    }
}
