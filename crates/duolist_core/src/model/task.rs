//! Task domain model.
//!
//! # Responsibility
//! - Define the to-do record and the two-value mode it is filed under.
//! - Allocate creation-timestamp keys that never collide.
//!
//! # Invariants
//! - `TaskKey` is unique within one `TaskMapping` and never reused.
//! - `Task::text` is never empty, whether created or loaded from storage.
//! - Only `finished` changes after a task is created.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Active list filter. Also the category a task is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Work list. Used when nothing has been persisted yet.
    #[default]
    Work,
    /// Travel list.
    Travel,
}

impl Mode {
    /// Stable lowercase id used across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Travel => "travel",
        }
    }

    /// Header tab label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Travel => "Travel",
        }
    }

    /// Hint shown in the empty input box.
    pub fn input_placeholder(self) -> &'static str {
        match self {
            Self::Work => "Add a To Do",
            Self::Travel => "Where do you want to go?",
        }
    }

    /// Boolean flag form used by the `@mode` storage entry.
    pub fn is_working(self) -> bool {
        matches!(self, Self::Work)
    }

    pub fn from_working(working: bool) -> Self {
        if working {
            Self::Work
        } else {
            Self::Travel
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "travel" => Ok(Self::Travel),
            other => Err(TaskValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Creation timestamp in Unix epoch milliseconds, used as task identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey(i64);

impl TaskKey {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns a key for a task created at `now_ms` that is strictly greater
    /// than every key already in `tasks`.
    ///
    /// Returns `None` when the largest existing key is `i64::MAX`.
    pub fn allocate(now_ms: i64, tasks: &TaskMapping) -> Option<Self> {
        match tasks.keys().next_back() {
            Some(last) if last.0 >= now_ms => last.0.checked_add(1).map(Self),
            _ => Some(Self(now_ms)),
        }
    }
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskKey {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TaskValidationError::InvalidKey(value.to_string()))
    }
}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    pub category: Mode,
    pub finished: bool,
}

impl Task {
    /// Creates an unfinished task filed under `category`.
    ///
    /// # Errors
    /// - Returns `EmptyText` when `text` is the empty string.
    pub fn new(text: impl Into<String>, category: Mode) -> Result<Self, TaskValidationError> {
        let task = Self {
            text: text.into(),
            category,
            finished: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks invariants that `Deserialize` cannot enforce.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.text.is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }
}

/// All tasks keyed by creation timestamp. Key order is creation order.
pub type TaskMapping = BTreeMap<TaskKey, Task>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyText,
    InvalidKey(String),
    UnknownMode(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::InvalidKey(value) => write!(f, "task key must be epoch milliseconds, got `{value}`"),
            Self::UnknownMode(value) => {
                write!(f, "unknown mode `{value}`; expected work|travel")
            }
        }
    }
}

impl Error for TaskValidationError {}
