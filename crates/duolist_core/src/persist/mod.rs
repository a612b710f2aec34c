//! Persistence adapter between the view model and the key-value store.
//!
//! # Responsibility
//! - Serialize mode and tasks under two fixed storage keys.
//! - Decode both the current versioned format and the legacy shape.
//!
//! # Invariants
//! - A stored tasks format newer than this binary is an error, never an
//!   empty list.
//! - Absent keys decode to defaults (`Mode::Work`, empty mapping).
//! - Loaded tasks pass `Task::validate`; invalid records fail the load.

use crate::model::task::TaskValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod task_persistence;
mod wire;

pub use task_persistence::{TaskPersistence, STORAGE_MODE_KEY, STORAGE_TASKS_KEY};
pub use wire::TASKS_FORMAT_VERSION;

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug)]
pub enum PersistError {
    Store(StoreError),
    Encode(serde_json::Error),
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
    UnsupportedVersion {
        found: u32,
        latest_supported: u32,
    },
    InvalidKey(String),
    InvalidTask {
        key: String,
        reason: TaskValidationError,
    },
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode state: {err}"),
            Self::Decode { key, source } => write!(f, "failed to decode `{key}`: {source}"),
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "stored tasks format version {found} is newer than supported {latest_supported}"
            ),
            Self::InvalidKey(value) => write!(f, "invalid stored task key `{value}`"),
            Self::InvalidTask { key, reason } => write!(f, "invalid stored task `{key}`: {reason}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::InvalidTask { reason, .. } => Some(reason),
            Self::UnsupportedVersion { .. } | Self::InvalidKey(_) => None,
        }
    }
}

impl From<StoreError> for PersistError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
