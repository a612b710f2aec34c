//! On-disk JSON shapes for the `@mode` and `@toDos` entries.

use super::{PersistError, PersistResult, STORAGE_MODE_KEY, STORAGE_TASKS_KEY};
use crate::model::task::{Mode, Task, TaskKey, TaskMapping};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Current `@toDos` envelope version written by this binary.
pub const TASKS_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct TasksEnvelopeOut<'a> {
    version: u32,
    tasks: BTreeMap<String, &'a Task>,
}

#[derive(Deserialize)]
struct TasksEnvelopeIn {
    version: u32,
    #[serde(default)]
    tasks: Value,
}

/// Unversioned record written by the first release of the app.
#[derive(Deserialize)]
struct LegacyTask {
    text: String,
    working: bool,
    #[serde(default)]
    finished: bool,
}

impl From<LegacyTask> for Task {
    fn from(value: LegacyTask) -> Self {
        Self {
            text: value.text,
            category: Mode::from_working(value.working),
            finished: value.finished,
        }
    }
}

pub(super) fn encode_mode(mode: Mode) -> PersistResult<String> {
    serde_json::to_string(&mode.is_working()).map_err(PersistError::Encode)
}

pub(super) fn decode_mode(raw: &str) -> PersistResult<Mode> {
    let working = serde_json::from_str::<Option<bool>>(raw).map_err(|source| {
        PersistError::Decode {
            key: STORAGE_MODE_KEY,
            source,
        }
    })?;
    Ok(working.map(Mode::from_working).unwrap_or_default())
}

pub(super) fn encode_tasks(tasks: &TaskMapping) -> PersistResult<String> {
    let envelope = TasksEnvelopeOut {
        version: TASKS_FORMAT_VERSION,
        tasks: tasks
            .iter()
            .map(|(key, task)| (key.to_string(), task))
            .collect(),
    };
    serde_json::to_string(&envelope).map_err(PersistError::Encode)
}

pub(super) fn decode_tasks(raw: &str) -> PersistResult<TaskMapping> {
    if raw.trim().is_empty() {
        return Ok(TaskMapping::new());
    }

    let value = serde_json::from_str::<Value>(raw).map_err(decode_error)?;
    if value.is_null() {
        return Ok(TaskMapping::new());
    }

    let versioned = value
        .as_object()
        .is_some_and(|object| object.contains_key("version"));
    if !versioned {
        let records = serde_json::from_value::<BTreeMap<String, LegacyTask>>(value)
            .map_err(decode_error)?;
        return collect_keyed(records);
    }

    let envelope = serde_json::from_value::<TasksEnvelopeIn>(value).map_err(decode_error)?;
    if envelope.version > TASKS_FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: envelope.version,
            latest_supported: TASKS_FORMAT_VERSION,
        });
    }
    if envelope.tasks.is_null() {
        return Ok(TaskMapping::new());
    }
    let records =
        serde_json::from_value::<BTreeMap<String, Task>>(envelope.tasks).map_err(decode_error)?;
    collect_keyed(records)
}

fn collect_keyed<T: Into<Task>>(records: BTreeMap<String, T>) -> PersistResult<TaskMapping> {
    records
        .into_iter()
        .map(|(raw_key, record)| {
            let Ok(key) = raw_key.parse::<TaskKey>() else {
                return Err(PersistError::InvalidKey(raw_key));
            };
            let task: Task = record.into();
            task.validate().map_err(|reason| PersistError::InvalidTask {
                key: raw_key,
                reason,
            })?;
            Ok((key, task))
        })
        .collect()
}

fn decode_error(source: serde_json::Error) -> PersistError {
    PersistError::Decode {
        key: STORAGE_TASKS_KEY,
        source,
    }
}
