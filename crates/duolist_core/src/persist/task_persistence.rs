//! Loads and saves the two persisted app-state entries.
//!
//! # Invariants
//! - Only `STORAGE_MODE_KEY` and `STORAGE_TASKS_KEY` are ever written.
//! - Save paths write the full current value; there is no partial update.

use super::wire::{decode_mode, decode_tasks, encode_mode, encode_tasks};
use super::PersistResult;
use crate::model::task::{Mode, TaskMapping};
use crate::store::KeyValueStore;
use log::{debug, warn};

/// Storage key holding the last selected mode as a JSON boolean.
pub const STORAGE_MODE_KEY: &str = "@mode";
/// Storage key holding the task envelope.
pub const STORAGE_TASKS_KEY: &str = "@toDos";

/// Persistence adapter over any `KeyValueStore`.
pub struct TaskPersistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TaskPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the last selected mode. Absent entry yields `Mode::Work`.
    pub fn load_mode(&self) -> PersistResult<Mode> {
        match self.store.get_item(STORAGE_MODE_KEY)? {
            Some(raw) => decode_mode(&raw),
            None => Ok(Mode::default()),
        }
    }

    /// Reads all tasks. Absent entry yields an empty mapping.
    pub fn load_tasks(&self) -> PersistResult<TaskMapping> {
        match self.store.get_item(STORAGE_TASKS_KEY)? {
            Some(raw) => decode_tasks(&raw),
            None => Ok(TaskMapping::new()),
        }
    }

    pub fn save_mode(&self, mode: Mode) -> PersistResult<()> {
        let encoded = encode_mode(mode)?;
        self.store.set_item(STORAGE_MODE_KEY, &encoded)?;
        debug!("event=persist_mode module=persist status=ok mode={mode}");
        Ok(())
    }

    pub fn save_tasks(&self, tasks: &TaskMapping) -> PersistResult<()> {
        let encoded = encode_tasks(tasks)?;
        self.store.set_item(STORAGE_TASKS_KEY, &encoded)?;
        debug!(
            "event=persist_tasks module=persist status=ok count={}",
            tasks.len()
        );
        Ok(())
    }

    /// Like `load_mode`, but logs any failure and falls back to the default.
    pub fn load_mode_or_default(&self) -> Mode {
        self.load_mode().unwrap_or_else(|err| {
            warn!(
                "event=load_mode module=persist status=error fallback={} error={}",
                Mode::default(),
                err
            );
            Mode::default()
        })
    }

    /// Like `load_tasks`, but logs any failure and falls back to no tasks.
    pub fn load_tasks_or_default(&self) -> TaskMapping {
        self.load_tasks().unwrap_or_else(|err| {
            warn!(
                "event=load_tasks module=persist status=error fallback=empty error={}",
                err
            );
            TaskMapping::new()
        })
    }
}
