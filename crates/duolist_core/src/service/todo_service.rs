//! View-model controller for the two-mode to-do list.
//!
//! # Responsibility
//! - Apply user intents (add, toggle, delete, switch mode) to `AppState`.
//! - Persist the affected entry right after each in-memory change.
//!
//! # Invariants
//! - The in-memory change is applied before, and independently of, the write.
//! - A failed write is logged and reported, never rolled back.
//! - Task text is never written to logs.

use crate::model::task::{Mode, Task, TaskKey, TaskMapping};
use crate::persist::{PersistError, TaskPersistence};
use crate::store::KeyValueStore;
use log::{info, warn};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of creation timestamps for new task keys.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock in Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}

/// In-memory view model rendered by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub(crate) mode: Mode,
    pub(crate) tasks: TaskMapping,
    pub(crate) draft: String,
}

impl AppState {
    pub fn new(mode: Mode, tasks: TaskMapping) -> Self {
        Self {
            mode,
            tasks,
            draft: String::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tasks(&self) -> &TaskMapping {
        &self.tasks
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn task(&self, key: TaskKey) -> Option<&Task> {
        self.tasks.get(&key)
    }

    /// Tasks filed under `mode`, in creation order.
    pub fn tasks_in(&self, mode: Mode) -> impl Iterator<Item = (TaskKey, &Task)> + '_ {
        self.tasks
            .iter()
            .filter(move |(_, task)| task.category == mode)
            .map(|(key, task)| (*key, task))
    }

    /// Tasks for the currently selected mode, in creation order.
    pub fn visible_tasks(&self) -> impl Iterator<Item = (TaskKey, &Task)> + '_ {
        self.tasks_in(self.mode)
    }
}

/// Outcome of the write that follows an in-memory change.
#[derive(Debug)]
pub enum PersistStatus {
    Saved,
    /// Nothing changed, so nothing was written.
    Skipped,
    Failed(PersistError),
}

impl PersistStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }

    pub fn error(&self) -> Option<&PersistError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Saved | Self::Skipped => None,
        }
    }
}

/// Result of one mutating intent.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub persist: PersistStatus,
}

impl<T> Mutation<T> {
    fn skipped(value: T) -> Self {
        Self {
            value,
            persist: PersistStatus::Skipped,
        }
    }
}

/// Single controller that owns persistence and mutates `AppState`.
pub struct TodoService<S: KeyValueStore, C: Clock = SystemClock> {
    persistence: TaskPersistence<S>,
    clock: C,
}

impl<S: KeyValueStore> TodoService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TodoService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            persistence: TaskPersistence::new(store),
            clock,
        }
    }

    pub fn persistence(&self) -> &TaskPersistence<S> {
        &self.persistence
    }

    /// Loads both persisted entries before first render.
    ///
    /// Load failures are logged and replaced by defaults.
    pub fn bootstrap(&self) -> AppState {
        let state = AppState::new(
            self.persistence.load_mode_or_default(),
            self.persistence.load_tasks_or_default(),
        );
        info!(
            "event=app_bootstrap module=service status=ok mode={} task_count={}",
            state.mode,
            state.tasks.len()
        );
        state
    }

    pub fn set_mode(&self, state: &mut AppState, mode: Mode) -> PersistStatus {
        state.mode = mode;
        let status = into_status(self.persistence.save_mode(mode));
        log_mutation("mode_set", &status);
        status
    }

    /// Files a new unfinished task under the current mode.
    ///
    /// Empty `text` is a no-op and returns `None`. So is an add when no key
    /// above the largest existing one is left.
    pub fn add_task(
        &self,
        state: &mut AppState,
        text: impl Into<String>,
    ) -> Mutation<Option<TaskKey>> {
        let task = match Task::new(text, state.mode) {
            Ok(task) => task,
            Err(_) => return Mutation::skipped(None),
        };

        let Some(key) = TaskKey::allocate(self.clock.now_ms(), &state.tasks) else {
            warn!("event=task_add module=service status=skipped reason=key_space_exhausted");
            return Mutation::skipped(None);
        };
        state.tasks.insert(key, task);

        let persist = into_status(self.persistence.save_tasks(&state.tasks));
        log_mutation("task_add", &persist);
        Mutation {
            value: Some(key),
            persist,
        }
    }

    /// Sets the finished flag. Unknown keys are a no-op returning `false`.
    pub fn set_finished(
        &self,
        state: &mut AppState,
        key: TaskKey,
        finished: bool,
    ) -> Mutation<bool> {
        let Some(task) = state.tasks.get_mut(&key) else {
            warn!("event=task_finish module=service status=skipped reason=not_found key={key}");
            return Mutation::skipped(false);
        };
        task.finished = finished;

        let persist = into_status(self.persistence.save_tasks(&state.tasks));
        log_mutation("task_finish", &persist);
        Mutation {
            value: true,
            persist,
        }
    }

    /// Removes a task. The mapping is written even when `key` was absent.
    ///
    /// Callers confirm with the user before invoking this.
    pub fn delete_task(&self, state: &mut AppState, key: TaskKey) -> Mutation<bool> {
        let removed = state.tasks.remove(&key).is_some();
        let persist = into_status(self.persistence.save_tasks(&state.tasks));
        log_mutation("task_delete", &persist);
        Mutation {
            value: removed,
            persist,
        }
    }

    /// Replaces the input box text. Drafts are not persisted.
    pub fn set_draft(&self, state: &mut AppState, text: impl Into<String>) {
        state.draft = text.into();
    }

    /// Adds the draft as a task and clears it when a task was created.
    pub fn submit_draft(&self, state: &mut AppState) -> Mutation<Option<TaskKey>> {
        let text = state.draft.clone();
        let mutation = self.add_task(state, text);
        if mutation.value.is_some() {
            state.draft.clear();
        }
        mutation
    }
}

fn into_status(result: Result<(), PersistError>) -> PersistStatus {
    match result {
        Ok(()) => PersistStatus::Saved,
        Err(err) => PersistStatus::Failed(err),
    }
}

fn log_mutation(event: &str, status: &PersistStatus) {
    match status {
        PersistStatus::Saved => info!("event={event} module=service status=ok"),
        PersistStatus::Skipped => info!("event={event} module=service status=skipped"),
        PersistStatus::Failed(err) => {
            warn!("event={event} module=service status=error persisted=false error={err}")
        }
    }
}
