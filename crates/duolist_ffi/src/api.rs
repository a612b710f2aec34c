//! FFI use-case API for the Flutter presentation layer.
//!
//! # Responsibility
//! - Expose one opaque session handle that owns the view model.
//! - Return render-ready snapshots after every intent.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Task keys cross the boundary as decimal epoch-millisecond strings.
//! - Modes cross the boundary as `work` or `travel`.

use duolist_core::{
    core_version as core_version_inner, default_log_level as default_log_level_inner,
    init_logging as init_logging_inner, ping as ping_inner, AppState, Mode, Mutation,
    PersistStatus, SqliteKeyValueStore, TaskKey, TodoService,
};
use log::error;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const DB_FILE_NAME: &str = "duolist.sqlite3";
const DB_PATH_ENV: &str = "DUOLIST_DB_PATH";

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Suggested level for `init_logging` in the current build mode.
#[flutter_rust_bridge::frb(sync)]
pub fn default_log_level() -> String {
    default_log_level_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the visible list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub key: String,
    pub text: String,
    pub finished: bool,
}

/// Everything the single screen needs to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    /// `work` or `travel`.
    pub mode: String,
    pub input_placeholder: String,
    pub draft: String,
    /// Tasks of the active mode only, oldest first.
    pub items: Vec<TaskItem>,
}

/// Result envelope for every mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the intent changed the view model.
    pub ok: bool,
    /// Whether the change reached durable storage.
    pub persisted: bool,
    /// Key of the created task, for add calls.
    pub key: Option<String>,
    pub message: String,
    pub snapshot: AppSnapshot,
}

/// Copy for the confirmation dialog shown before `delete_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: String,
    pub message: String,
    pub cancel_label: String,
    pub confirm_label: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn delete_prompt() -> DeletePrompt {
    DeletePrompt {
        title: "Delete To Do?".to_string(),
        message: "Are you sure?".to_string(),
        cancel_label: "Cancel".to_string(),
        confirm_label: "I'm sure".to_string(),
    }
}

struct Session {
    service: TodoService<SqliteKeyValueStore>,
    state: AppState,
}

/// Opaque handle owning the store connection and the view model.
#[flutter_rust_bridge::frb(opaque)]
pub struct TodoSession {
    inner: Mutex<Session>,
}

impl TodoSession {
    /// Opens the store at `db_path` and loads the persisted state.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(db_path: String) -> Result<TodoSession, String> {
        let store = SqliteKeyValueStore::open(db_path.trim())
            .map_err(|err| format!("store open failed: {err}"))?;
        let service = TodoService::new(store);
        let state = service.bootstrap();
        Ok(Self {
            inner: Mutex::new(Session { service, state }),
        })
    }

    /// Opens the store at `$DUOLIST_DB_PATH`, or in the temp dir.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open_default() -> Result<TodoSession, String> {
        Self::open(resolve_db_path().to_string_lossy().into_owned())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn snapshot(&self) -> AppSnapshot {
        self.lock()
            .map(|session| snapshot_of(&session.state))
            .unwrap_or_default()
    }

    /// Switches the active list. Unknown mode strings are rejected.
    #[flutter_rust_bridge::frb(sync)]
    pub fn set_mode(&self, mode: String) -> ActionResponse {
        let mode = match mode.parse::<Mode>() {
            Ok(mode) => mode,
            Err(err) => return self.rejected(err.to_string()),
        };
        self.apply("set_mode", |session| {
            let status = session.service.set_mode(&mut session.state, mode);
            Outcome::from_status(true, None, status, "Mode switched.")
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn add_task(&self, text: String) -> ActionResponse {
        self.apply("add_task", |session| {
            let mutation = session.service.add_task(&mut session.state, text);
            Outcome::from_added(mutation)
        })
    }

    /// Stores the input box text so it survives widget rebuilds.
    #[flutter_rust_bridge::frb(sync)]
    pub fn set_draft(&self, text: String) -> AppSnapshot {
        match self.lock() {
            Ok(mut session) => {
                let Session { service, state } = &mut *session;
                service.set_draft(state, text);
                snapshot_of(state)
            }
            Err(_) => AppSnapshot::default(),
        }
    }

    /// Adds the current draft as a task and clears the input on success.
    #[flutter_rust_bridge::frb(sync)]
    pub fn submit_draft(&self) -> ActionResponse {
        self.apply("submit_draft", |session| {
            let mutation = session.service.submit_draft(&mut session.state);
            Outcome::from_added(mutation)
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_finished(&self, key: String, finished: bool) -> ActionResponse {
        let key = match key.parse::<TaskKey>() {
            Ok(key) => key,
            Err(err) => return self.rejected(err.to_string()),
        };
        self.apply("set_finished", |session| {
            let Mutation { value, persist } =
                session.service.set_finished(&mut session.state, key, finished);
            if !value {
                return Outcome::unchanged("Task not found.");
            }
            Outcome::from_status(true, None, persist, "Task updated.")
        })
    }

    /// Deletes a task. Call only after the user confirmed `delete_prompt`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn delete_task(&self, key: String) -> ActionResponse {
        let key = match key.parse::<TaskKey>() {
            Ok(key) => key,
            Err(err) => return self.rejected(err.to_string()),
        };
        self.apply("delete_task", |session| {
            let Mutation { value, persist } = session.service.delete_task(&mut session.state, key);
            let message = if value {
                "Task deleted."
            } else {
                "Task not found."
            };
            Outcome::from_status(value, None, persist, message)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>, String> {
        self.inner.lock().map_err(|_| {
            error!("event=session_lock module=ffi status=error error_code=poisoned");
            "session state is unavailable".to_string()
        })
    }

    fn apply(&self, op: &str, f: impl FnOnce(&mut Session) -> Outcome) -> ActionResponse {
        let mut session = match self.lock() {
            Ok(session) => session,
            Err(message) => {
                return failure(format!("{op} failed: {message}"), AppSnapshot::default());
            }
        };
        let outcome = f(&mut *session);
        ActionResponse {
            ok: outcome.ok,
            persisted: outcome.persisted,
            key: outcome.key,
            message: outcome.message,
            snapshot: snapshot_of(&session.state),
        }
    }

    fn rejected(&self, message: String) -> ActionResponse {
        failure(message, self.snapshot())
    }
}

struct Outcome {
    ok: bool,
    persisted: bool,
    key: Option<String>,
    message: String,
}

impl Outcome {
    fn unchanged(message: &str) -> Self {
        Self {
            ok: false,
            persisted: false,
            key: None,
            message: message.to_string(),
        }
    }

    fn from_added(mutation: Mutation<Option<TaskKey>>) -> Self {
        match mutation.value {
            Some(key) => Self::from_status(
                true,
                Some(key.to_string()),
                mutation.persist,
                "Task added.",
            ),
            None => Self::unchanged("Nothing to add."),
        }
    }

    fn from_status(ok: bool, key: Option<String>, status: PersistStatus, message: &str) -> Self {
        let (persisted, message) = match status {
            PersistStatus::Saved => (true, message.to_string()),
            PersistStatus::Skipped => (false, message.to_string()),
            PersistStatus::Failed(err) => (false, format!("{message} Not saved: {err}")),
        };
        Self {
            ok,
            persisted,
            key,
            message,
        }
    }
}

fn failure(message: String, snapshot: AppSnapshot) -> ActionResponse {
    ActionResponse {
        ok: false,
        persisted: false,
        key: None,
        message,
        snapshot,
    }
}

fn snapshot_of(state: &AppState) -> AppSnapshot {
    AppSnapshot {
        mode: state.mode().as_str().to_string(),
        input_placeholder: state.mode().input_placeholder().to_string(),
        draft: state.draft().to_string(),
        items: state
            .visible_tasks()
            .map(|(key, task)| TaskItem {
                key: key.to_string(),
                text: task.text.clone(),
                finished: task.finished,
            })
            .collect(),
    }
}

fn resolve_db_path() -> PathBuf {
    std::env::var(DB_PATH_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
        .map_or_else(|| std::env::temp_dir().join(DB_FILE_NAME), PathBuf::from)
}
