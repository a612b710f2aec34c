use duolist_core::persist::STORAGE_TASKS_KEY;
use duolist_core::{
    Clock, KeyValueStore, MemoryKeyValueStore, Mode, PersistStatus, SqliteKeyValueStore,
    StoreError, StoreResult, TaskKey, TodoService,
};
use std::cell::Cell;

/// Clock that returns a fixed instant until moved.
struct FixedClock(Cell<i64>);

impl FixedClock {
    fn at(millis: i64) -> Self {
        Self(Cell::new(millis))
    }
}

impl Clock for &FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

/// Store whose writes always fail; reads see nothing.
struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get_item(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("disk ejected".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("disk ejected".to_string()))
    }
}

fn texts(state: &duolist_core::AppState, mode: Mode) -> Vec<String> {
    state
        .tasks_in(mode)
        .map(|(_, task)| task.text.clone())
        .collect()
}

#[test]
fn bootstrap_on_empty_storage_starts_in_work_with_no_tasks() {
    let service = TodoService::new(MemoryKeyValueStore::new());
    let state = service.bootstrap();

    assert_eq!(state.mode(), Mode::Work);
    assert!(state.tasks().is_empty());
    assert_eq!(state.draft(), "");
}

#[test]
fn empty_text_add_is_a_no_op() {
    let store = MemoryKeyValueStore::new();
    let service = TodoService::new(&store);
    let mut state = service.bootstrap();

    let mutation = service.add_task(&mut state, "");
    assert_eq!(mutation.value, None);
    assert!(matches!(mutation.persist, PersistStatus::Skipped));
    assert!(state.tasks().is_empty());
    assert_eq!(store.get_item(STORAGE_TASKS_KEY).unwrap(), None);
}

#[test]
fn work_task_is_hidden_from_travel_view() {
    let service = TodoService::new(MemoryKeyValueStore::new());
    let mut state = service.bootstrap();

    let key = service.add_task(&mut state, "Prepare slides").value.unwrap();
    let task = state.task(key).unwrap();
    assert_eq!(task.category, Mode::Work);
    assert!(!task.finished);
    assert!(state.tasks_in(Mode::Travel).next().is_none());
}

#[test]
fn toggling_unknown_key_leaves_tasks_unchanged() {
    let service = TodoService::new(MemoryKeyValueStore::new());
    let mut state = service.bootstrap();
    service.add_task(&mut state, "Buy milk");
    let before = state.tasks().clone();

    let mutation = service.set_finished(&mut state, TaskKey::from_millis(42), true);
    assert!(!mutation.value);
    assert!(matches!(mutation.persist, PersistStatus::Skipped));
    assert_eq!(state.tasks(), &before);
}

#[test]
fn toggling_finished_is_persisted() {
    let store = MemoryKeyValueStore::new();
    let service = TodoService::new(&store);
    let mut state = service.bootstrap();
    let key = service.add_task(&mut state, "Buy milk").value.unwrap();

    let mutation = service.set_finished(&mut state, key, true);
    assert!(mutation.value);
    assert!(mutation.persist.is_saved());
    assert!(service.persistence().load_tasks().unwrap()[&key].finished);

    service.set_finished(&mut state, key, false);
    assert!(!service.persistence().load_tasks().unwrap()[&key].finished);
}

#[test]
fn deleted_task_is_absent_in_memory_and_storage() {
    let service = TodoService::new(MemoryKeyValueStore::new());
    let mut state = service.bootstrap();
    let key = service.add_task(&mut state, "Buy milk").value.unwrap();

    let mutation = service.delete_task(&mut state, key);
    assert!(mutation.value);
    assert!(mutation.persist.is_saved());
    assert!(state.task(key).is_none());
    assert!(!service.persistence().load_tasks().unwrap().contains_key(&key));
}

#[test]
fn deleting_unknown_key_still_writes_tasks() {
    let store = MemoryKeyValueStore::new();
    let service = TodoService::new(&store);
    let mut state = service.bootstrap();

    let mutation = service.delete_task(&mut state, TaskKey::from_millis(7));
    assert!(!mutation.value);
    assert!(mutation.persist.is_saved());
    assert!(store.get_item(STORAGE_TASKS_KEY).unwrap().is_some());
}

#[test]
fn work_and_travel_views_stay_separate() {
    let service = TodoService::new(MemoryKeyValueStore::new());
    let mut state = service.bootstrap();

    service.add_task(&mut state, "Buy milk");
    assert!(service.set_mode(&mut state, Mode::Travel).is_saved());
    service.add_task(&mut state, "Visit Rome");

    assert_eq!(texts(&state, Mode::Work), vec!["Buy milk"]);
    assert_eq!(texts(&state, Mode::Travel), vec!["Visit Rome"]);
    let visible: Vec<_> = state.visible_tasks().map(|(_, task)| task.text.as_str()).collect();
    assert_eq!(visible, vec!["Visit Rome"]);
}

#[test]
fn state_survives_restart_on_same_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duolist.sqlite3");

    let (key, expected) = {
        let service = TodoService::new(SqliteKeyValueStore::open(&path).unwrap());
        let mut state = service.bootstrap();
        service.set_mode(&mut state, Mode::Travel);
        let key = service.add_task(&mut state, "Visit Rome").value.unwrap();
        service.set_finished(&mut state, key, true);
        (key, state.tasks().clone())
    };

    let service = TodoService::new(SqliteKeyValueStore::open(&path).unwrap());
    let state = service.bootstrap();
    assert_eq!(state.mode(), Mode::Travel);
    assert_eq!(state.tasks(), &expected);
    assert!(state.task(key).unwrap().finished);
}

#[test]
fn adds_in_same_millisecond_get_distinct_ordered_keys() {
    let clock = FixedClock::at(1_700_000_000_000);
    let service = TodoService::with_clock(MemoryKeyValueStore::new(), &clock);
    let mut state = service.bootstrap();

    let first = service.add_task(&mut state, "one").value.unwrap();
    let second = service.add_task(&mut state, "two").value.unwrap();
    assert_eq!(first.as_millis(), 1_700_000_000_000);
    assert_eq!(second.as_millis(), 1_700_000_000_001);

    clock.0.set(1_700_000_005_000);
    let third = service.add_task(&mut state, "three").value.unwrap();
    assert_eq!(third.as_millis(), 1_700_000_005_000);

    let order: Vec<_> = state.visible_tasks().map(|(_, task)| task.text.as_str()).collect();
    assert_eq!(order, vec!["one", "two", "three"]);
}

#[test]
fn failed_writes_keep_in_memory_changes() {
    let service = TodoService::new(UnavailableStore);
    let mut state = service.bootstrap();
    assert_eq!(state.mode(), Mode::Work);

    let status = service.set_mode(&mut state, Mode::Travel);
    assert!(matches!(status, PersistStatus::Failed(_)));
    assert_eq!(state.mode(), Mode::Travel);

    let added = service.add_task(&mut state, "Visit Rome");
    let key = added.value.unwrap();
    assert!(added.persist.error().is_some());
    assert_eq!(state.task(key).unwrap().category, Mode::Travel);

    let deleted = service.delete_task(&mut state, key);
    assert!(deleted.value);
    assert!(matches!(deleted.persist, PersistStatus::Failed(_)));
    assert!(state.tasks().is_empty());
}

#[test]
fn submit_draft_adds_and_clears_only_on_success() {
    let service = TodoService::new(MemoryKeyValueStore::new());
    let mut state = service.bootstrap();

    service.submit_draft(&mut state);
    assert!(state.tasks().is_empty());

    service.set_draft(&mut state, "Buy milk");
    let key = service.submit_draft(&mut state).value.unwrap();
    assert_eq!(state.draft(), "");
    assert_eq!(state.task(key).unwrap().text, "Buy milk");
}

#[test]
fn add_never_overwrites_task_stored_at_largest_key() {
    let store = MemoryKeyValueStore::new();
    store
        .set_item(
            STORAGE_TASKS_KEY,
            r#"{"version":1,"tasks":{"9223372036854775807":{"text":"old","category":"work","finished":false}}}"#,
        )
        .unwrap();
    let service = TodoService::new(&store);
    let mut state = service.bootstrap();
    let before = store.get_item(STORAGE_TASKS_KEY).unwrap();

    let mutation = service.add_task(&mut state, "new");
    assert_eq!(mutation.value, None);
    assert!(matches!(mutation.persist, PersistStatus::Skipped));
    assert_eq!(state.tasks().len(), 1);
    assert_eq!(state.task(TaskKey::from_millis(i64::MAX)).unwrap().text, "old");
    assert_eq!(store.get_item(STORAGE_TASKS_KEY).unwrap(), before);
}
