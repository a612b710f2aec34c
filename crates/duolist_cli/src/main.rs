//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `duolist_core` linkage without the Flutter runtime.
//! - Keep output deterministic for quick local sanity checks.

use duolist_core::{MemoryKeyValueStore, Mode, TodoService};

fn main() {
    println!("duolist_core ping={}", duolist_core::ping());
    println!("duolist_core version={}", duolist_core::core_version());

    let service = TodoService::new(MemoryKeyValueStore::new());
    let mut state = service.bootstrap();
    service.add_task(&mut state, "smoke");
    service.set_mode(&mut state, Mode::Travel);
    println!(
        "duolist_core smoke mode={} work={} travel={}",
        state.mode(),
        state.tasks_in(Mode::Work).count(),
        state.tasks_in(Mode::Travel).count()
    );
}
