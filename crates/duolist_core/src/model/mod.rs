//! Domain model for the two-mode to-do list.
//!
//! # Responsibility
//! - Define the canonical task record, its key and its mode.
//!
//! # Invariants
//! - Every task is identified by a unique creation-timestamp `TaskKey`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
