//! Core use-case services.
//!
//! # Responsibility
//! - Turn presentation intents into view-model changes plus writes.
//! - Keep FFI callers decoupled from storage details.

pub mod todo_service;
