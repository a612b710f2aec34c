//! Flutter-facing bindings for the duolist core.

pub mod api;
