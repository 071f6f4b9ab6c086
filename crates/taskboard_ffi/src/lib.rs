//! Flutter-facing bindings for `taskboard_core`.

pub mod api;
