//! Domain model for user-task records.
//!
//! # Responsibility
//! - Define the store's document shape and the typed record projection
//!   consumed by the task board.
//!
//! # Invariants
//! - Every record is identified by an opaque, store-assigned `RecordId`.
//! - Deletion is represented by the `Deleted` status marker, not hard delete.

pub mod document;
pub mod record;
