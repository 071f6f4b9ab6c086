//! Task board: live list of user-task records plus the assignment form.
//!
//! # Responsibility
//! - Keep an in-memory view reconciled from store snapshots only.
//! - Validate and issue the assign/update/complete/delete transitions.
//! - Project records into active and history lists.
//!
//! # Invariants
//! - Local records are replaced wholesale from store snapshots; writes never
//!   patch them directly.
//! - Blank task text or a missing user selection never reaches the store.
//! - Completed and Deleted records never appear in the active list.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod form;
pub mod task_board;
pub mod view;

pub use form::TaskForm;
pub use task_board::{SyncMode, TaskBoard, DELETE_CONFIRM_PROMPT};
pub use view::{BoardView, ListItem, LoadState, UserOption};

pub type BoardResult<T> = Result<T, BoardError>;

/// Message shown when the form is submitted without a user or task text.
pub const VALIDATION_MESSAGE: &str = "Please select a user and enter a valid task";

/// User-visible confirmation of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardNotice {
    Assigned,
    Updated,
    Completed,
    Deleted,
}

impl BoardNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::Assigned => "Task assigned successfully!",
            Self::Updated => "Task updated successfully!",
            Self::Completed => "Task marked as complete successfully!",
            Self::Deleted => "Task deleted successfully!",
        }
    }
}

impl Display for BoardNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Failure of one board action; always terminal for that action.
#[derive(Debug)]
pub enum BoardError {
    /// Missing user selection or blank task text; nothing was written.
    Validation,
    Store(StoreError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => f.write_str(VALIDATION_MESSAGE),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
