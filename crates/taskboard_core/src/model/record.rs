//! User-task record projection.
//!
//! # Responsibility
//! - Decode store documents into typed `UserTaskRecord` values.
//! - Encode the two-field `task`/`status` transition as a partial write.
//!
//! # Invariants
//! - `task` and `status` are always written together.
//! - Unknown status strings are preserved verbatim, never rejected.
//! - An empty `task` means "no task assigned".

use crate::model::document::{Document, DocumentFields};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Collection holding one record per user.
pub const USERS_COLLECTION: &str = "users";

pub const FIELD_NAMES: &str = "names";
pub const FIELD_TASK: &str = "task";
pub const FIELD_STATUS: &str = "status";

/// Opaque store-assigned identifier.
pub type RecordId = String;

/// Task lifecycle state stored in the `status` field.
///
/// The store accepts any string; values outside the known set are kept in
/// `Other` so a read-modify-display cycle never loses information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    /// Soft-delete marker.
    Deleted,
    Other(String),
}

impl TaskStatus {
    /// Statuses an administrator can pick in the assignment form.
    pub const SELECTABLE: [TaskStatus; 3] =
        [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    /// Stable wire label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Deleted => "Deleted",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses a wire label; never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "Pending" => Self::Pending,
            "In Progress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Deleted" => Self::Deleted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the record belongs to the active list.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Completed | Self::Deleted)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        Self::parse(value.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        value.as_str().to_string()
    }
}

/// One user's task assignment as seen by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTaskRecord {
    pub id: RecordId,
    /// Display name, maintained outside this system.
    pub names: String,
    pub task: String,
    pub status: TaskStatus,
}

impl UserTaskRecord {
    /// Projects a store document; missing fields read as empty strings.
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            names: document.field(FIELD_NAMES).unwrap_or_default().to_string(),
            task: document.field(FIELD_TASK).unwrap_or_default().to_string(),
            status: TaskStatus::parse(document.field(FIELD_STATUS).unwrap_or_default()),
        }
    }

    pub fn has_task(&self) -> bool {
        !self.task.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Case-insensitive substring match against `names`.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn name_matches(&self, needle_lower: &str) -> bool {
        self.names.to_lowercase().contains(needle_lower)
    }
}

/// Partial write carrying the `task`/`status` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub task: String,
    pub status: TaskStatus,
}

impl TaskUpdate {
    pub fn new(task: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task: task.into(),
            status,
        }
    }

    /// Transition written by the complete action.
    pub fn completed() -> Self {
        Self::new("", TaskStatus::Completed)
    }

    /// Soft-delete transition.
    pub fn deleted() -> Self {
        Self::new("", TaskStatus::Deleted)
    }

    pub fn into_fields(self) -> DocumentFields {
        let mut fields = DocumentFields::new();
        fields.insert(FIELD_TASK.to_string(), self.task);
        fields.insert(FIELD_STATUS.to_string(), self.status.into());
        fields
    }
}

/// Builds the field map for a freshly seeded user document.
pub fn new_user_fields(names: impl Into<String>) -> DocumentFields {
    let mut fields = TaskUpdate::new("", TaskStatus::Pending).into_fields();
    fields.insert(FIELD_NAMES.to_string(), names.into());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_roundtrip_and_preserve_unknown_values() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Deleted,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), status);
        }
        assert_eq!(
            TaskStatus::parse("Blocked"),
            TaskStatus::Other("Blocked".to_string())
        );
        assert_eq!(TaskStatus::parse("Blocked").as_str(), "Blocked");
    }

    #[test]
    fn status_serializes_as_plain_label() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn record_from_document_defaults_missing_fields() {
        let mut fields = DocumentFields::new();
        fields.insert(FIELD_NAMES.to_string(), "Ana".to_string());
        let record = UserTaskRecord::from_document(&Document::new("u1", fields));

        assert_eq!(record.id, "u1");
        assert_eq!(record.names, "Ana");
        assert!(!record.has_task());
        assert_eq!(record.status, TaskStatus::Other(String::new()));
        assert!(record.is_active());
    }

    #[test]
    fn completed_and_deleted_transitions_clear_task() {
        let completed = TaskUpdate::completed().into_fields();
        assert_eq!(completed.get(FIELD_TASK).map(String::as_str), Some(""));
        assert_eq!(
            completed.get(FIELD_STATUS).map(String::as_str),
            Some("Completed")
        );

        let deleted = TaskUpdate::deleted().into_fields();
        assert_eq!(deleted.get(FIELD_TASK).map(String::as_str), Some(""));
        assert_eq!(deleted.get(FIELD_STATUS).map(String::as_str), Some("Deleted"));
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let record = UserTaskRecord {
            id: "u1".to_string(),
            names: "Ana".to_string(),
            task: String::new(),
            status: TaskStatus::Pending,
        };
        assert!(record.name_matches("an"));
        assert!(record.name_matches(""));
        assert!(!record.name_matches("bob"));
    }
}
