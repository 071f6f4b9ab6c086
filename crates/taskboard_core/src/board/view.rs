//! Record set, search filter and list projections.

use crate::model::document::Document;
use crate::model::record::{RecordId, TaskStatus, UserTaskRecord};
use serde::Serialize;

/// Whether the first snapshot (or failure) has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Ready,
}

/// One row of the active or history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub record_id: RecordId,
    pub primary: String,
    pub secondary: String,
    /// Edit/Complete/Delete are offered only on actionable rows.
    pub actionable: bool,
}

impl ListItem {
    fn active(record: &UserTaskRecord) -> Self {
        let task = if record.has_task() {
            record.task.as_str()
        } else {
            "No task assigned"
        };
        let status = match record.status.as_str() {
            "" => "N/A",
            label => label,
        };
        Self {
            record_id: record.id.clone(),
            primary: format!("Name: {}", record.names),
            secondary: format!("Task: {task} - Status: {status}"),
            actionable: true,
        }
    }

    fn history(record: &UserTaskRecord) -> Self {
        let label = match record.status {
            TaskStatus::Deleted => "Task Deleted",
            _ => "Task Completed",
        };
        Self {
            record_id: record.id.clone(),
            primary: format!("Name: {}", record.names),
            secondary: label.to_string(),
            actionable: false,
        }
    }
}

/// Entry of the user selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOption {
    pub id: RecordId,
    pub label: String,
}

/// In-memory mirror of the `users` collection.
#[derive(Debug, Clone)]
pub struct BoardView {
    records: Vec<UserTaskRecord>,
    search_term: String,
    filtered: Vec<UserTaskRecord>,
    load_state: LoadState,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            search_term: String::new(),
            filtered: Vec::new(),
            load_state: LoadState::Loading,
        }
    }
}

impl BoardView {
    /// Replaces the record set from an authoritative snapshot.
    pub fn apply_snapshot(&mut self, documents: &[Document]) {
        self.records = documents.iter().map(UserTaskRecord::from_document).collect();
        self.refilter();
        self.load_state = LoadState::Ready;
    }

    /// Degrades to an empty, ready view after a snapshot failure.
    pub fn apply_failure(&mut self) {
        self.records.clear();
        self.filtered.clear();
        self.load_state = LoadState::Ready;
    }

    pub fn mark_loading(&mut self) {
        self.load_state = LoadState::Loading;
    }

    /// Sets the search term and recomputes the filtered view.
    pub fn search(&mut self, term: &str) {
        self.search_term = term.to_lowercase();
        self.refilter();
    }

    fn refilter(&mut self) {
        let needle = self.search_term.as_str();
        self.filtered = self
            .records
            .iter()
            .filter(|record| record.name_matches(needle))
            .cloned()
            .collect();
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Full record set, unaffected by search.
    pub fn records(&self) -> &[UserTaskRecord] {
        &self.records
    }

    /// Records matching the current search term.
    pub fn filtered(&self) -> &[UserTaskRecord] {
        &self.filtered
    }

    pub fn find(&self, id: &str) -> Option<&UserTaskRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Matching records that are neither Completed nor Deleted.
    pub fn active_items(&self) -> Vec<ListItem> {
        self.filtered
            .iter()
            .filter(|record| record.is_active())
            .map(ListItem::active)
            .collect()
    }

    /// Matching Completed and Deleted records.
    pub fn history_items(&self) -> Vec<ListItem> {
        self.filtered
            .iter()
            .filter(|record| !record.is_active())
            .map(ListItem::history)
            .collect()
    }

    pub fn user_options(&self) -> Vec<UserOption> {
        self.filtered
            .iter()
            .map(|record| UserOption {
                id: record.id.clone(),
                label: record.names.clone(),
            })
            .collect()
    }
}
