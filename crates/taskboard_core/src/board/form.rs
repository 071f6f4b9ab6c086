//! Assignment form state.

use crate::model::record::{RecordId, TaskStatus, UserTaskRecord};

/// Selected user, task text and status, plus the record being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub selected_user: String,
    pub task: String,
    pub status: TaskStatus,
    editing: Option<RecordId>,
}

impl TaskForm {
    /// Loads `record` into the form and marks it as being edited.
    pub fn load(&mut self, record: &UserTaskRecord) {
        self.editing = Some(record.id.clone());
        self.selected_user = record.id.clone();
        self.task = record.task.clone();
        self.status = record.status.clone();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit Task"
        } else {
            "Select User:"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Task"
        } else {
            "Assign Task"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_reset() {
        let mut form = TaskForm::default();
        assert_eq!(form.submit_label(), "Assign Task");

        form.load(&UserTaskRecord {
            id: "u1".to_string(),
            names: "Ana".to_string(),
            task: "Write report".to_string(),
            status: TaskStatus::InProgress,
        });
        assert_eq!(form.editing(), Some("u1"));
        assert_eq!(form.selected_user, "u1");
        assert_eq!(form.heading(), "Edit Task");
        assert_eq!(form.submit_label(), "Update Task");

        form.reset();
        assert_eq!(form, TaskForm::default());
        assert_eq!(form.status, TaskStatus::Pending);
    }
}
