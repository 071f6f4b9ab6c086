//! Task board controller over a document store.

use crate::board::form::TaskForm;
use crate::board::view::{BoardView, ListItem, LoadState, UserOption};
use crate::board::{BoardError, BoardNotice, BoardResult};
use crate::model::document::Document;
use crate::model::record::{TaskStatus, TaskUpdate, UserTaskRecord, USERS_COLLECTION};
use crate::store::{DocumentStore, StoreError, Subscription};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Prompt passed to the delete confirmation callback.
pub const DELETE_CONFIRM_PROMPT: &str = "Are you sure you want to delete this task?";

/// How the board keeps its records in sync with the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Long-lived collection subscription.
    #[default]
    Push,
    /// One fetch per load; `refresh` re-fetches.
    Pull,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pull => "pull",
        }
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            other => Err(format!("unsupported sync mode `{other}`; expected push|pull")),
        }
    }
}

/// Assignment view over the `users` collection.
pub struct TaskBoard<S: DocumentStore> {
    store: S,
    mode: SyncMode,
    view: Arc<Mutex<BoardView>>,
    form: TaskForm,
    subscription: Option<Subscription>,
}

impl<S: DocumentStore> TaskBoard<S> {
    pub fn new(store: S, mode: SyncMode) -> Self {
        Self {
            store,
            mode,
            view: Arc::new(Mutex::new(BoardView::default())),
            form: TaskForm::default(),
            subscription: None,
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Starts synchronizing the record set.
    ///
    /// Push mode replaces any previous subscription; pull mode performs one
    /// fetch. Failures are logged and leave an empty, ready view.
    pub fn load_users(&mut self) {
        self.unload();
        self.lock_view().mark_loading();
        match self.mode {
            SyncMode::Push => {
                let on_change = Arc::clone(&self.view);
                let on_error = Arc::clone(&self.view);
                let subscription = self.store.subscribe_collection(
                    USERS_COLLECTION,
                    Box::new(move |documents: Vec<Document>| {
                        lock(&on_change).apply_snapshot(&documents);
                    }),
                    Box::new(move |err: &StoreError| {
                        error!("event=board_sync module=board status=error mode=push error={err}");
                        lock(&on_error).apply_failure();
                    }),
                );
                self.subscription = Some(subscription);
            }
            SyncMode::Pull => self.fetch_once(),
        }
        info!(
            "event=board_load module=board status=ok mode={}",
            self.mode.as_str()
        );
    }

    /// Re-reads the collection in pull mode; push mode is already live.
    pub fn refresh(&mut self) {
        if self.mode == SyncMode::Pull {
            self.fetch_once();
        }
    }

    /// Tears down the live subscription, if any.
    pub fn unload(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    fn fetch_once(&mut self) {
        match self.store.fetch_collection(USERS_COLLECTION) {
            Ok(documents) => self.lock_view().apply_snapshot(&documents),
            Err(err) => {
                error!("event=board_sync module=board status=error mode=pull error={err}");
                self.lock_view().apply_failure();
            }
        }
    }

    /// Filters the list by case-insensitive name substring.
    pub fn search(&mut self, term: &str) {
        self.lock_view().search(term);
    }

    /// Writes a first assignment for `user_id`.
    pub fn assign_task(
        &mut self,
        user_id: &str,
        task: &str,
        status: TaskStatus,
    ) -> BoardResult<BoardNotice> {
        self.write_task(user_id, task, status, "assign")?;
        self.form.reset();
        Ok(BoardNotice::Assigned)
    }

    /// Loads `record` into the form for editing. No store I/O.
    pub fn edit_task(&mut self, record: &UserTaskRecord) {
        self.form.load(record);
    }

    /// Rewrites the assignment of the record being edited.
    pub fn update_task(
        &mut self,
        user_id: &str,
        task: &str,
        status: TaskStatus,
    ) -> BoardResult<BoardNotice> {
        self.write_task(user_id, task, status, "update")?;
        self.form.reset();
        Ok(BoardNotice::Updated)
    }

    /// Clears the task and marks the record `Completed`.
    pub fn complete_task(&mut self, user_id: &str) -> BoardResult<BoardNotice> {
        self.write(user_id, TaskUpdate::completed(), "complete")?;
        Ok(BoardNotice::Completed)
    }

    /// Soft-deletes after `confirm` approves `DELETE_CONFIRM_PROMPT`.
    ///
    /// Returns `Ok(None)` when the user declines; nothing is written.
    pub fn delete_task(
        &mut self,
        user_id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> BoardResult<Option<BoardNotice>> {
        if !confirm(DELETE_CONFIRM_PROMPT) {
            info!("event=task_delete module=board status=cancelled");
            return Ok(None);
        }
        self.write(user_id, TaskUpdate::deleted(), "delete")?;
        Ok(Some(BoardNotice::Deleted))
    }

    /// Submits the form as an update while editing, otherwise as an assign.
    pub fn submit(&mut self) -> BoardResult<BoardNotice> {
        let user_id = self.form.selected_user.clone();
        let task = self.form.task.clone();
        let status = self.form.status.clone();
        if self.form.is_editing() {
            self.update_task(&user_id, &task, status)
        } else {
            self.assign_task(&user_id, &task, status)
        }
    }

    pub fn select_user(&mut self, user_id: impl Into<String>) {
        self.form.selected_user = user_id.into();
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.form.task = task.into();
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.form.status = status;
    }

    pub fn reset_form(&mut self) {
        self.form.reset();
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn load_state(&self) -> LoadState {
        self.lock_view().load_state()
    }

    pub fn search_term(&self) -> String {
        self.lock_view().search_term().to_string()
    }

    /// Snapshot of every record, regardless of search or status.
    pub fn records(&self) -> Vec<UserTaskRecord> {
        self.lock_view().records().to_vec()
    }

    pub fn record(&self, id: &str) -> Option<UserTaskRecord> {
        self.lock_view().find(id).cloned()
    }

    pub fn active_items(&self) -> Vec<ListItem> {
        self.lock_view().active_items()
    }

    pub fn history_items(&self) -> Vec<ListItem> {
        self.lock_view().history_items()
    }

    pub fn user_options(&self) -> Vec<UserOption> {
        self.lock_view().user_options()
    }

    fn write_task(
        &self,
        user_id: &str,
        task: &str,
        status: TaskStatus,
        action: &str,
    ) -> BoardResult<()> {
        let task = task.trim();
        if user_id.is_empty() || task.is_empty() {
            warn!("event=task_{action} module=board status=rejected error_code=validation");
            return Err(BoardError::Validation);
        }
        self.write(user_id, TaskUpdate::new(task, status), action)
    }

    fn write(&self, user_id: &str, update: TaskUpdate, action: &str) -> BoardResult<()> {
        let status = update.status.clone();
        match self
            .store
            .update_document(USERS_COLLECTION, user_id, update.into_fields())
        {
            Ok(()) => {
                info!("event=task_{action} module=board status=ok task_status={status}");
                Ok(())
            }
            Err(err) => {
                error!("event=task_{action} module=board status=error error={err}");
                Err(BoardError::Store(err))
            }
        }
    }

    fn lock_view(&self) -> MutexGuard<'_, BoardView> {
        lock(&self.view)
    }
}

impl<S: DocumentStore> Drop for TaskBoard<S> {
    fn drop(&mut self) {
        self.unload();
    }
}

// The view holds plain data, so a poisoned lock is still consistent.
fn lock(view: &Mutex<BoardView>) -> MutexGuard<'_, BoardView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}
