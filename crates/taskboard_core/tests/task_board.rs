use std::cell::Cell;
use std::rc::Rc;
use taskboard_core::{
    new_user_fields, AppContext, BoardError, BoardNotice, Document, DocumentFields, DocumentStore,
    LoadState, SqliteDocumentStore, StoreError, StoreResult, Subscription, SyncMode, TaskBoard,
    TaskStatus, USERS_COLLECTION, DELETE_CONFIRM_PROMPT, VALIDATION_MESSAGE,
};

/// Delegates to a real store and counts writes.
struct CountingStore {
    inner: SqliteDocumentStore,
    updates: Rc<Cell<u32>>,
}

impl DocumentStore for CountingStore {
    fn subscribe_collection(
        &self,
        collection: &str,
        on_change: taskboard_core::store::ChangeCallback,
        on_error: taskboard_core::store::ErrorCallback,
    ) -> Subscription {
        self.inner.subscribe_collection(collection, on_change, on_error)
    }

    fn fetch_collection(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.inner.fetch_collection(collection)
    }

    fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: DocumentFields,
    ) -> StoreResult<()> {
        self.updates.set(self.updates.get() + 1);
        self.inner.update_document(collection, id, fields)
    }

    fn create_document(&self, collection: &str, fields: DocumentFields) -> StoreResult<String> {
        self.inner.create_document(collection, fields)
    }
}

/// Store whose reads and writes always fail.
struct BrokenStore;

impl DocumentStore for BrokenStore {
    fn subscribe_collection(
        &self,
        _collection: &str,
        _on_change: taskboard_core::store::ChangeCallback,
        on_error: taskboard_core::store::ErrorCallback,
    ) -> Subscription {
        on_error(&StoreError::InvalidData("offline".to_string()));
        Subscription::inert()
    }

    fn fetch_collection(&self, _collection: &str) -> StoreResult<Vec<Document>> {
        Err(StoreError::InvalidData("offline".to_string()))
    }

    fn update_document(
        &self,
        _collection: &str,
        id: &str,
        _fields: DocumentFields,
    ) -> StoreResult<()> {
        Err(StoreError::NotFound {
            collection: USERS_COLLECTION.to_string(),
            id: id.to_string(),
        })
    }

    fn create_document(&self, _collection: &str, _fields: DocumentFields) -> StoreResult<String> {
        Err(StoreError::InvalidData("offline".to_string()))
    }
}

fn seeded(mode: SyncMode, names: &[&str]) -> (AppContext, Vec<String>) {
    let context = AppContext::in_memory(mode).unwrap();
    let ids = names
        .iter()
        .map(|name| {
            context
                .store()
                .create_document(USERS_COLLECTION, new_user_fields(*name))
                .unwrap()
        })
        .collect();
    (context, ids)
}

#[test]
fn assign_task_writes_trimmed_task_and_status() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();

    let notice = board
        .assign_task(&ids[0], "  Write report  ", TaskStatus::InProgress)
        .unwrap();
    assert_eq!(notice, BoardNotice::Assigned);
    assert_eq!(notice.message(), "Task assigned successfully!");

    let record = board.record(&ids[0]).unwrap();
    assert_eq!(record.task, "Write report");
    assert_eq!(record.status, TaskStatus::InProgress);
    assert_eq!(record.names, "Ana");
}

#[test]
fn blank_task_or_missing_user_never_reaches_the_store() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let updates = Rc::new(Cell::new(0));
    let mut board = TaskBoard::new(
        CountingStore {
            inner: context.store().clone(),
            updates: updates.clone(),
        },
        SyncMode::Push,
    );
    board.load_users();

    for (user, task) in [(ids[0].as_str(), "   "), (ids[0].as_str(), ""), ("", "Do it")] {
        let err = board
            .assign_task(user, task, TaskStatus::Pending)
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation));
        assert_eq!(err.to_string(), VALIDATION_MESSAGE);

        let err = board
            .update_task(user, task, TaskStatus::Pending)
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation));
    }
    assert_eq!(updates.get(), 0);
    assert_eq!(board.record(&ids[0]).unwrap().task, "");
}

#[test]
fn complete_task_clears_task_and_leaves_active_list() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana", "Bob"]);
    let mut board = context.task_board();
    board.load_users();
    board
        .assign_task(&ids[0], "Write report", TaskStatus::Pending)
        .unwrap();

    assert_eq!(board.complete_task(&ids[0]).unwrap(), BoardNotice::Completed);

    let record = board.record(&ids[0]).unwrap();
    assert_eq!(record.task, "");
    assert_eq!(record.status, TaskStatus::Completed);
    let active: Vec<_> = board.active_items().into_iter().map(|i| i.record_id).collect();
    assert_eq!(active, vec![ids[1].clone()]);
    assert_eq!(board.history_items()[0].secondary, "Task Completed");
}

#[test]
fn delete_requires_confirmation() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();
    board
        .assign_task(&ids[0], "Write report", TaskStatus::InProgress)
        .unwrap();
    let before = board.record(&ids[0]).unwrap();

    let mut prompt_seen = String::new();
    let outcome = board
        .delete_task(&ids[0], |prompt| {
            prompt_seen = prompt.to_string();
            false
        })
        .unwrap();
    assert_eq!(outcome, None);
    assert_eq!(prompt_seen, DELETE_CONFIRM_PROMPT);
    assert_eq!(board.record(&ids[0]).unwrap(), before);

    let outcome = board.delete_task(&ids[0], |_| true).unwrap();
    assert_eq!(outcome, Some(BoardNotice::Deleted));
    let record = board.record(&ids[0]).unwrap();
    assert_eq!(record.task, "");
    assert_eq!(record.status, TaskStatus::Deleted);
    assert!(board.active_items().is_empty());
    // Soft delete: the document is still in the store.
    assert_eq!(context.store().fetch_collection(USERS_COLLECTION).unwrap().len(), 1);
}

#[test]
fn edit_then_update_with_unchanged_values_is_a_noop() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();
    board
        .assign_task(&ids[0], "Write report", TaskStatus::InProgress)
        .unwrap();
    let original = board.record(&ids[0]).unwrap();

    board.edit_task(&original);
    assert_eq!(board.form().editing(), Some(ids[0].as_str()));
    assert_eq!(board.form().task, "Write report");

    assert_eq!(board.submit().unwrap(), BoardNotice::Updated);
    assert!(!board.form().is_editing());
    assert_eq!(board.record(&ids[0]).unwrap(), original);
}

#[test]
fn reset_form_abandons_edit_without_writing() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();
    board
        .assign_task(&ids[0], "Write report", TaskStatus::Pending)
        .unwrap();
    let original = board.record(&ids[0]).unwrap();

    board.edit_task(&original);
    board.set_task("Rewrite report");
    assert!(board.form().is_editing());
    assert_eq!(board.form().heading(), "Edit Task");

    board.reset_form();
    assert!(!board.form().is_editing());
    assert_eq!(board.form().heading(), "Select User:");
    assert_eq!(board.form().selected_user, "");
    assert_eq!(board.form().task, "");
    assert_eq!(board.form().status, TaskStatus::Pending);

    assert!(matches!(board.submit(), Err(BoardError::Validation)));
    assert_eq!(board.record(&ids[0]).unwrap(), original);
}

#[test]
fn submit_dispatches_assign_when_not_editing() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();

    board.select_user(ids[0].clone());
    board.set_task("Plan sprint");
    board.set_status(TaskStatus::InProgress);
    assert_eq!(board.submit().unwrap(), BoardNotice::Assigned);
    assert_eq!(board.form().selected_user, "");
    assert_eq!(board.record(&ids[0]).unwrap().task, "Plan sprint");
}

#[test]
fn search_filters_by_name_without_touching_records() {
    let (context, _ids) = seeded(SyncMode::Push, &["Ana", "Bob"]);
    let mut board = context.task_board();
    board.load_users();

    board.search("an");
    let first: Vec<_> = board.user_options().into_iter().map(|o| o.label).collect();
    board.search("an");
    let second: Vec<_> = board.user_options().into_iter().map(|o| o.label).collect();

    assert_eq!(first, vec!["Ana".to_string()]);
    assert_eq!(first, second);
    assert_eq!(board.records().len(), 2);
}

#[test]
fn push_board_sees_writes_from_other_views() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut watcher = context.task_board();
    watcher.load_users();
    let mut editor = context.task_board();
    editor.load_users();

    editor
        .assign_task(&ids[0], "Review PR", TaskStatus::Pending)
        .unwrap();
    assert_eq!(watcher.record(&ids[0]).unwrap().task, "Review PR");

    context
        .store()
        .create_document(USERS_COLLECTION, new_user_fields("Bob"))
        .unwrap();
    assert_eq!(watcher.records().len(), 2);
}

#[test]
fn pull_board_only_changes_on_refresh() {
    let (context, ids) = seeded(SyncMode::Pull, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();
    assert!(!board.is_subscribed());
    assert_eq!(board.load_state(), LoadState::Ready);

    board
        .assign_task(&ids[0], "Review PR", TaskStatus::Pending)
        .unwrap();
    assert_eq!(board.record(&ids[0]).unwrap().task, "");

    board.refresh();
    assert_eq!(board.record(&ids[0]).unwrap().task, "Review PR");
}

#[test]
fn unload_stops_live_updates() {
    let (context, ids) = seeded(SyncMode::Push, &["Ana"]);
    let mut board = context.task_board();
    board.load_users();
    assert_eq!(context.store().subscriber_count(), 1);

    board.unload();
    assert_eq!(context.store().subscriber_count(), 0);
    context
        .store()
        .update_document(
            USERS_COLLECTION,
            &ids[0],
            taskboard_core::TaskUpdate::new("external", TaskStatus::Pending).into_fields(),
        )
        .unwrap();
    assert_eq!(board.record(&ids[0]).unwrap().task, "");

    drop(board);
    context.shutdown();
}

#[test]
fn store_failures_degrade_and_keep_form_state() {
    let mut board = TaskBoard::new(BrokenStore, SyncMode::Push);
    board.load_users();
    assert_eq!(board.load_state(), LoadState::Ready);
    assert!(board.records().is_empty());

    board.select_user("u1");
    board.set_task("Write report");
    let err = board.submit().unwrap_err();
    assert!(matches!(err, BoardError::Store(StoreError::NotFound { .. })));
    assert_eq!(board.form().task, "Write report");

    assert!(board.complete_task("u1").is_err());
    assert!(board.delete_task("u1", |_| true).is_err());

    let mut pull = TaskBoard::new(BrokenStore, SyncMode::Pull);
    pull.load_users();
    assert_eq!(pull.load_state(), LoadState::Ready);
    assert!(pull.active_items().is_empty());
}
