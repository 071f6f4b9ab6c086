//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist collections of flat string documents in the `documents` table.
//! - Fan out collection snapshots to in-process subscribers after writes.
//!
//! # Invariants
//! - Snapshots are ordered by insertion (`created_at`, then `rowid`).
//! - Partial updates merge into existing fields inside one transaction.
//! - Subscriber callbacks never run while the connection lock is held.
//! - Snapshots are read and sequence-stamped under the connection lock; a
//!   subscriber never receives a snapshot older than one it already saw.

use crate::db::{self, SharedConnection};
use crate::model::document::{Document, DocumentFields};
use crate::store::subscription::{Stamped, SubscriberHub};
use crate::store::{
    ChangeCallback, DocumentStore, ErrorCallback, StoreError, StoreResult, Subscription,
};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Document store over the shared local SQLite connection.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: SharedConnection,
    hub: Arc<SubscriberHub>,
}

impl SqliteDocumentStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            hub: Arc::new(SubscriberHub::default()),
        }
    }

    /// Number of live subscriptions across all collections.
    pub fn subscriber_count(&self) -> usize {
        self.hub.len()
    }

    fn read_collection(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let conn = db::lock(&self.conn)?;
        query_collection(&conn, collection)
    }

    /// Reads and stamps a snapshot; `conn` must stay locked across both.
    fn stamped_snapshot(&self, conn: &Connection, collection: &str) -> Stamped {
        self.hub.stamp(query_collection(conn, collection))
    }

    fn publish(&self, collection: &str, stamped: Stamped) {
        match stamped.snapshot() {
            Ok(documents) => debug!(
                "event=store_publish module=store status=ok collection={} seq={} count={}",
                collection,
                stamped.seq(),
                documents.len()
            ),
            Err(err) => error!(
                "event=store_publish module=store status=error collection={} seq={} error={}",
                collection,
                stamped.seq(),
                err
            ),
        }
        self.hub.publish(collection, stamped);
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn subscribe_collection(
        &self,
        collection: &str,
        on_change: ChangeCallback,
        on_error: ErrorCallback,
    ) -> Subscription {
        let key = self.hub.insert(collection, on_change, on_error);
        info!(
            "event=store_subscribe module=store status=ok collection={} subscriber={}",
            collection, key
        );

        let initial = match db::lock(&self.conn) {
            Ok(conn) => self.stamped_snapshot(&conn, collection),
            Err(err) => self.hub.stamp(Err(err.into())),
        };
        if let Err(err) = initial.snapshot() {
            error!(
                "event=store_subscribe module=store status=error collection={} error={}",
                collection, err
            );
        }
        self.hub.deliver_to(key, initial);

        let hub = self.hub.clone();
        let collection = collection.to_string();
        let handle = hub.handle(key);
        Subscription::new(move || {
            drop(handle);
            debug!(
                "event=store_unsubscribe module=store status=ok collection={} subscriber={}",
                collection, key
            );
        })
    }

    fn fetch_collection(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let started_at = Instant::now();
        let result = self.read_collection(collection);
        match &result {
            Ok(documents) => debug!(
                "event=store_fetch module=store status=ok collection={} count={} duration_ms={}",
                collection,
                documents.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_fetch module=store status=error collection={} error={}",
                collection, err
            ),
        }
        result
    }

    fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: DocumentFields,
    ) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = {
            let mut conn = db::lock(&self.conn)?;
            merge_fields(&mut conn, collection, id, fields)
                .map(|()| self.stamped_snapshot(&conn, collection))
        };

        match result {
            Ok(stamped) => {
                info!(
                    "event=store_update module=store status=ok collection={} duration_ms={}",
                    collection,
                    started_at.elapsed().as_millis()
                );
                self.publish(collection, stamped);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_update module=store status=error collection={} duration_ms={} error={}",
                    collection,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn create_document(&self, collection: &str, fields: DocumentFields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let fields_json = encode_fields(&fields)?;
        let stamped = {
            let conn = db::lock(&self.conn)?;
            conn.execute(
                "INSERT INTO documents (collection, id, fields_json) VALUES (?1, ?2, ?3);",
                params![collection, id, fields_json],
            )?;
            self.stamped_snapshot(&conn, collection)
        };
        info!(
            "event=store_create module=store status=ok collection={} field_count={}",
            collection,
            fields.len()
        );
        self.publish(collection, stamped);
        Ok(id)
    }
}

fn query_collection(conn: &Connection, collection: &str) -> StoreResult<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, fields_json
         FROM documents
         WHERE collection = ?1
         ORDER BY created_at ASC, rowid ASC;",
    )?;
    let mut rows = stmt.query([collection])?;
    let mut documents = Vec::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let fields_json: String = row.get(1)?;
        let fields = decode_fields(&id, &fields_json)?;
        documents.push(Document::new(id, fields));
    }
    Ok(documents)
}

fn merge_fields(
    conn: &mut Connection,
    collection: &str,
    id: &str,
    fields: DocumentFields,
) -> StoreResult<()> {
    // Immediate: take the write lock before reading so concurrent writers queue.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existing: Option<String> = tx
        .query_row(
            "SELECT fields_json FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(existing) = existing else {
        return Err(StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    };

    let mut merged = decode_fields(id, &existing)?;
    merged.extend(fields);
    tx.execute(
        "UPDATE documents
         SET
            fields_json = ?1,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE collection = ?2 AND id = ?3;",
        params![encode_fields(&merged)?, collection, id],
    )?;
    tx.commit()?;
    Ok(())
}

fn encode_fields(fields: &DocumentFields) -> StoreResult<String> {
    serde_json::to_string(fields)
        .map_err(|err| StoreError::InvalidData(format!("cannot encode fields: {err}")))
}

fn decode_fields(id: &str, raw: &str) -> StoreResult<DocumentFields> {
    serde_json::from_str(raw).map_err(|err| {
        StoreError::InvalidData(format!("invalid fields_json for document `{id}`: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db_in_memory, share};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::thread;

    fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::new(share(open_db_in_memory().unwrap()))
    }

    fn fields(pairs: &[(&str, &str)]) -> DocumentFields {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn update_merges_partial_fields() {
        let store = store();
        let id = store
            .create_document("users", fields(&[("names", "Ana"), ("task", "")]))
            .unwrap();

        store
            .update_document("users", &id, fields(&[("task", "Write report")]))
            .unwrap();

        let docs = store.fetch_collection("users").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].field("names"), Some("Ana"));
        assert_eq!(docs[0].field("task"), Some("Write report"));
    }

    #[test]
    fn update_missing_document_returns_not_found() {
        let store = store();
        let err = store
            .update_document("users", "nope", fields(&[("task", "x")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "nope"));
    }

    #[test]
    fn corrupted_fields_surface_as_invalid_data() {
        let conn = share(open_db_in_memory().unwrap());
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO documents (collection, id, fields_json) VALUES ('users', 'bad', 'not json');",
                [],
            )
            .unwrap();
        let store = SqliteDocumentStore::new(conn);

        let err = store.fetch_collection("users").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn subscription_receives_initial_and_subsequent_snapshots_until_dropped() {
        let store = store();
        let id = store
            .create_document("users", fields(&[("names", "Ana")]))
            .unwrap();

        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe_collection(
            "users",
            Box::new(move |docs: Vec<Document>| sink.lock().unwrap().push(docs.len())),
            Box::new(|_: &StoreError| {}),
        );
        assert_eq!(*seen.lock().unwrap(), vec![1]);

        store.create_document("users", fields(&[("names", "Bob")])).unwrap();
        store
            .update_document("users", &id, fields(&[("task", "x")]))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2]);

        drop(subscription);
        assert_eq!(store.subscriber_count(), 0);
        store.create_document("users", fields(&[("names", "Cy")])).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn writes_to_other_collections_do_not_notify() {
        let store = store();
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let _subscription = store.subscribe_collection(
            "users",
            Box::new(move |_: Vec<Document>| *sink.lock().unwrap() += 1),
            Box::new(|_: &StoreError| {}),
        );

        store.create_document("teams", fields(&[("names", "Ops")])).unwrap();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn concurrent_writers_leave_subscriber_on_latest_snapshot() {
        let store = store();
        let first = store
            .create_document("users", fields(&[("names", "Ana"), ("task", "")]))
            .unwrap();
        let second = store
            .create_document("users", fields(&[("names", "Bob"), ("task", "")]))
            .unwrap();

        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);
        let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = store.subscribe_collection(
            "users",
            Box::new(move |docs: Vec<Document>| {
                let tasks: Vec<String> = docs
                    .iter()
                    .map(|doc| doc.field("task").unwrap_or_default().to_string())
                    .collect();
                // Stall while handling the snapshot that has only the first write.
                if tasks == ["A", ""] {
                    entered_tx.lock().unwrap().send(()).unwrap();
                    release_rx.lock().unwrap().recv().unwrap();
                }
                sink.lock().unwrap().push(tasks);
            }),
            Box::new(|_: &StoreError| {}),
        );

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                store
                    .update_document("users", &first, fields(&[("task", "A")]))
                    .unwrap();
            })
        };
        entered_rx.recv().unwrap();
        store
            .update_document("users", &second, fields(&[("task", "B")]))
            .unwrap();
        release_tx.send(()).unwrap();
        writer.join().unwrap();

        let truth: Vec<String> = store
            .fetch_collection("users")
            .unwrap()
            .iter()
            .map(|doc| doc.field("task").unwrap_or_default().to_string())
            .collect();
        assert_eq!(truth, ["A", "B"]);
        assert_eq!(seen.lock().unwrap().last(), Some(&truth));
    }
}
