//! Document store client contracts and the SQLite-backed implementation.
//!
//! # Responsibility
//! - Define the collection subscription / fetch / partial update contract
//!   the task board depends on.
//! - Keep SQL and JSON encoding details behind that contract.
//!
//! # Invariants
//! - Writes are last-write-wins; no version or precondition checks.
//! - Every successful write re-delivers the full collection snapshot to each
//!   live subscriber of that collection.
//! - The store never hard-deletes documents.

use crate::db::DbError;
use crate::model::document::{Document, DocumentFields};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_store;
pub mod subscription;

pub use sqlite_store::SqliteDocumentStore;
pub use subscription::Subscription;

pub type StoreResult<T> = Result<T, StoreError>;

/// Receives the complete, ordered document set of a collection.
pub type ChangeCallback = Box<dyn Fn(Vec<Document>) + Send + Sync>;

/// Receives snapshot failures for a subscription.
pub type ErrorCallback = Box<dyn Fn(&StoreError) + Send + Sync>;

/// Store-level failure for subscriptions and writes.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound { collection: String, id: String },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document database client used by the task board.
pub trait DocumentStore {
    /// Starts a push subscription on one collection.
    ///
    /// The current snapshot is delivered before this call returns. The
    /// subscription lives until the returned handle is unsubscribed or
    /// dropped.
    fn subscribe_collection(
        &self,
        collection: &str,
        on_change: ChangeCallback,
        on_error: ErrorCallback,
    ) -> Subscription;

    /// One-shot read of a whole collection.
    fn fetch_collection(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Merges `fields` into an existing document.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the document does not exist.
    fn update_document(&self, collection: &str, id: &str, fields: DocumentFields)
        -> StoreResult<()>;

    /// Inserts a new document and returns its store-assigned ID.
    ///
    /// Records are provisioned outside the task board; this exists for
    /// seeding and administration tools.
    fn create_document(&self, collection: &str, fields: DocumentFields) -> StoreResult<String>;
}
