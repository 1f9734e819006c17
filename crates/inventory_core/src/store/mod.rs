//! Document store contract.
//!
//! # Responsibility
//! - Model a keyed document collection: get, upsert, delete, list, key
//!   listing and all-or-nothing batch delete.
//! - Keep the backend (SQLite here, a remote client elsewhere) behind one seam.
//!
//! # Invariants
//! - Every call is individually consistent; nothing spans two calls.
//! - `delete_batch` either removes every listed key or none of them.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;

/// Document body: a JSON object of named fields.
pub type Document = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

type BoxedCause = Box<dyn Error + Send + Sync + 'static>;

/// One document as returned by [`DocumentStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub key: String,
    pub data: Document,
}

/// Errors surfaced by document store backends.
#[derive(Debug)]
pub enum StoreError {
    /// Backend could not serve the call (I/O, locking, network).
    Unavailable {
        operation: &'static str,
        source: BoxedCause,
    },
    /// Batch delete was rejected as a whole; nothing was deleted.
    BatchRejected {
        collection: String,
        keys: usize,
        source: BoxedCause,
    },
    /// Stored body is not a JSON object.
    InvalidDocument { key: String, message: String },
    /// Empty document keys are not addressable.
    InvalidKey(String),
}

impl StoreError {
    pub fn unavailable(operation: &'static str, source: impl Into<BoxedCause>) -> Self {
        Self::Unavailable {
            operation,
            source: source.into(),
        }
    }

    pub fn batch_rejected(
        collection: impl Into<String>,
        keys: usize,
        source: impl Into<BoxedCause>,
    ) -> Self {
        Self::BatchRejected {
            collection: collection.into(),
            keys,
            source: source.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { operation, source } => {
                write!(f, "document store unavailable during {operation}: {source}")
            }
            Self::BatchRejected {
                collection,
                keys,
                source,
            } => write!(
                f,
                "batch delete of {keys} document(s) in `{collection}` rejected: {source}"
            ),
            Self::InvalidDocument { key, message } => {
                write!(f, "invalid document `{key}`: {message}")
            }
            Self::InvalidKey(key) => write!(f, "invalid document key `{key}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable { source, .. } | Self::BatchRejected { source, .. } => {
                Some(source.as_ref())
            }
            Self::InvalidDocument { .. } | Self::InvalidKey(_) => None,
        }
    }
}

/// Keyed document collection operations.
pub trait DocumentStore {
    /// Reads one document. Returns `None` when the key is absent.
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Creates or fully replaces one document.
    fn set(&self, collection: &str, key: &str, data: &Document) -> StoreResult<()>;

    /// Deletes one document. Returns whether it existed.
    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// Lists every document in a collection.
    fn list(&self, collection: &str) -> StoreResult<Vec<DocumentSnapshot>>;

    /// Lists every key in a collection without reading bodies.
    fn keys(&self, collection: &str) -> StoreResult<Vec<String>>;

    /// Deletes all `keys` atomically. Missing keys are ignored.
    fn delete_batch(&self, collection: &str, keys: &[String]) -> StoreResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, key)
    }

    fn set(&self, collection: &str, key: &str, data: &Document) -> StoreResult<()> {
        (**self).set(collection, key, data)
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        (**self).delete(collection, key)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<DocumentSnapshot>> {
        (**self).list(collection)
    }

    fn keys(&self, collection: &str) -> StoreResult<Vec<String>> {
        (**self).keys(collection)
    }

    fn delete_batch(&self, collection: &str, keys: &[String]) -> StoreResult<()> {
        (**self).delete_batch(collection, keys)
    }
}
