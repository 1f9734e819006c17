//! SQLite-backed document store.
//!
//! Documents live in the `documents` table keyed by `(collection, doc_key)`
//! with the JSON body stored as text.

use super::{Document, DocumentSnapshot, DocumentStore, StoreError, StoreResult};
use crate::db::DbError;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `db::open_db` or `db::open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        ensure_key(key)?;
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_key = ?2;",
                params![collection, key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| unavailable("get", err))?;

        body.map(|text| parse_body(key, &text)).transpose()
    }

    fn set(&self, collection: &str, key: &str, data: &Document) -> StoreResult<()> {
        ensure_key(key)?;
        let body = serde_json::to_string(data).map_err(|err| StoreError::InvalidDocument {
            key: key.to_string(),
            message: err.to_string(),
        })?;

        self.conn
            .execute(
                "INSERT INTO documents (collection, doc_key, body)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (collection, doc_key) DO UPDATE SET body = excluded.body;",
                params![collection, key, body],
            )
            .map_err(|err| unavailable("set", err))?;

        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        ensure_key(key)?;
        let changed = self
            .conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND doc_key = ?2;",
                params![collection, key],
            )
            .map_err(|err| unavailable("delete", err))?;

        Ok(changed > 0)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<DocumentSnapshot>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT doc_key, body
                 FROM documents
                 WHERE collection = ?1
                 ORDER BY doc_key ASC;",
            )
            .map_err(|err| unavailable("list", err))?;

        let mut rows = stmt
            .query([collection])
            .map_err(|err| unavailable("list", err))?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next().map_err(|err| unavailable("list", err))? {
            let key: String = row.get(0).map_err(|err| unavailable("list", err))?;
            let body: String = row.get(1).map_err(|err| unavailable("list", err))?;
            let data = parse_body(&key, &body)?;
            documents.push(DocumentSnapshot { key, data });
        }

        Ok(documents)
    }

    fn keys(&self, collection: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT doc_key
                 FROM documents
                 WHERE collection = ?1
                 ORDER BY doc_key ASC;",
            )
            .map_err(|err| unavailable("keys", err))?;

        let keys = stmt
            .query_map([collection], |row| row.get::<_, String>(0))
            .map_err(|err| unavailable("keys", err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| unavailable("keys", err))?;

        Ok(keys)
    }

    fn delete_batch(&self, collection: &str, keys: &[String]) -> StoreResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let reject = |err: rusqlite::Error| {
            warn!(
                "event=batch_delete module=store status=error collection={collection} keys={} error={err}",
                keys.len()
            );
            StoreError::batch_rejected(collection, keys.len(), DbError::Sqlite(err))
        };

        // Dropping the transaction without commit rolls every delete back.
        let tx = self.conn.unchecked_transaction().map_err(reject)?;
        {
            let mut stmt = tx
                .prepare("DELETE FROM documents WHERE collection = ?1 AND doc_key = ?2;")
                .map_err(reject)?;
            for key in keys {
                stmt.execute(params![collection, key]).map_err(reject)?;
            }
        }
        tx.commit().map_err(reject)?;

        Ok(())
    }
}

fn ensure_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn unavailable(operation: &'static str, err: rusqlite::Error) -> StoreError {
    StoreError::unavailable(operation, DbError::Sqlite(err))
}

fn parse_body(key: &str, text: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::InvalidDocument {
            key: key.to_string(),
            message: format!("expected JSON object, found {}", json_kind(&other)),
        }),
        Err(err) => Err(StoreError::InvalidDocument {
            key: key.to_string(),
            message: err.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteDocumentStore;
    use crate::db::open_db_in_memory;
    use crate::store::{Document, DocumentStore, StoreError};
    use serde_json::json;

    fn doc(quantity: i64) -> Document {
        let mut data = Document::new();
        data.insert("quantity".to_string(), json!(quantity));
        data
    }

    #[test]
    fn set_then_get_returns_same_body() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);

        store.set("inventory", "apples", &doc(3)).unwrap();
        let loaded = store.get("inventory", "apples").unwrap().unwrap();
        assert_eq!(loaded.get("quantity"), Some(&json!(3)));
    }

    #[test]
    fn set_replaces_whole_document() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);

        let mut first = doc(1);
        first.insert("timestamp".to_string(), json!(10));
        store.set("inventory", "pears", &first).unwrap();
        store.set("inventory", "pears", &doc(2)).unwrap();

        let loaded = store.get("inventory", "pears").unwrap().unwrap();
        assert_eq!(loaded.get("quantity"), Some(&json!(2)));
        assert!(loaded.get("timestamp").is_none());
    }

    #[test]
    fn collections_are_isolated() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);

        store.set("inventory", "plums", &doc(1)).unwrap();
        assert!(store.get("archive", "plums").unwrap().is_none());
        assert!(store.list("archive").unwrap().is_empty());
    }

    #[test]
    fn delete_reports_whether_document_existed() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);

        store.set("inventory", "kiwi", &doc(1)).unwrap();
        assert!(store.delete("inventory", "kiwi").unwrap());
        assert!(!store.delete("inventory", "kiwi").unwrap());
    }

    #[test]
    fn empty_key_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);

        let err = store.set("inventory", "", &doc(1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn non_object_body_is_reported_as_invalid_document() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO documents (collection, doc_key, body) VALUES ('inventory', 'bad', '[1,2]');",
            [],
        )
        .unwrap();
        let store = SqliteDocumentStore::new(&conn);

        let err = store.get("inventory", "bad").unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { ref key, .. } if key == "bad"));
    }

    #[test]
    fn keys_skip_body_decoding() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO documents (collection, doc_key, body) VALUES ('inventory', 'bad', '[1]');",
            [],
        )
        .unwrap();
        let store = SqliteDocumentStore::new(&conn);
        store.set("inventory", "apples", &doc(1)).unwrap();

        assert_eq!(
            store.keys("inventory").unwrap(),
            vec!["apples".to_string(), "bad".to_string()]
        );
        assert!(store.keys("archive").unwrap().is_empty());
    }

    #[test]
    fn delete_batch_rolls_back_when_a_later_delete_fails() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);
        store.set("inventory", "a", &doc(1)).unwrap();
        store.set("inventory", "b", &doc(2)).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER keep_b BEFORE DELETE ON documents
             WHEN old.doc_key = 'b'
             BEGIN SELECT RAISE(ABORT, 'b is pinned'); END;",
        )
        .unwrap();

        let err = store
            .delete_batch("inventory", &["a".to_string(), "b".to_string()])
            .unwrap_err();
        assert!(matches!(err, StoreError::BatchRejected { keys: 2, .. }));
        assert_eq!(
            store.keys("inventory").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn delete_batch_ignores_missing_keys() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);

        store.set("inventory", "a", &doc(1)).unwrap();
        store
            .delete_batch("inventory", &["a".to_string(), "ghost".to_string()])
            .unwrap();
        assert!(store.list("inventory").unwrap().is_empty());
    }
}
