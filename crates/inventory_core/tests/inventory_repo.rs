use inventory_core::db::open_db_in_memory;
use inventory_core::{
    Clock, Document, DocumentSnapshot, DocumentStore, InventoryItem, InventoryRepository,
    ItemChange, RepoError, SqliteDocumentStore, StoreError, StoreInventoryRepository,
    StoreResult, INVENTORY_COLLECTION,
};
use serde_json::json;
use std::cell::Cell;
use std::io::{Error as IoError, ErrorKind};

/// Clock that advances 1000 ms on every read.
struct StepClock {
    next: Cell<i64>,
}

impl StepClock {
    fn starting_at(ms: i64) -> Self {
        Self {
            next: Cell::new(ms),
        }
    }
}

impl Clock for StepClock {
    fn now_ms(&self) -> i64 {
        let now = self.next.get();
        self.next.set(now + 1_000);
        now
    }
}

fn names(items: &[InventoryItem]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

#[test]
fn increment_on_absent_name_creates_single_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::with_clock(
        SqliteDocumentStore::new(&conn),
        StepClock::starting_at(5_000),
    );

    assert_eq!(repo.increment("apples").unwrap(), ItemChange::Created);

    let items = repo.fetch_all().unwrap();
    assert_eq!(items, vec![InventoryItem::new("apples", 1, 5_000)]);
}

#[test]
fn repeated_increments_count_up() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    for expected in 1..=7 {
        let change = repo.increment("bolts").unwrap();
        if expected == 1 {
            assert_eq!(change, ItemChange::Created);
        } else {
            assert_eq!(change, ItemChange::Incremented { quantity: expected });
        }
    }

    let items = repo.fetch_all().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 7);
}

#[test]
fn increment_refreshes_timestamp_but_decrement_preserves_it() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::with_clock(
        SqliteDocumentStore::new(&conn),
        StepClock::starting_at(10_000),
    );

    repo.increment("nails").unwrap();
    repo.increment("nails").unwrap();
    repo.increment("nails").unwrap();
    assert_eq!(repo.fetch_all().unwrap()[0].last_modified, 12_000);

    assert_eq!(
        repo.decrement("nails").unwrap(),
        ItemChange::Decremented { quantity: 2 }
    );
    let items = repo.fetch_all().unwrap();
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].last_modified, 12_000);
}

#[test]
fn decrement_at_one_deletes_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    repo.increment("pears").unwrap();
    repo.increment("plums").unwrap();
    assert_eq!(repo.decrement("pears").unwrap(), ItemChange::Deleted);

    let items = repo.fetch_all().unwrap();
    assert_eq!(names(&items), vec!["plums"]);
}

#[test]
fn decrement_on_absent_name_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    repo.increment("milk").unwrap();
    let before = repo.fetch_all().unwrap();

    assert_eq!(repo.decrement("bread").unwrap(), ItemChange::Absent);
    assert_eq!(repo.fetch_all().unwrap(), before);
}

#[test]
fn increment_then_decrement_restores_absence() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    repo.increment("jam").unwrap();
    repo.decrement("jam").unwrap();

    assert!(repo.fetch_all().unwrap().is_empty());
}

#[test]
fn stored_zero_quantity_is_deleted_on_decrement() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let document = json!({ "quantity": 0, "timestamp": 1 })
        .as_object()
        .cloned()
        .unwrap();
    store.set(INVENTORY_COLLECTION, "dust", &document).unwrap();

    let repo = StoreInventoryRepository::new(&store);
    assert_eq!(repo.decrement("dust").unwrap(), ItemChange::Deleted);
    assert!(repo.fetch_all().unwrap().is_empty());
}

#[test]
fn clear_all_empties_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    for name in ["a", "b", "c"] {
        repo.increment(name).unwrap();
    }
    repo.increment("a").unwrap();

    assert_eq!(repo.clear_all().unwrap(), 3);
    assert!(repo.fetch_all().unwrap().is_empty());
    assert_eq!(repo.clear_all().unwrap(), 0);
}

#[test]
fn names_are_case_sensitive_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    repo.increment("Apples").unwrap();
    repo.increment("apples").unwrap();

    let mut listed = names(&repo.fetch_all().unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    listed.sort();
    assert_eq!(listed, vec!["Apples".to_string(), "apples".to_string()]);
}

#[test]
fn blank_name_is_rejected_without_touching_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));

    assert!(matches!(repo.increment("  "), Err(RepoError::InvalidName(_))));
    assert!(matches!(repo.decrement(""), Err(RepoError::InvalidName(_))));
    assert!(repo.fetch_all().unwrap().is_empty());
}

#[test]
fn fetch_all_defaults_missing_timestamp_and_rejects_missing_quantity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let legacy = json!({ "quantity": 4 }).as_object().cloned().unwrap();
    store.set(INVENTORY_COLLECTION, "legacy", &legacy).unwrap();

    let repo = StoreInventoryRepository::new(&store);
    assert_eq!(
        repo.fetch_all().unwrap(),
        vec![InventoryItem::new("legacy", 4, 0)]
    );

    let broken = json!({ "timestamp": 3 }).as_object().cloned().unwrap();
    store.set(INVENTORY_COLLECTION, "broken", &broken).unwrap();
    assert!(matches!(repo.fetch_all(), Err(RepoError::InvalidData(_))));
}

#[test]
fn increment_at_max_quantity_is_invalid_data_and_keeps_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let full = json!({ "quantity": i64::MAX, "timestamp": 7 })
        .as_object()
        .cloned()
        .unwrap();
    store.set(INVENTORY_COLLECTION, "big", &full).unwrap();
    let repo = StoreInventoryRepository::with_clock(&store, StepClock::starting_at(50_000));

    let err = repo.increment("big").unwrap_err();
    assert_eq!(err.code(), "invalid_data");
    assert_eq!(
        repo.fetch_all().unwrap(),
        vec![InventoryItem::new("big", i64::MAX, 7)]
    );
}

#[test]
fn clear_all_removes_documents_that_fail_to_decode() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (collection, doc_key, body) VALUES ('inventory', 'bad', '[1]');",
        [],
    )
    .unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));
    repo.increment("apples").unwrap();

    assert_eq!(repo.clear_all().unwrap(), 2);
    assert!(repo.fetch_all().unwrap().is_empty());
}

#[test]
fn clear_all_on_sqlite_deletes_nothing_when_one_delete_aborts() {
    let conn = open_db_in_memory().unwrap();
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));
    repo.increment("a").unwrap();
    repo.increment("b").unwrap();
    repo.increment("b").unwrap();
    conn.execute_batch(
        "CREATE TRIGGER keep_b BEFORE DELETE ON documents
         WHEN old.doc_key = 'b'
         BEGIN SELECT RAISE(ABORT, 'b is pinned'); END;",
    )
    .unwrap();

    let err = repo.clear_all().unwrap_err();
    assert!(matches!(err, RepoError::BatchPartialFailure(_)));
    let remaining = repo.fetch_all().unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[1].quantity, 2);
}

/// Store double whose selected operations fail.
#[derive(Default)]
struct FlakyStore {
    items: Vec<(String, i64)>,
    fail_reads: bool,
    fail_batch: bool,
    batch_calls: Cell<usize>,
}

impl FlakyStore {
    fn offline(operation: &'static str) -> StoreError {
        StoreError::unavailable(
            operation,
            IoError::new(ErrorKind::ConnectionRefused, "store offline"),
        )
    }
}

impl DocumentStore for FlakyStore {
    fn get(&self, _collection: &str, key: &str) -> StoreResult<Option<Document>> {
        if self.fail_reads {
            return Err(Self::offline("get"));
        }
        Ok(self
            .items
            .iter()
            .find(|(name, _)| name == key)
            .map(|(name, quantity)| InventoryItem::new(name.clone(), *quantity, 0).to_document()))
    }

    fn set(&self, _collection: &str, _key: &str, _data: &Document) -> StoreResult<()> {
        Err(Self::offline("set"))
    }

    fn delete(&self, _collection: &str, _key: &str) -> StoreResult<bool> {
        Err(Self::offline("delete"))
    }

    fn list(&self, _collection: &str) -> StoreResult<Vec<DocumentSnapshot>> {
        if self.fail_reads {
            return Err(Self::offline("list"));
        }
        Ok(self
            .items
            .iter()
            .map(|(name, quantity)| DocumentSnapshot {
                key: name.clone(),
                data: InventoryItem::new(name.clone(), *quantity, 0).to_document(),
            })
            .collect())
    }

    fn keys(&self, _collection: &str) -> StoreResult<Vec<String>> {
        if self.fail_reads {
            return Err(Self::offline("keys"));
        }
        Ok(self.items.iter().map(|(name, _)| name.clone()).collect())
    }

    fn delete_batch(&self, collection: &str, keys: &[String]) -> StoreResult<()> {
        self.batch_calls.set(self.batch_calls.get() + 1);
        if self.fail_batch {
            return Err(StoreError::batch_rejected(
                collection,
                keys.len(),
                IoError::new(ErrorKind::Other, "batch aborted"),
            ));
        }
        Ok(())
    }
}

#[test]
fn unreachable_store_surfaces_store_unavailable() {
    let store = FlakyStore {
        fail_reads: true,
        ..FlakyStore::default()
    };
    let repo = StoreInventoryRepository::new(&store);

    assert!(matches!(repo.fetch_all(), Err(RepoError::StoreUnavailable(_))));
    assert!(matches!(
        repo.increment("tea"),
        Err(RepoError::StoreUnavailable(_))
    ));
    assert!(matches!(
        repo.decrement("tea"),
        Err(RepoError::StoreUnavailable(_))
    ));
}

#[test]
fn failed_write_after_successful_read_is_not_retried() {
    let store = FlakyStore {
        items: vec![("tea".to_string(), 2)],
        ..FlakyStore::default()
    };
    let repo = StoreInventoryRepository::new(&store);

    let err = repo.increment("tea").unwrap_err();
    assert_eq!(err.code(), "store_unavailable");
    assert!(err.to_string().contains("set"));
}

#[test]
fn rejected_batch_surfaces_batch_partial_failure() {
    let store = FlakyStore {
        items: vec![("a".to_string(), 1), ("b".to_string(), 3)],
        fail_batch: true,
        ..FlakyStore::default()
    };
    let repo = StoreInventoryRepository::new(&store);

    let err = repo.clear_all().unwrap_err();
    assert!(matches!(err, RepoError::BatchPartialFailure(_)));
    assert_eq!(store.batch_calls.get(), 1);
    assert_eq!(repo.fetch_all().unwrap().len(), 2);
}
