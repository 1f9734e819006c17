//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the list intents (add/remove/clear/list) as sync FRB functions.
//! - Return one envelope shape carrying the recomputed rows or an error.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every successful envelope holds rows filtered and sorted by the caller's
//!   current controls, fetched after the mutation.

use inventory_core::db::open_db;
use inventory_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DateOrder, InventoryService, InventorySession, ItemRow, QuantityOrder, RepoError,
    SqliteDocumentStore, StoreInventoryRepository, TrackerConfig, ViewControls,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Current state of the list controls on the Dart side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    /// Case-insensitive name filter.
    pub search: String,
    /// `latest|oldest|none`.
    pub date_order: String,
    /// `most|least|all`.
    pub quantity_order: String,
}

/// One rendered inventory line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRowView {
    pub name: String,
    pub display_name: String,
    pub quantity: i64,
}

/// Response envelope shared by all inventory calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryResponse {
    pub ok: bool,
    /// Derived rows; empty on failure.
    pub items: Vec<InventoryRowView>,
    /// Human-readable status for diagnostics/UI.
    pub message: String,
    /// Stable code such as `store_unavailable`; `None` on success.
    pub error_code: Option<String>,
}

impl InventoryResponse {
    fn success(message: impl Into<String>, rows: Vec<ItemRow>) -> Self {
        Self {
            ok: true,
            items: rows.into_iter().map(to_row_view).collect(),
            message: message.into(),
            error_code: None,
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
            error_code: Some(code.to_string()),
        }
    }
}

/// Lists rows under the given controls.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_list(query: InventoryQuery) -> InventoryResponse {
    list_at(&resolve_db_path(), &query)
}

/// Adds one unit of `name` and returns the refreshed rows.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_add(name: String, query: InventoryQuery) -> InventoryResponse {
    add_at(&resolve_db_path(), &name, &query)
}

/// Removes one unit of `name` and returns the refreshed rows.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_remove(name: String, query: InventoryQuery) -> InventoryResponse {
    remove_at(&resolve_db_path(), &name, &query)
}

/// Deletes every item and returns the (empty) refreshed rows.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_clear(query: InventoryQuery) -> InventoryResponse {
    clear_at(&resolve_db_path(), &query)
}

fn list_at(db_path: &Path, query: &InventoryQuery) -> InventoryResponse {
    with_session(db_path, query, "inventory_list", |_| {
        Ok("Loaded.".to_string())
    })
}

fn add_at(db_path: &Path, name: &str, query: &InventoryQuery) -> InventoryResponse {
    with_session(db_path, query, "inventory_add", |session| {
        session.on_add(name)?;
        Ok("Item added.".to_string())
    })
}

fn remove_at(db_path: &Path, name: &str, query: &InventoryQuery) -> InventoryResponse {
    with_session(db_path, query, "inventory_remove", |session| {
        session.on_remove(name)?;
        Ok("Item removed.".to_string())
    })
}

fn clear_at(db_path: &Path, query: &InventoryQuery) -> InventoryResponse {
    with_session(db_path, query, "inventory_clear", |session| {
        let removed = session.on_clear_all()?;
        Ok(format!("Removed {removed} item(s)."))
    })
}

type FfiSession<'conn> = InventorySession<StoreInventoryRepository<SqliteDocumentStore<'conn>>>;

fn with_session(
    db_path: &Path,
    query: &InventoryQuery,
    operation: &str,
    intent: impl FnOnce(&mut FfiSession<'_>) -> Result<String, RepoError>,
) -> InventoryResponse {
    let controls = match parse_controls(query) {
        Ok(controls) => controls,
        Err(message) => return InventoryResponse::failure("invalid_query", message),
    };

    let conn = match open_db(db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return InventoryResponse::failure(
                "store_unavailable",
                format!("{operation} failed: {err}"),
            )
        }
    };

    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));
    let result = InventorySession::open_with(InventoryService::new(repo), controls)
        .and_then(|mut session| {
            let message = intent(&mut session)?;
            Ok((message, session.rows()))
        });

    match result {
        Ok((message, rows)) => InventoryResponse::success(message, rows),
        Err(err) => {
            warn!(
                "event={operation} module=ffi status=error error_code={}",
                err.code()
            );
            InventoryResponse::failure(err.code(), format!("{operation} failed: {err}"))
        }
    }
}

fn parse_controls(query: &InventoryQuery) -> Result<ViewControls, String> {
    let date_order = query
        .date_order
        .parse::<DateOrder>()
        .map_err(|err| err.to_string())?;
    let quantity_order = query
        .quantity_order
        .parse::<QuantityOrder>()
        .map_err(|err| err.to_string())?;
    Ok(ViewControls {
        search: query.search.clone(),
        date_order,
        quantity_order,
    })
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| match TrackerConfig::from_env() {
            Ok(config) => config.db_path,
            Err(_) => inventory_core::config::default_db_path(),
        })
        .clone()
}

fn to_row_view(row: ItemRow) -> InventoryRowView {
    InventoryRowView {
        name: row.name,
        display_name: row.display_name,
        quantity: row.quantity,
    }
}
