//! Command-line front end for the inventory tracker.
//!
//! # Responsibility
//! - Map subcommands onto session intents against a SQLite-backed store.
//! - Render the derived list as a table or JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inventory_core::db::open_db;
use inventory_core::{
    init_logging, ConfigOverrides, DateOrder, InventoryRepository, InventoryService,
    InventorySession, ItemChange, ItemRow, QuantityOrder, SortControl, SqliteDocumentStore,
    StoreInventoryRepository, TrackerConfig,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "inventory", version, about = "Track named stock items")]
struct Cli {
    /// SQLite database file (overrides INVENTORY_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides INVENTORY_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute log directory (overrides INVENTORY_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add one unit of an item, creating it if needed.
    Add { name: String },
    /// Remove one unit of an item, deleting it at zero.
    Remove { name: String },
    /// Delete every item.
    Clear,
    /// Show the filtered, sorted list.
    List(ListArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive name filter.
    #[arg(long, default_value = "")]
    search: String,

    #[arg(long, value_enum, default_value_t = DateArg::Latest)]
    date: DateArg,

    #[arg(long, value_enum, default_value_t = QuantityArg::All)]
    quantity: QuantityArg,

    /// Print rows as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateArg {
    Latest,
    Oldest,
    None,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QuantityArg {
    Most,
    Least,
    All,
}

impl From<DateArg> for DateOrder {
    fn from(value: DateArg) -> Self {
        match value {
            DateArg::Latest => DateOrder::MostRecentFirst,
            DateArg::Oldest => DateOrder::OldestFirst,
            DateArg::None => DateOrder::Unsorted,
        }
    }
}

impl From<QuantityArg> for QuantityOrder {
    fn from(value: QuantityArg) -> Self {
        match value {
            QuantityArg::Most => QuantityOrder::HighestFirst,
            QuantityArg::Least => QuantityOrder::LowestFirst,
            QuantityArg::All => QuantityOrder::Unsorted,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        db_path: cli.db,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    };
    let config = TrackerConfig::resolve(&overrides, |key| std::env::var(key).ok())
        .context("invalid configuration")?;

    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(config.log_level, &log_dir.to_string_lossy())
            .context("failed to initialize logging")?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let repo = StoreInventoryRepository::new(SqliteDocumentStore::new(&conn));
    let mut session = InventorySession::open(InventoryService::new(repo))
        .context("failed to load inventory")?;

    info!("event=cli_command module=cli status=start");
    match cli.command {
        Command::Add { name } => {
            let change = session.on_add(&name)?;
            println!("{}", describe(&name, change));
        }
        Command::Remove { name } => {
            let change = session.on_remove(&name)?;
            println!("{}", describe(&name, change));
        }
        Command::Clear => {
            let removed = session.on_clear_all()?;
            println!("Removed {removed} item(s).");
        }
        Command::List(args) => print_list(&mut session, args)?,
    }
    Ok(())
}

fn print_list<R: InventoryRepository>(
    session: &mut InventorySession<R>,
    args: ListArgs,
) -> Result<()> {
    session.on_search_changed(&args.search);
    session.on_sort_control_changed(SortControl::Date(args.date.into()));
    session.on_sort_control_changed(SortControl::Quantity(args.quantity.into()));
    let rows = session.rows();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No items.");
        return Ok(());
    }
    print_table(&rows);
    Ok(())
}

fn print_table(rows: &[ItemRow]) {
    let width = rows
        .iter()
        .map(|row| row.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Item".len());
    println!("{:<width$}  {:>8}", "Item", "Quantity");
    for row in rows {
        println!("{:<width$}  {:>8}", row.display_name, row.quantity);
    }
}

fn describe(name: &str, change: ItemChange) -> String {
    match change {
        ItemChange::Created => format!("Added `{name}` (quantity 1)."),
        ItemChange::Incremented { quantity } => format!("`{name}` now at {quantity}."),
        ItemChange::Decremented { quantity } => format!("`{name}` now at {quantity}."),
        ItemChange::Deleted => format!("Removed `{name}`."),
        ItemChange::Absent => format!("`{name}` is not in the inventory."),
    }
}
