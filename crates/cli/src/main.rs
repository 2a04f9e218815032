use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use bookstore_cli::Menu;
use bookstore_infra::{SqliteBookStore, StoreConfig, seed};
use bookstore_inventory::Inventory;
use bookstore_observability::LogFormat;

/// Interactive inventory manager for a bookstore catalog.
#[derive(Debug, Parser)]
#[command(name = "bookstore", version)]
struct Args {
    /// SQLite database file (overrides BOOKSTORE_DB_PATH).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Emit logs as JSON on stderr.
    #[arg(long)]
    log_json: bool,

    /// Add the sample catalog before starting (existing ids are kept).
    #[arg(long)]
    seed: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    bookstore_observability::init(if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let config = match args.db {
        Some(path) => StoreConfig::with_path(path),
        None => StoreConfig::from_env(),
    };
    tracing::info!(db = %config.db_path().display(), "opening catalog");

    let store = SqliteBookStore::open(&config)?;
    let mut inventory = Inventory::open(store)
        .with_context(|| format!("failed to load catalog from {:?}", config.db_path()))?;

    if args.seed {
        seed::seed(&mut inventory).context("failed to seed sample catalog")?;
    }

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    Menu::new(&mut inventory, stdin, stdout).run()?;
    Ok(())
}
