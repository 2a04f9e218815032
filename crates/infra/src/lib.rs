//! Infrastructure layer: SQLite persistence, configuration, sample data.

pub mod config;
pub mod db;
pub mod seed;

pub use config::StoreConfig;
pub use db::SqliteBookStore;
