//! Database adapters.

pub mod sqlite;

pub use sqlite::SqliteBookStore;
