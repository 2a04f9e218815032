//! Configuration loading and representation.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "BOOKSTORE_DB_PATH";

/// Database file used when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = "bookstore_inventory.db";

/// Where the catalog is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    db_path: PathBuf,
}

impl StoreConfig {
    pub fn with_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Read `BOOKSTORE_DB_PATH`, falling back to [`DEFAULT_DB_PATH`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => Self::with_path(path),
            None => {
                tracing::debug!("{DB_PATH_ENV} not set; using {DEFAULT_DB_PATH}");
                Self::with_path(DEFAULT_DB_PATH)
            }
        }
    }

    /// Create the directory holding the database file if it is missing.
    pub fn ensure_parent_dir(&self) -> anyhow::Result<()> {
        let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory at {parent:?}"))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_path(DEFAULT_DB_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_wins_over_default() {
        let config = StoreConfig::from_lookup(|_| Some("/var/lib/shop/books.db".to_string()));
        assert_eq!(config.db_path(), Path::new("/var/lib/shop/books.db"));
    }

    #[test]
    fn missing_or_blank_env_falls_back_to_default() {
        assert_eq!(StoreConfig::from_lookup(|_| None), StoreConfig::default());
        assert_eq!(
            StoreConfig::from_lookup(|_| Some("  ".to_string())),
            StoreConfig::default()
        );
    }

    #[test]
    fn bare_file_name_needs_no_directory() {
        StoreConfig::with_path("books.db").ensure_parent_dir().unwrap();
    }
}
