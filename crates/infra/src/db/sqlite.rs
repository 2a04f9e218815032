//! SQLite-backed book store.
//!
//! Every call opens its own connection and closes it before returning, on
//! the error paths too. The sqlx futures are driven on a private
//! current-thread runtime so callers stay fully synchronous.

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Connection, Row};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use bookstore_core::BookId;
use bookstore_inventory::{Book, BookPatch, BookRow, BookStore, StoreError};

use crate::config::StoreConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id       INTEGER PRIMARY KEY,
        title    TEXT    NOT NULL,
        author   TEXT    NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        price    REAL    NOT NULL CHECK (price > 0),
        genre    TEXT    NOT NULL
    )
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, author, quantity, price, genre FROM books";

/// Book store persisting to a single SQLite file.
#[derive(Debug)]
pub struct SqliteBookStore {
    options: SqliteConnectOptions,
    runtime: Runtime,
}

impl SqliteBookStore {
    /// Prepare a store for the database file named by `config`.
    ///
    /// No connection is opened here; the file is created on first use.
    pub fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        config.ensure_parent_dir()?;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build runtime for SqliteBookStore")?;

        let options = SqliteConnectOptions::new()
            .filename(config.db_path())
            .create_if_missing(true);

        Ok(Self { options, runtime })
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        SqliteConnection::connect_with(&self.options)
            .await
            .map_err(backend)
    }
}

/// Close `conn`, then hand back `result`.
///
/// A failed close is logged rather than returned: the statement already ran.
async fn finish<T>(
    conn: SqliteConnection,
    result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    if let Err(err) = conn.close().await {
        warn!("failed to close sqlite connection: {err:?}");
    }
    result
}

fn backend(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_check_violation() => {
            StoreError::Constraint(db.message().to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn row_to_book(row: &SqliteRow) -> Result<BookRow, StoreError> {
    Ok(BookRow {
        id: row.try_get("id").map_err(backend)?,
        title: row.try_get("title").map_err(backend)?,
        author: row.try_get("author").map_err(backend)?,
        quantity: row.try_get("quantity").map_err(backend)?,
        price: row.try_get("price").map_err(backend)?,
        genre: row.try_get("genre").map_err(backend)?,
    })
}

/// Escape LIKE wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl BookStore for SqliteBookStore {
    fn create_schema_if_absent(&self) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let result = sqlx::query(CREATE_TABLE).execute(&mut conn).await;
            finish(conn, result).await.map_err(backend)?;
            debug!("books table ready");
            Ok(())
        })
    }

    fn insert(&self, book: &Book) -> Result<(), StoreError> {
        let row = book.snapshot();
        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let result = sqlx::query(
                r#"
                INSERT INTO books (id, title, author, quantity, price, genre)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(row.id)
            .bind(&row.title)
            .bind(&row.author)
            .bind(row.quantity)
            .bind(row.price)
            .bind(&row.genre)
            .execute(&mut conn)
            .await;

            match finish(conn, result).await {
                Ok(_) => {
                    debug!(id = row.id, "inserted book row");
                    Ok(())
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    Err(StoreError::DuplicateKey(book.id()))
                }
                Err(err) => Err(backend(err)),
            }
        })
    }

    fn fetch_all(&self) -> Result<Vec<BookRow>, StoreError> {
        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let result = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
                .fetch_all(&mut conn)
                .await;
            let rows = finish(conn, result).await.map_err(backend)?;
            rows.iter().map(row_to_book).collect()
        })
    }

    fn fetch_by_id(&self, id: BookId) -> Result<Option<BookRow>, StoreError> {
        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let result = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                .bind(id.get())
                .fetch_optional(&mut conn)
                .await;
            let row = finish(conn, result).await.map_err(backend)?;
            row.as_ref().map(row_to_book).transpose()
        })
    }

    fn update(&self, id: BookId, patch: &BookPatch) -> Result<bool, StoreError> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut assignments = Vec::with_capacity(2);
        if patch.quantity.is_some() {
            assignments.push("quantity = ?");
        }
        if patch.price.is_some() {
            assignments.push("price = ?");
        }
        let sql = format!("UPDATE books SET {} WHERE id = ?", assignments.join(", "));

        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let mut query = sqlx::query(&sql);
            if let Some(quantity) = patch.quantity {
                query = query.bind(quantity);
            }
            if let Some(price) = patch.price {
                query = query.bind(price);
            }
            let result = query.bind(id.get()).execute(&mut conn).await;

            let done = finish(conn, result).await.map_err(backend)?;
            debug!(%id, rows = done.rows_affected(), "updated book row");
            Ok(done.rows_affected() > 0)
        })
    }

    fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let result = sqlx::query("DELETE FROM books WHERE id = ?")
                .bind(id.get())
                .execute(&mut conn)
                .await;

            let done = finish(conn, result).await.map_err(backend)?;
            debug!(%id, rows = done.rows_affected(), "deleted book row");
            Ok(done.rows_affected() > 0)
        })
    }

    fn search(&self, term: &str) -> Result<Vec<BookRow>, StoreError> {
        let pattern = like_pattern(term);
        self.runtime.block_on(async {
            let mut conn = self.connect().await?;
            let result = sqlx::query(&format!(
                r"{SELECT_COLUMNS}
                WHERE title LIKE ? ESCAPE '\' OR author LIKE ? ESCAPE '\'
                ORDER BY title"
            ))
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&mut conn)
            .await;

            let rows = finish(conn, result).await.map_err(backend)?;
            rows.iter().map(row_to_book).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_inventory::{Inventory, NewBook};
    use tempfile::TempDir;

    fn store() -> (TempDir, SqliteBookStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_path(dir.path().join("books.db"));
        let store = SqliteBookStore::open(&config).unwrap();
        store.create_schema_if_absent().unwrap();
        (dir, store)
    }

    fn book(id: i64, title: &str, author: &str) -> Book {
        Book::new(NewBook::new(id, title, author, 4, 19.99).with_genre("Clásico")).unwrap()
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let (_dir, store) = store();
        store.create_schema_if_absent().unwrap();
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_path(dir.path().join("nested/data/books.db"));
        let store = SqliteBookStore::open(&config).unwrap();
        store.create_schema_if_absent().unwrap();
        assert!(config.db_path().exists());
    }

    #[test]
    fn insert_then_fetch_by_id() {
        let (_dir, store) = store();
        let don_quijote = book(2, "Don Quijote de la Mancha", "Miguel de Cervantes");
        store.insert(&don_quijote).unwrap();

        let row = store.fetch_by_id(BookId::new(2)).unwrap().unwrap();
        assert_eq!(row, don_quijote.snapshot());
        assert!(store.fetch_by_id(BookId::new(3)).unwrap().is_none());
    }

    #[test]
    fn duplicate_primary_key_is_reported_as_duplicate() {
        let (_dir, store) = store();
        store.insert(&book(1, "Emma", "Jane Austen")).unwrap();

        let err = store.insert(&book(1, "Persuasion", "Jane Austen")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey(BookId::new(1)));
    }

    #[test]
    fn fetch_all_is_ordered_by_id() {
        let (_dir, store) = store();
        for id in [5, 2, 9] {
            store.insert(&book(id, "T", "A")).unwrap();
        }
        let ids: Vec<i64> = store.fetch_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn update_applies_patch_and_reports_missing_rows() {
        let (_dir, store) = store();
        store.insert(&book(1, "Emma", "Jane Austen")).unwrap();

        let patch = BookPatch {
            quantity: Some(11),
            price: Some(25.5),
        };
        assert!(store.update(BookId::new(1), &patch).unwrap());
        let row = store.fetch_by_id(BookId::new(1)).unwrap().unwrap();
        assert_eq!((row.quantity, row.price), (11, 25.5));

        assert!(!store.update(BookId::new(7), &BookPatch::quantity(1)).unwrap());
        assert!(!store.update(BookId::new(1), &BookPatch::default()).unwrap());
    }

    #[test]
    fn check_constraints_surface_as_constraint_errors() {
        let (_dir, store) = store();
        store.insert(&book(1, "Emma", "Jane Austen")).unwrap();

        let err = store.update(BookId::new(1), &BookPatch::quantity(-1)).unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)), "got {err:?}");
    }

    #[test]
    fn delete_reports_whether_a_row_went_away() {
        let (_dir, store) = store();
        store.insert(&book(1, "Emma", "Jane Austen")).unwrap();

        assert!(store.delete(BookId::new(1)).unwrap());
        assert!(!store.delete(BookId::new(1)).unwrap());
    }

    #[test]
    fn search_matches_title_or_author_ignoring_case() {
        let (_dir, store) = store();
        store.insert(&book(1, "Homage to Catalonia", "George Orwell")).unwrap();
        store.insert(&book(2, "1984", "George Orwell")).unwrap();
        store.insert(&book(3, "Sapiens", "Yuval Noah Harari")).unwrap();

        let titles: Vec<String> = store
            .search("orwell")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["1984", "Homage to Catalonia"]);

        let titles: Vec<String> = store
            .search("SAPI")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Sapiens"]);
    }

    #[test]
    fn search_folds_ascii_case_only() {
        let (_dir, store) = store();
        store.insert(&book(1, "Él", "Ángel Ruiz")).unwrap();

        assert_eq!(store.search("RUIZ").unwrap().len(), 1);
        assert_eq!(store.search("Ángel").unwrap().len(), 1);
        assert!(store.search("ángel").unwrap().is_empty());
        assert!(store.search("él").unwrap().is_empty());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let (_dir, store) = store();
        store.insert(&book(1, "100% Natural", "A")).unwrap();
        store.insert(&book(2, "1000 Natural", "B")).unwrap();

        let hits = store.search("0%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
        assert!(store.search("_").unwrap().is_empty());
    }

    #[test]
    fn inventory_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_path(dir.path().join("books.db"));

        {
            let mut inv = Inventory::open(SqliteBookStore::open(&config).unwrap()).unwrap();
            inv.add(NewBook::new(3, "1984", "George Orwell", 12, 32.75).with_genre("Distopía"))
                .unwrap();
            inv.add(NewBook::new(5, "Sapiens", "Yuval Noah Harari", 6, 52.0)).unwrap();
            inv.set_price(BookId::new(5), 60.0).unwrap();
            inv.remove(BookId::new(3)).unwrap();
        }

        let inv = Inventory::open(SqliteBookStore::open(&config).unwrap()).unwrap();
        assert_eq!(inv.len(), 1);
        let sapiens = inv.get(BookId::new(5)).unwrap();
        assert_eq!(sapiens.price(), 60.0);
        assert_eq!(sapiens.genre(), "General");
        inv.check_invariants().unwrap();
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a%b_c\\"), r"%a\%b\_c\\%");
    }
}
