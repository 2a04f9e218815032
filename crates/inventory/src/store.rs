//! Persistence gateway abstraction for the catalog table.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use bookstore_core::{BookId, DomainError};

use crate::book::{Book, BookRow};

/// Store error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("a row with id {0} already exists")]
    DuplicateKey(BookId),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("storage error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(id) => DomainError::Duplicate(id),
            other => DomainError::store(other.to_string()),
        }
    }
}

/// Partial update of a persisted book.
///
/// Only quantity and price are updatable; title, author and genre are fixed
/// once a book is catalogued.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookPatch {
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl BookPatch {
    pub fn quantity(quantity: i64) -> Self {
        Self {
            quantity: Some(quantity),
            price: None,
        }
    }

    pub fn price(price: f64) -> Self {
        Self {
            quantity: None,
            price: Some(price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.price.is_none()
    }
}

/// Single-table book store.
///
/// Each call is atomic with respect to the table. Failures come back as
/// [`StoreError`] values so the caller can keep its in-memory view intact.
pub trait BookStore: Send + Sync {
    /// Ensure the backing table exists. Idempotent.
    fn create_schema_if_absent(&self) -> Result<(), StoreError>;

    fn insert(&self, book: &Book) -> Result<(), StoreError>;

    /// All rows, ascending by id.
    fn fetch_all(&self) -> Result<Vec<BookRow>, StoreError>;

    fn fetch_by_id(&self, id: BookId) -> Result<Option<BookRow>, StoreError>;

    /// Apply `patch`. Returns `false` when the id is absent or the patch is empty.
    fn update(&self, id: BookId, patch: &BookPatch) -> Result<bool, StoreError>;

    /// Returns `false` when the id is absent.
    fn delete(&self, id: BookId) -> Result<bool, StoreError>;

    /// Rows whose title or author contains `term` (case-insensitive), ordered by title.
    fn search(&self, term: &str) -> Result<Vec<BookRow>, StoreError>;
}

impl<S> BookStore for Arc<S>
where
    S: BookStore + ?Sized,
{
    fn create_schema_if_absent(&self) -> Result<(), StoreError> {
        (**self).create_schema_if_absent()
    }

    fn insert(&self, book: &Book) -> Result<(), StoreError> {
        (**self).insert(book)
    }

    fn fetch_all(&self) -> Result<Vec<BookRow>, StoreError> {
        (**self).fetch_all()
    }

    fn fetch_by_id(&self, id: BookId) -> Result<Option<BookRow>, StoreError> {
        (**self).fetch_by_id(id)
    }

    fn update(&self, id: BookId, patch: &BookPatch) -> Result<bool, StoreError> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }

    fn search(&self, term: &str) -> Result<Vec<BookRow>, StoreError> {
        (**self).search(term)
    }
}

/// In-memory book store for tests/dev.
///
/// Enforces the same constraints as the SQL table. Search folds ASCII case
/// only, like SQLite's `LIKE`.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    rows: RwLock<BTreeMap<BookId, BookRow>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<BookId, BookRow>>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<BookId, BookRow>>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

fn check_row(row: &BookRow) -> Result<(), StoreError> {
    if row.quantity < 0 {
        return Err(StoreError::Constraint("quantity >= 0".to_string()));
    }
    if row.price.is_nan() || row.price <= 0.0 {
        return Err(StoreError::Constraint("price > 0".to_string()));
    }
    Ok(())
}

impl BookStore for InMemoryBookStore {
    fn create_schema_if_absent(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn insert(&self, book: &Book) -> Result<(), StoreError> {
        let row = book.snapshot();
        check_row(&row)?;
        let mut rows = self.write()?;
        if rows.contains_key(&book.id()) {
            return Err(StoreError::DuplicateKey(book.id()));
        }
        rows.insert(book.id(), row);
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<BookRow>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn fetch_by_id(&self, id: BookId) -> Result<Option<BookRow>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update(&self, id: BookId, patch: &BookPatch) -> Result<bool, StoreError> {
        if patch.is_empty() {
            return Ok(false);
        }
        let mut rows = self.write()?;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(false);
        };

        let mut updated = row.clone();
        if let Some(quantity) = patch.quantity {
            updated.quantity = quantity;
        }
        if let Some(price) = patch.price {
            updated.price = price;
        }
        check_row(&updated)?;
        *row = updated;
        Ok(true)
    }

    fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    fn search(&self, term: &str) -> Result<Vec<BookRow>, StoreError> {
        let needle = term.to_ascii_lowercase();
        let mut hits: Vec<BookRow> = self
            .read()?
            .values()
            .filter(|row| {
                row.title.to_ascii_lowercase().contains(&needle)
                    || row.author.to_ascii_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(hits)
    }
}
