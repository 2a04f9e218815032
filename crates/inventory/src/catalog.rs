//! In-memory catalog kept in lockstep with a [`BookStore`].
//!
//! Four views are maintained over the same set of books:
//!
//! - `books`: id → book (authoritative)
//! - `ids`: existence set
//! - `by_genre`: genre → ids, genres in lexicographic order
//! - `insertion_order`: history of ids in the order they entered the catalog
//!
//! Every mutation is written to the store first and applied to the views only
//! once the store confirms it, so memory never runs ahead of the table.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, error, info, warn};

use bookstore_core::{BookId, DomainError, DomainResult};

use crate::book::{self, Book, BookRow, NewBook};
use crate::stats::{self, InventoryStats};
use crate::store::{BookPatch, BookStore, StoreError};

pub struct Inventory<S> {
    store: S,
    books: HashMap<BookId, Book>,
    ids: HashSet<BookId>,
    by_genre: BTreeMap<String, BTreeSet<BookId>>,
    insertion_order: Vec<BookId>,
}

impl<S: BookStore> Inventory<S> {
    /// Create an empty catalog over `store`, creating the table if needed.
    ///
    /// Call [`Inventory::load`] afterwards to pull existing rows into memory.
    pub fn new(store: S) -> DomainResult<Self> {
        store.create_schema_if_absent().map_err(|err| {
            error!(error = %err, "failed to create book table");
            DomainError::from(err)
        })?;
        Ok(Self {
            store,
            books: HashMap::new(),
            ids: HashSet::new(),
            by_genre: BTreeMap::new(),
            insertion_order: Vec::new(),
        })
    }

    /// Open the catalog and load every persisted row.
    pub fn open(store: S) -> DomainResult<Self> {
        let mut inventory = Self::new(store)?;
        inventory.load()?;
        Ok(inventory)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the in-memory views with the store's contents.
    ///
    /// A row that fails validation aborts the load and leaves the views empty:
    /// the table holds data this program would never have written.
    pub fn load(&mut self) -> DomainResult<usize> {
        self.clear();

        let rows = self.store.fetch_all().map_err(|err| {
            error!(error = %err, "failed to fetch books");
            DomainError::from(err)
        })?;

        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            books.push(book_from_row(row)?);
        }
        books.sort_by_key(Book::id);

        for book in books {
            self.index(book);
        }

        info!(count = self.books.len(), "loaded books from store");
        Ok(self.books.len())
    }

    /// Add a new book.
    ///
    /// Fails with [`DomainError::Duplicate`] without touching the store if the
    /// id is already catalogued.
    pub fn add(&mut self, input: NewBook) -> DomainResult<&Book> {
        let id = input.id;
        if self.ids.contains(&id) {
            warn!(%id, "rejected add: id already catalogued");
            return Err(DomainError::Duplicate(id));
        }

        let book = Book::new(input).inspect_err(|err| {
            warn!(%id, error = %err, "rejected add: invalid book");
        })?;

        self.store.insert(&book).map_err(|err| {
            match &err {
                StoreError::DuplicateKey(_) => {
                    warn!(%id, "store already holds this id; in-memory index is stale")
                }
                _ => error!(%id, error = %err, "failed to insert book"),
            }
            DomainError::from(err)
        })?;

        info!(%id, title = book.title(), "book added");
        Ok(self.index(book))
    }

    /// Remove a book, returning it.
    pub fn remove(&mut self, id: BookId) -> DomainResult<Book> {
        if !self.ids.contains(&id) {
            warn!(%id, "rejected remove: unknown id");
            return Err(DomainError::NotFound(id));
        }

        let deleted = self.store.delete(id).map_err(|err| {
            error!(%id, error = %err, "failed to delete book");
            DomainError::from(err)
        })?;
        if !deleted {
            warn!(%id, "store has no row for a catalogued id");
            return Err(DomainError::store(format!("no row deleted for id {id}")));
        }

        let book = self.unindex(id)?;
        info!(%id, title = book.title(), "book removed");
        Ok(book)
    }

    pub fn set_quantity(&mut self, id: BookId, quantity: i64) -> DomainResult<()> {
        if !self.ids.contains(&id) {
            warn!(%id, "rejected quantity update: unknown id");
            return Err(DomainError::NotFound(id));
        }
        book::validate_quantity(quantity)?;

        self.persist_patch(id, &BookPatch::quantity(quantity))?;
        self.book_mut(id)?.set_quantity(quantity)?;
        info!(%id, quantity, "quantity updated");
        Ok(())
    }

    pub fn set_price(&mut self, id: BookId, price: f64) -> DomainResult<()> {
        if !self.ids.contains(&id) {
            warn!(%id, "rejected price update: unknown id");
            return Err(DomainError::NotFound(id));
        }
        book::validate_price(price)?;

        self.persist_patch(id, &BookPatch::price(price))?;
        self.book_mut(id)?.set_price(price)?;
        info!(%id, price, "price updated");
        Ok(())
    }

    /// Books whose title or author contains `term`, case-insensitively, ordered by title.
    ///
    /// Matching happens in the store; hits the catalog does not know are dropped.
    pub fn find_by_text(&self, term: &str) -> DomainResult<Vec<&Book>> {
        let rows = self.store.search(term).map_err(|err| {
            error!(term, error = %err, "search failed");
            DomainError::from(err)
        })?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let id = BookId::new(row.id);
                let book = self.books.get(&id);
                if book.is_none() {
                    debug!(%id, "search hit not present in memory; skipping");
                }
                book
            })
            .collect())
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    pub fn contains(&self, id: BookId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// All books, ascending by id.
    pub fn books(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by_key(|b| b.id());
        books
    }

    /// Books grouped by genre. Genres are lexicographic, ids ascending within each.
    pub fn by_genre(&self) -> impl Iterator<Item = (&str, Vec<&Book>)> + '_ {
        self.by_genre.iter().map(move |(genre, ids)| {
            let books = ids.iter().filter_map(|id| self.books.get(id)).collect();
            (genre.as_str(), books)
        })
    }

    /// Ids in the order they entered the catalog.
    pub fn insertion_order(&self) -> &[BookId] {
        &self.insertion_order
    }

    /// `None` when the catalog is empty.
    pub fn statistics(&self) -> Option<InventoryStats> {
        stats::compute(&self.books, &self.by_genre)
    }

    /// Verify that the four views describe the same set of books.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let fail = |msg: String| -> DomainResult<()> { Err(DomainError::corrupted(msg)) };

        if self.ids.len() != self.books.len() || self.insertion_order.len() != self.books.len() {
            return fail(format!(
                "view sizes differ: books={} ids={} history={}",
                self.books.len(),
                self.ids.len(),
                self.insertion_order.len()
            ));
        }

        let mut seen = HashSet::with_capacity(self.insertion_order.len());
        for id in &self.insertion_order {
            if !seen.insert(*id) {
                return fail(format!("id {id} repeated in insertion order"));
            }
        }

        let mut bucketed = 0;
        for (genre, ids) in &self.by_genre {
            if ids.is_empty() {
                return fail(format!("empty genre bucket {genre:?}"));
            }
            for id in ids {
                match self.books.get(id) {
                    Some(book) if book.genre() == genre => bucketed += 1,
                    Some(_) => return fail(format!("id {id} filed under wrong genre {genre:?}")),
                    None => return fail(format!("genre index holds unknown id {id}")),
                }
            }
        }
        if bucketed != self.books.len() {
            return fail(format!("{bucketed} ids indexed by genre, expected {}", self.books.len()));
        }

        for id in self.books.keys() {
            if !self.ids.contains(id) || !seen.contains(id) {
                return fail(format!("id {id} missing from a derived view"));
            }
        }
        Ok(())
    }

    fn persist_patch(&self, id: BookId, patch: &BookPatch) -> DomainResult<()> {
        let updated = self.store.update(id, patch).map_err(|err| {
            error!(%id, error = %err, "failed to update book");
            DomainError::from(err)
        })?;
        if !updated {
            warn!(%id, "store has no row for a catalogued id");
            return Err(DomainError::store(format!("no row updated for id {id}")));
        }
        Ok(())
    }

    fn book_mut(&mut self, id: BookId) -> DomainResult<&mut Book> {
        self.books.get_mut(&id).ok_or(DomainError::NotFound(id))
    }

    fn index(&mut self, book: Book) -> &Book {
        let id = book.id();
        self.ids.insert(id);
        self.insertion_order.push(id);
        self.by_genre
            .entry(book.genre().to_string())
            .or_default()
            .insert(id);
        self.books.entry(id).insert_entry(book).into_mut()
    }

    fn unindex(&mut self, id: BookId) -> DomainResult<Book> {
        let book = self.books.remove(&id).ok_or(DomainError::NotFound(id))?;
        self.ids.remove(&id);
        self.insertion_order.retain(|other| *other != id);
        if let Some(bucket) = self.by_genre.get_mut(book.genre()) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.by_genre.remove(book.genre());
            }
        }
        Ok(book)
    }

    fn clear(&mut self) {
        self.books.clear();
        self.ids.clear();
        self.by_genre.clear();
        self.insertion_order.clear();
    }
}

fn book_from_row(row: BookRow) -> DomainResult<Book> {
    let id = row.id;
    Book::try_from(row).map_err(|err| {
        error!(id, error = %err, "persisted row fails validation");
        DomainError::corrupted(format!("row {id}: {err}"))
    })
}
