use serde::{Deserialize, Serialize};

use bookstore_core::{BookId, DomainError, DomainResult};

/// Genre assigned when the caller does not name one.
pub const DEFAULT_GENRE: &str = "General";

/// One catalog entry.
///
/// Fields are private so every value reachable through the public API has
/// passed validation. The id never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    quantity: i64,
    price: f64,
    genre: String,
}

/// Input for a new catalog entry (unvalidated).
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub quantity: i64,
    pub price: f64,
    pub genre: String,
}

impl NewBook {
    /// New entry in the default genre.
    pub fn new(
        id: i64,
        title: impl Into<String>,
        author: impl Into<String>,
        quantity: i64,
        price: f64,
    ) -> Self {
        Self {
            id: BookId::new(id),
            title: title.into(),
            author: author.into(),
            quantity,
            price,
            genre: DEFAULT_GENRE.to_string(),
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }
}

/// Ordered field snapshot of a book, in table column order.
///
/// This is also the shape of a raw row coming back from a store, before it
/// has been re-validated into a [`Book`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub quantity: i64,
    pub price: f64,
    pub genre: String,
}

impl Book {
    /// Validate every field and build the record.
    pub fn new(input: NewBook) -> DomainResult<Self> {
        Ok(Self {
            id: input.id,
            title: validate_text("title", &input.title)?,
            author: validate_text("author", &input.author)?,
            quantity: validate_quantity(input.quantity)?,
            price: validate_price(input.price)?,
            genre: validate_text("genre", &input.genre)?,
        })
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    /// Stock value of this entry (`quantity × price`).
    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        self.quantity = validate_quantity(quantity)?;
        Ok(())
    }

    pub fn set_price(&mut self, price: f64) -> DomainResult<()> {
        self.price = validate_price(price)?;
        Ok(())
    }

    pub fn snapshot(&self) -> BookRow {
        BookRow {
            id: self.id.get(),
            title: self.title.clone(),
            author: self.author.clone(),
            quantity: self.quantity,
            price: self.price,
            genre: self.genre.clone(),
        }
    }
}

impl TryFrom<BookRow> for Book {
    type Error = DomainError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Book::new(NewBook {
            id: BookId::new(row.id),
            title: row.title,
            author: row.author,
            quantity: row.quantity,
            price: row.price,
            genre: row.genre,
        })
    }
}

impl core::fmt::Display for Book {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ID: {} | '{}' by {} | Stock: {} | Price: ${:.2} | Genre: {}",
            self.id, self.title, self.author, self.quantity, self.price, self.genre
        )
    }
}

fn validate_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(quantity)
}

pub(crate) fn validate_price(price: f64) -> DomainResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::validation("price must be greater than 0"));
    }
    Ok(price)
}
