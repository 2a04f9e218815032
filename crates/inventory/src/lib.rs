//! Bookstore inventory domain.
//!
//! Validated [`Book`] records, the [`BookStore`] persistence port, and the
//! [`Inventory`] that keeps its in-memory indices in step with the store.

pub mod book;
pub mod catalog;
pub mod stats;
pub mod store;

pub use book::{Book, BookRow, DEFAULT_GENRE, NewBook};
pub use catalog::Inventory;
pub use stats::{InventoryStats, PricedTitle, units_in_stock};
pub use store::{BookPatch, BookStore, InMemoryBookStore, StoreError};
