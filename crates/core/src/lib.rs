//! `bookstore-core` — shared primitives for the bookstore inventory.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::BookId;
