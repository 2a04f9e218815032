use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use bookstore_core::BookId;

use crate::book::Book;

/// A title and its unit price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedTitle {
    pub title: String,
    pub price: f64,
}

/// Summary figures over the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    pub title_count: usize,
    /// Widened so any number of `i64` stock counts adds up without overflow.
    pub total_units: i128,
    pub total_value: f64,
    pub average_price: f64,
    /// Genre with the most distinct titles; ties go to the lexicographically first genre.
    pub top_genre: String,
    pub most_expensive: PricedTitle,
    pub cheapest: PricedTitle,
}

/// `(price, title)` ordering used for most/least expensive.
fn by_price_then_title(a: &Book, b: &Book) -> Ordering {
    a.price()
        .total_cmp(&b.price())
        .then_with(|| a.title().cmp(b.title()))
}

/// Sum of stock counts over `books`.
pub fn units_in_stock<'a>(books: impl IntoIterator<Item = &'a Book>) -> i128 {
    books.into_iter().map(|b| i128::from(b.quantity())).sum()
}

pub(crate) fn compute(
    books: &HashMap<BookId, Book>,
    by_genre: &BTreeMap<String, BTreeSet<BookId>>,
) -> Option<InventoryStats> {
    let most_expensive = books.values().max_by(|a, b| by_price_then_title(a, b))?;
    let cheapest = books.values().min_by(|a, b| by_price_then_title(a, b))?;

    // max_by keeps the last maximum; fold keeps the first so key order wins ties.
    let (top_genre, _) = by_genre.iter().fold(
        None::<(&String, usize)>,
        |best, (genre, ids)| match best {
            Some((_, count)) if count >= ids.len() => best,
            _ => Some((genre, ids.len())),
        },
    )?;

    let title_count = books.len();
    let total_units = units_in_stock(books.values());
    let total_value = books.values().map(Book::stock_value).sum();
    let price_sum: f64 = books.values().map(Book::price).sum();

    Some(InventoryStats {
        title_count,
        total_units,
        total_value,
        average_price: price_sum / title_count as f64,
        top_genre: top_genre.clone(),
        most_expensive: PricedTitle {
            title: most_expensive.title().to_string(),
            price: most_expensive.price(),
        },
        cheapest: PricedTitle {
            title: cheapest.title().to_string(),
            price: cheapest.price(),
        },
    })
}
