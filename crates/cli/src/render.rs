//! Text rendering of catalog listings and reports.

use std::io::{self, Write};

use bookstore_inventory::{BookStore, Inventory, InventoryStats, units_in_stock};

const WIDE_RULE: &str =
    "================================================================================";
const RULE: &str = "============================================================";

pub fn catalog<S: BookStore>(out: &mut impl Write, inventory: &Inventory<S>) -> io::Result<()> {
    if inventory.is_empty() {
        return writeln!(out, "The inventory is empty");
    }

    let books = inventory.books();
    let units = units_in_stock(books.iter().copied());
    let value: f64 = books.iter().map(|b| b.stock_value()).sum();

    writeln!(out, "\n{WIDE_RULE}")?;
    writeln!(out, "FULL BOOKSTORE INVENTORY")?;
    writeln!(out, "{WIDE_RULE}")?;
    writeln!(
        out,
        "Summary: {} distinct titles | {units} books in stock | Total value: ${value:.2}",
        books.len()
    )?;
    writeln!(out, "{}", "-".repeat(80))?;
    for book in books {
        writeln!(out, "  {book}")?;
    }
    writeln!(out, "{WIDE_RULE}")
}

pub fn by_genre<S: BookStore>(out: &mut impl Write, inventory: &Inventory<S>) -> io::Result<()> {
    if inventory.is_empty() {
        return writeln!(out, "There are no books in the inventory");
    }

    writeln!(out, "\n{RULE}")?;
    writeln!(out, "INVENTORY BY GENRE")?;
    writeln!(out, "{RULE}")?;
    for (genre, books) in inventory.by_genre() {
        writeln!(out, "\n{} ({} titles):", genre.to_uppercase(), books.len())?;
        writeln!(out, "{}", "-".repeat(40))?;
        for book in books {
            writeln!(
                out,
                "  * {} - {} (Stock: {})",
                book.title(),
                book.author(),
                book.quantity()
            )?;
        }
    }
    Ok(())
}

pub fn statistics(out: &mut impl Write, stats: Option<&InventoryStats>) -> io::Result<()> {
    let Some(stats) = stats else {
        return writeln!(out, "No data to compute statistics");
    };

    writeln!(out, "\n{RULE}")?;
    writeln!(out, "INVENTORY STATISTICS")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Distinct titles: {}", stats.title_count)?;
    writeln!(out, "Books in stock: {}", stats.total_units)?;
    writeln!(out, "Total inventory value: ${:.2}", stats.total_value)?;
    writeln!(out, "Average price per title: ${:.2}", stats.average_price)?;
    writeln!(out, "Genre with most titles: {}", stats.top_genre)?;
    writeln!(
        out,
        "Most expensive: {} (${:.2})",
        stats.most_expensive.title, stats.most_expensive.price
    )?;
    writeln!(
        out,
        "Cheapest: {} (${:.2})",
        stats.cheapest.title, stats.cheapest.price
    )?;
    writeln!(out, "{RULE}")
}
