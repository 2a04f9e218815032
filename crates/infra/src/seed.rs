//! Sample catalog for demos and first runs.

use tracing::info;

use bookstore_core::DomainError;
use bookstore_inventory::{BookStore, Inventory, NewBook};

/// The eight sample books shipped with the tool.
pub fn sample_catalog() -> Vec<NewBook> {
    vec![
        NewBook::new(1, "Cien años de soledad", "Gabriel García Márquez", 15, 45.50)
            .with_genre("Ficción"),
        NewBook::new(2, "Don Quijote de la Mancha", "Miguel de Cervantes", 8, 38.00)
            .with_genre("Clásico"),
        NewBook::new(3, "1984", "George Orwell", 12, 32.75).with_genre("Distopía"),
        NewBook::new(4, "El principito", "Antoine de Saint-Exupéry", 20, 25.90)
            .with_genre("Infantil"),
        NewBook::new(5, "Sapiens", "Yuval Noah Harari", 6, 52.00).with_genre("Historia"),
        NewBook::new(6, "La sombra del viento", "Carlos Ruiz Zafón", 10, 41.25)
            .with_genre("Misterio"),
        NewBook::new(7, "El código Da Vinci", "Dan Brown", 7, 39.99).with_genre("Suspenso"),
        NewBook::new(8, "Orgullo y prejuicio", "Jane Austen", 9, 35.50).with_genre("Romance"),
    ]
}

/// Add every sample book whose id is not catalogued yet. Returns how many were added.
pub fn seed<S: BookStore>(inventory: &mut Inventory<S>) -> Result<usize, DomainError> {
    let mut added = 0;
    for book in sample_catalog() {
        if inventory.contains(book.id) {
            continue;
        }
        inventory.add(book)?;
        added += 1;
    }
    info!(added, "sample catalog seeded");
    Ok(added)
}
