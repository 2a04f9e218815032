use std::io::Cursor;
use std::sync::Arc;

use bookstore_cli::Menu;
use bookstore_core::BookId;
use bookstore_inventory::{BookStore, InMemoryBookStore, Inventory, NewBook};

fn session(inventory: &mut Inventory<Arc<InMemoryBookStore>>, script: &str) -> String {
    let mut output = Vec::new();
    Menu::new(inventory, Cursor::new(script.as_bytes()), &mut output)
        .run()
        .unwrap();
    String::from_utf8(output).unwrap()
}

fn empty_inventory() -> Inventory<Arc<InMemoryBookStore>> {
    Inventory::open(InMemoryBookStore::arc()).unwrap()
}

#[test]
fn add_then_search_then_exit() {
    let mut inv = empty_inventory();
    let script = "1\n3\n1984\nGeorge Orwell\n12\n32.75\nDistopía\n5\norwell\n9\n";

    let out = session(&mut inv, script);

    assert!(out.contains("Book '1984' added"));
    assert!(out.contains("Found 1 results:"));
    assert!(out.contains("'1984' by George Orwell"));
    assert!(out.trim_end().ends_with("Goodbye!"));
    assert_eq!(inv.store().fetch_all().unwrap().len(), 1);
}

#[test]
fn blank_genre_falls_back_to_default() {
    let mut inv = empty_inventory();
    session(&mut inv, "1\n4\nEmma\nJane Austen\n3\n18.5\n\n9\n");

    assert_eq!(inv.get(BookId::new(4)).unwrap().genre(), "General");
}

#[test]
fn invalid_price_is_reported_and_nothing_is_added() {
    let mut inv = empty_inventory();
    let out = session(&mut inv, "1\n4\nEmma\nJane Austen\n3\n0\nRomance\n9\n");

    assert!(out.contains("Error: validation failed: price must be greater than 0"));
    assert!(inv.is_empty());
}

#[test]
fn duplicate_id_is_rejected() {
    let mut inv = empty_inventory();
    inv.add(NewBook::new(1, "1984", "George Orwell", 12, 32.75)).unwrap();

    let out = session(&mut inv, "1\n1\nAnimal Farm\nGeorge Orwell\n2\n9.99\n\n9\n");

    assert!(out.contains("Error: a book with id 1 already exists"));
    assert_eq!(inv.get(BookId::new(1)).unwrap().title(), "1984");
}

#[test]
fn remove_requires_confirmation() {
    let mut inv = empty_inventory();
    inv.add(NewBook::new(1, "1984", "George Orwell", 12, 32.75)).unwrap();

    let out = session(&mut inv, "2\n1\nn\n9\n");
    assert!(out.contains("Cancelled"));
    assert!(inv.contains(BookId::new(1)));

    let out = session(&mut inv, "2\n1\ny\n9\n");
    assert!(out.contains("Book '1984' removed"));
    assert!(inv.is_empty());
}

#[test]
fn price_and_quantity_updates_go_through_the_inventory() {
    let mut inv = empty_inventory();
    inv.add(NewBook::new(2, "Sapiens", "Yuval Noah Harari", 6, 52.0)).unwrap();

    let out = session(&mut inv, "4\n2\n60\n4\n2\n0\n3\n2\n-1\n3\n2\n9\n9\n");

    assert!(out.contains("Price updated to $60.00"));
    assert!(out.contains("Error: validation failed: price must be greater than 0"));
    assert!(out.contains("Error: validation failed: quantity cannot be negative"));
    assert!(out.contains("Quantity updated to 9"));

    let sapiens = inv.get(BookId::new(2)).unwrap();
    assert_eq!(sapiens.price(), 60.0);
    assert_eq!(sapiens.quantity(), 9);
}

#[test]
fn unknown_id_short_circuits_update() {
    let mut inv = empty_inventory();
    let out = session(&mut inv, "3\n99\n9\n");
    assert!(out.contains("No book with id 99"));
}

#[test]
fn invalid_menu_choice_reprompts() {
    let mut inv = empty_inventory();
    let out = session(&mut inv, "42\nabc\n8\n9\n");

    assert_eq!(out.matches("Please enter a number from 1 to 9").count(), 2);
    assert!(out.contains("No data to compute statistics"));
}

#[test]
fn end_of_input_exits_cleanly() {
    let mut inv = empty_inventory();
    let out = session(&mut inv, "6\n");

    assert!(out.contains("The inventory is empty"));
    assert!(out.trim_end().ends_with("Goodbye!"));
}

#[test]
fn statistics_report_top_genre() {
    let mut inv = empty_inventory();
    inv.add(NewBook::new(1, "1984", "George Orwell", 12, 32.75).with_genre("Distopía"))
        .unwrap();
    inv.add(NewBook::new(2, "Sapiens", "Yuval Noah Harari", 6, 52.0).with_genre("Historia"))
        .unwrap();
    inv.add(NewBook::new(3, "Homo Deus", "Yuval Noah Harari", 2, 40.0).with_genre("Historia"))
        .unwrap();

    let out = session(&mut inv, "8\n7\n9\n");

    assert!(out.contains("Genre with most titles: Historia"));
    assert!(out.contains("Most expensive: Sapiens ($52.00)"));
    assert!(out.contains("Cheapest: 1984 ($32.75)"));
    assert!(out.contains("HISTORIA (2 titles):"));
}
