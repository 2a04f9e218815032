//! Numbered console menu over an [`Inventory`].

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use bookstore_core::{BookId, DomainError};
use bookstore_inventory::{BookStore, DEFAULT_GENRE, Inventory, NewBook};

use crate::render;

const RULE: &str = "==================================================";

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Remove,
    SetQuantity,
    SetPrice,
    Search,
    ListAll,
    ListByGenre,
    Statistics,
    Exit,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::Add,
        Command::Remove,
        Command::SetQuantity,
        Command::SetPrice,
        Command::Search,
        Command::ListAll,
        Command::ListByGenre,
        Command::Statistics,
        Command::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Command::Add => "Add a new book",
            Command::Remove => "Remove a book",
            Command::SetQuantity => "Update quantity",
            Command::SetPrice => "Update price",
            Command::Search => "Search books",
            Command::ListAll => "Show full inventory",
            Command::ListByGenre => "Show by genre",
            Command::Statistics => "Show statistics",
            Command::Exit => "Exit",
        }
    }
}

impl FromStr for Command {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::validation(format!("no menu option {:?}", s.trim()));
        let n: usize = s.trim().parse().map_err(|_| invalid())?;
        n.checked_sub(1)
            .and_then(|i| Command::ALL.get(i).copied())
            .ok_or_else(invalid)
    }
}

/// Outcome of reading one answer from the operator.
enum Answer<T> {
    Value(T),
    Invalid,
    Eof,
}

pub struct Menu<'a, S, R, W> {
    inventory: &'a mut Inventory<S>,
    input: R,
    output: W,
}

impl<'a, S, R, W> Menu<'a, S, R, W>
where
    S: BookStore,
    R: BufRead,
    W: Write,
{
    pub fn new(inventory: &'a mut Inventory<S>, input: R, output: W) -> Self {
        Self {
            inventory,
            input,
            output,
        }
    }

    /// Run until the operator picks Exit or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Welcome to the bookstore inventory!")?;
        loop {
            self.print_menu()?;
            let Some(command) = self.read_command()? else {
                break;
            };
            tracing::debug!(?command, "menu command");
            let keep_going = match command {
                Command::Add => self.add()?,
                Command::Remove => self.remove()?,
                Command::SetQuantity => self.set_quantity()?,
                Command::SetPrice => self.set_price()?,
                Command::Search => self.search()?,
                Command::ListAll => {
                    render::catalog(&mut self.output, self.inventory)?;
                    true
                }
                Command::ListByGenre => {
                    render::by_genre(&mut self.output, self.inventory)?;
                    true
                }
                Command::Statistics => {
                    render::statistics(&mut self.output, self.inventory.statistics().as_ref())?;
                    true
                }
                Command::Exit => false,
            };
            if !keep_going {
                break;
            }
        }
        writeln!(self.output, "Goodbye!")?;
        self.output.flush()
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{RULE}")?;
        writeln!(self.output, "BOOKSTORE INVENTORY")?;
        writeln!(self.output, "{RULE}")?;
        for (i, command) in Command::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, command.label())?;
        }
        Ok(())
    }

    fn read_command(&mut self) -> io::Result<Option<Command>> {
        loop {
            let Some(line) = self.prompt("Choose an option (1-9): ")? else {
                return Ok(None);
            };
            match line.parse::<Command>() {
                Ok(command) => return Ok(Some(command)),
                Err(err) => {
                    tracing::debug!(error = %err, "rejected menu choice");
                    writeln!(self.output, "Please enter a number from 1 to 9")?
                }
            }
        }
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_parsed<T: FromStr>(&mut self, label: &str) -> io::Result<Answer<T>> {
        Ok(match self.prompt(label)? {
            None => Answer::Eof,
            Some(line) => match line.parse() {
                Ok(value) => Answer::Value(value),
                Err(_) => Answer::Invalid,
            },
        })
    }

    /// Ask for an id of a catalogued book. `Ok(None)` means the action is over.
    fn prompt_known_id(&mut self, label: &str) -> io::Result<Option<BookId>> {
        match self.prompt_parsed::<BookId>(label)? {
            Answer::Value(id) if self.inventory.contains(id) => Ok(Some(id)),
            Answer::Value(id) => {
                writeln!(self.output, "No book with id {id}")?;
                Ok(None)
            }
            Answer::Invalid => {
                writeln!(self.output, "Error: please enter a valid id")?;
                Ok(None)
            }
            Answer::Eof => Ok(None),
        }
    }

    fn add(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\nADD A NEW BOOK")?;

        let Answer::Value(id) = self.prompt_parsed::<BookId>("Book id: ")? else {
            writeln!(self.output, "Error: please enter valid values")?;
            return Ok(true);
        };
        let Some(title) = self.prompt("Title: ")? else {
            return Ok(false);
        };
        let Some(author) = self.prompt("Author: ")? else {
            return Ok(false);
        };
        let Answer::Value(quantity) = self.prompt_parsed::<i64>("Quantity in stock: ")? else {
            writeln!(self.output, "Error: please enter valid values")?;
            return Ok(true);
        };
        let Answer::Value(price) = self.prompt_parsed::<f64>("Price: $")? else {
            writeln!(self.output, "Error: please enter valid values")?;
            return Ok(true);
        };
        let Some(genre) = self.prompt("Genre (optional): ")? else {
            return Ok(false);
        };
        let genre = if genre.is_empty() {
            DEFAULT_GENRE.to_string()
        } else {
            genre
        };

        let input = NewBook::new(id.get(), title, author, quantity, price).with_genre(genre);
        match self.inventory.add(input) {
            Ok(book) => writeln!(self.output, "Book '{}' added", book.title())?,
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(true)
    }

    fn remove(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\nREMOVE A BOOK")?;

        let Some(id) = self.prompt_known_id("Id of the book to remove: ")? else {
            return Ok(true);
        };
        if let Some(book) = self.inventory.get(id) {
            writeln!(self.output, "Book to remove: {book}")?;
        }
        let Some(confirm) = self.prompt("Are you sure? (y/N): ")? else {
            return Ok(false);
        };
        if !confirm.eq_ignore_ascii_case("y") {
            writeln!(self.output, "Cancelled")?;
            return Ok(true);
        }

        match self.inventory.remove(id) {
            Ok(book) => writeln!(self.output, "Book '{}' removed", book.title())?,
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(true)
    }

    fn set_quantity(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\nUPDATE QUANTITY")?;

        let Some(id) = self.prompt_known_id("Book id: ")? else {
            return Ok(true);
        };
        if let Some(book) = self.inventory.get(id) {
            writeln!(self.output, "Book: {} (current stock: {})", book.title(), book.quantity())?;
        }
        let quantity = match self.prompt_parsed::<i64>("New quantity: ")? {
            Answer::Value(quantity) => quantity,
            Answer::Invalid => {
                writeln!(self.output, "Error: please enter a valid number")?;
                return Ok(true);
            }
            Answer::Eof => return Ok(false),
        };

        match self.inventory.set_quantity(id, quantity) {
            Ok(()) => writeln!(self.output, "Quantity updated to {quantity}")?,
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(true)
    }

    fn set_price(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\nUPDATE PRICE")?;

        let Some(id) = self.prompt_known_id("Book id: ")? else {
            return Ok(true);
        };
        if let Some(book) = self.inventory.get(id) {
            writeln!(self.output, "Book: {} (current price: ${:.2})", book.title(), book.price())?;
        }
        let price = match self.prompt_parsed::<f64>("New price: $")? {
            Answer::Value(price) => price,
            Answer::Invalid => {
                writeln!(self.output, "Error: please enter a valid price")?;
                return Ok(true);
            }
            Answer::Eof => return Ok(false),
        };

        match self.inventory.set_price(id, price) {
            Ok(()) => writeln!(self.output, "Price updated to ${price:.2}")?,
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(true)
    }

    fn search(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\nSEARCH BOOKS")?;

        let Some(term) = self.prompt("Title or author to search for: ")? else {
            return Ok(false);
        };
        if term.is_empty() {
            writeln!(self.output, "Please enter a search term")?;
            return Ok(true);
        }

        match self.inventory.find_by_text(&term) {
            Ok(hits) if hits.is_empty() => {
                writeln!(self.output, "No books found matching '{term}'")?
            }
            Ok(hits) => {
                writeln!(self.output, "\nFound {} results:", hits.len())?;
                for book in hits {
                    writeln!(self.output, "  {book}")?;
                }
            }
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_menu_numbers() {
        assert_eq!("1".parse::<Command>(), Ok(Command::Add));
        assert_eq!(" 9 ".parse::<Command>(), Ok(Command::Exit));
        for bad in ["0", "10", "add", ""] {
            let err = bad.parse::<Command>().unwrap_err();
            assert!(err.is_validation(), "{bad:?} should be rejected, got {err:?}");
        }
    }
}
