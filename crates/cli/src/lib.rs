//! Console front end for the bookstore inventory.

pub mod menu;
pub mod render;

pub use menu::{Command, Menu};
