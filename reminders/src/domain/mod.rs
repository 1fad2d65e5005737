//! Domain module
//!
//! Reminder, list and notification policy types plus the collection that
//! owns them.

pub mod collection;
pub mod models;

pub use collection::{Collection, ListRemoval};
pub use models::*;
