//! Storage module
//!
//! Key-value persistence shared between the application and the widget.

pub mod file_store;
pub mod memory_store;
pub mod store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use store::{read_json, write_json, Store};
