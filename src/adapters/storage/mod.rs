//! Storage Adapters
//!
//! Implementations of the LocalRecordStore port, the last tier of every
//! fallback chain.
//!
//! ## Available Adapters
//!
//! - **FileLocalRecordStore** - Stores records as JSON files on disk
//! - **InMemoryLocalRecordStore** - Stores records in memory (testing/offline)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileLocalRecordStore, InMemoryLocalRecordStore};
//!
//! // Production: file-based storage
//! let store = FileLocalRecordStore::new("./data/fallback");
//!
//! // Testing: in-memory storage
//! let store = InMemoryLocalRecordStore::new();
//! ```

mod file_local_record_store;
mod in_memory_local_record_store;

pub use file_local_record_store::FileLocalRecordStore;
pub use in_memory_local_record_store::InMemoryLocalRecordStore;
