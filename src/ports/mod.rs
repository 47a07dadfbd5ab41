//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Content Ports
//!
//! - `BookletSource` - Loads booklet question sequences
//! - `BookletUsageCounter` - Best-effort per-booklet assignment counter
//!
//! ## Storage Ports
//!
//! - `ConsentStore` - Primary consent record store
//! - `ResponseStore` - Primary store for bundles and completion summaries
//! - `ResponseRowWriter` - Legacy per-question row sink
//! - `LocalRecordStore` - Last-resort local fallback records

mod booklet_source;
mod booklet_usage_counter;
mod consent_store;
mod local_record_store;
mod response_row_writer;
mod response_store;
mod storage_error;

pub use booklet_source::{BookletSource, BookletSourceError};
pub use booklet_usage_counter::BookletUsageCounter;
pub use consent_store::ConsentStore;
pub use local_record_store::LocalRecordStore;
pub use response_row_writer::{ResponseRow, ResponseRowWriter};
pub use response_store::ResponseStore;
pub use storage_error::StorageError;
