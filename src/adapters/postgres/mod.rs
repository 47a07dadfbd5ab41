//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! This module provides the primary storage tier:
//! - `PostgresConsentStore` - Consent records, one per session
//! - `PostgresResponseStore` - Completed bundles and summaries as JSONB
//! - `PostgresResponseRowWriter` - Legacy per-question rows

mod consent_store;
mod response_row_writer;
mod response_store;

pub use consent_store::PostgresConsentStore;
pub use response_row_writer::PostgresResponseRowWriter;
pub use response_store::PostgresResponseStore;
