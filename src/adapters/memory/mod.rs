//! In-memory storage adapters.
//!
//! Stand-ins for the Postgres adapters when no database is configured,
//! and the stores most tests run against. Each can be switched into a
//! failing mode to exercise the fallback chain.

mod consent_store;
mod response_row_writer;
mod response_store;

pub use consent_store::InMemoryConsentStore;
pub use response_row_writer::InMemoryResponseRowWriter;
pub use response_store::{InMemoryResponseStore, StoredResult};
