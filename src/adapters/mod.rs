//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `booklets` - Booklet content (filesystem, HTTP, in-memory)
//! - `http` - axum REST surface
//! - `memory` - In-memory primary stores for tests and offline mode
//! - `postgres` - Primary consent/result stores and legacy rows (sqlx)
//! - `storage` - Local fallback record stores (filesystem, in-memory)
//! - `usage_counter` - Booklet usage counter (Redis, in-memory)

pub mod booklets;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod storage;
pub mod usage_counter;

pub use booklets::{FileBookletSource, HttpBookletSource, InMemoryBookletSource};
pub use memory::{InMemoryConsentStore, InMemoryResponseRowWriter, InMemoryResponseStore};
pub use postgres::{PostgresConsentStore, PostgresResponseRowWriter, PostgresResponseStore};
pub use storage::{FileLocalRecordStore, InMemoryLocalRecordStore};
pub use usage_counter::{InMemoryBookletCounter, RedisBookletCounter};
