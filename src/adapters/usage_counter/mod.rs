//! Booklet usage counter adapters.
//!
//! ## Available Adapters
//!
//! - `InMemoryBookletCounter` - In-memory for testing and single-server
//! - `RedisBookletCounter` - Redis hash shared by every server
//!
//! ## Usage
//!
//! ```ignore
//! use spatial_survey::adapters::usage_counter::RedisBookletCounter;
//!
//! let conn = client.get_multiplexed_tokio_connection().await?;
//! let counter = RedisBookletCounter::new(conn);
//! ```

mod in_memory;
mod redis;

pub use in_memory::InMemoryBookletCounter;
pub use self::redis::{RedisBookletCounter, DEFAULT_STATS_KEY};
