//! Redis-backed booklet usage counter.
//!
//! All booklets share one hash; each field is a booklet id and each value
//! its assignment count, bumped with HINCRBY.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::BookletId;
use crate::ports::{BookletUsageCounter, StorageError};

/// Hash key holding every booklet's counter.
pub const DEFAULT_STATS_KEY: &str = "booklet_stats";

/// Redis-backed usage counter for multi-server deployments.
#[derive(Clone)]
pub struct RedisBookletCounter {
    conn: MultiplexedConnection,
    stats_key: String,
}

impl RedisBookletCounter {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            stats_key: DEFAULT_STATS_KEY.to_string(),
        }
    }

    /// Use a different hash key (for example a per-deployment prefix).
    pub fn with_stats_key(mut self, key: impl Into<String>) -> Self {
        self.stats_key = key.into();
        self
    }
}

#[async_trait]
impl BookletUsageCounter for RedisBookletCounter {
    async fn increment(&self, id: BookletId) -> Result<u64, StorageError> {
        let mut conn = self.conn.clone();

        let count: i64 = conn
            .hincr(&self.stats_key, id.value(), 1_i64)
            .await
            .map_err(|e: redis::RedisError| StorageError::Cache(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    async fn count(&self, id: BookletId) -> Result<u64, StorageError> {
        let mut conn = self.conn.clone();

        let count: Option<i64> = conn
            .hget(&self.stats_key, id.value())
            .await
            .map_err(|e: redis::RedisError| StorageError::Cache(e.to_string()))?;

        Ok(count.unwrap_or(0).max(0) as u64)
    }
}

impl std::fmt::Debug for RedisBookletCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBookletCounter")
            .field("stats_key", &self.stats_key)
            .finish_non_exhaustive()
    }
}
