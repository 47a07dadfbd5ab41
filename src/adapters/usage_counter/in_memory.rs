//! In-memory booklet usage counter for testing and single-server runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::BookletId;
use crate::ports::{BookletUsageCounter, StorageError};

/// In-memory usage counter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookletCounter {
    counts: Arc<RwLock<HashMap<BookletId, u64>>>,
}

impl InMemoryBookletCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all counters.
    pub async fn total(&self) -> u64 {
        self.counts.read().await.values().sum()
    }
}

#[async_trait]
impl BookletUsageCounter for InMemoryBookletCounter {
    async fn increment(&self, id: BookletId) -> Result<u64, StorageError> {
        let mut counts = self.counts.write().await;
        let count = counts.entry(id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn count(&self, id: BookletId) -> Result<u64, StorageError> {
        Ok(self.counts.read().await.get(&id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn increments_per_booklet() {
        let counter = InMemoryBookletCounter::new();
        let a = BookletId::new(1, 19).unwrap();
        let b = BookletId::new(2, 19).unwrap();

        assert_eq!(counter.increment(a).await.unwrap(), 1);
        assert_eq!(counter.increment(a).await.unwrap(), 2);
        assert_eq!(counter.increment(b).await.unwrap(), 1);

        assert_eq!(counter.count(a).await.unwrap(), 2);
        assert_eq!(counter.total().await, 3);
    }

    #[tokio::test]
    async fn unknown_booklet_counts_zero() {
        let counter = InMemoryBookletCounter::new();
        assert_eq!(counter.count(BookletId::new(7, 19).unwrap()).await.unwrap(), 0);
    }
}
