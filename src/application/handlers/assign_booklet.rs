//! BookletAssigner - picks a booklet for a new participant.

use std::sync::Arc;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::domain::foundation::{BookletId, BookletPool};
use crate::ports::BookletUsageCounter;

/// Result of an assignment.
#[derive(Debug)]
pub struct AssignBookletResult {
    pub booklet_id: BookletId,
    /// Detached counter update; `None` when no counter is configured.
    pub counter_task: Option<JoinHandle<()>>,
}

/// Uniform random booklet draw with a best-effort usage counter.
///
/// Without a counter (offline mode) only the local draw happens.
pub struct BookletAssigner {
    pool: BookletPool,
    counter: Option<Arc<dyn BookletUsageCounter>>,
}

impl BookletAssigner {
    pub fn new(pool: BookletPool) -> Self {
        Self { pool, counter: None }
    }

    pub fn with_counter(mut self, counter: Arc<dyn BookletUsageCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn pool(&self) -> BookletPool {
        self.pool
    }

    /// Draws a booklet id and fires off the counter increment.
    ///
    /// The increment runs detached; its failure is logged and never changes
    /// the returned id. Must be called inside a tokio runtime.
    pub fn handle(&self) -> AssignBookletResult {
        self.handle_with_rng(&mut rand::thread_rng())
    }

    pub fn handle_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> AssignBookletResult {
        let booklet_id = self.pool.draw(rng);
        tracing::info!(booklet_id = %booklet_id, "Assigned booklet");

        let counter_task = self.counter.clone().map(|counter| {
            tokio::spawn(async move {
                match counter.increment(booklet_id).await {
                    Ok(count) => {
                        tracing::debug!(booklet_id = %booklet_id, count, "Booklet usage counted")
                    }
                    Err(e) => {
                        tracing::warn!(booklet_id = %booklet_id, error = %e, "Booklet usage count failed")
                    }
                }
            })
        });

        AssignBookletResult {
            booklet_id,
            counter_task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::usage_counter::InMemoryBookletCounter;
    use crate::ports::StorageError;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FailingCounter;

    #[async_trait]
    impl BookletUsageCounter for FailingCounter {
        async fn increment(&self, _: BookletId) -> Result<u64, StorageError> {
            Err(StorageError::Cache("connection reset".to_string()))
        }

        async fn count(&self, _: BookletId) -> Result<u64, StorageError> {
            Err(StorageError::Cache("connection reset".to_string()))
        }
    }

    fn pool(size: u32) -> BookletPool {
        BookletPool::new(size).unwrap()
    }

    #[tokio::test]
    async fn offline_assignment_spawns_nothing() {
        let result = BookletAssigner::new(pool(19)).handle();
        assert!(result.booklet_id.value() < 19);
        assert!(result.counter_task.is_none());
    }

    #[tokio::test]
    async fn counter_is_incremented_for_assigned_booklet() {
        let counter = Arc::new(InMemoryBookletCounter::new());
        let assigner = BookletAssigner::new(pool(19)).with_counter(counter.clone());

        let result = assigner.handle();
        result.counter_task.unwrap().await.unwrap();

        assert_eq!(counter.count(result.booklet_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn counter_failure_does_not_change_the_id() {
        let with_failing = BookletAssigner::new(pool(19)).with_counter(Arc::new(FailingCounter));
        let offline = BookletAssigner::new(pool(19));

        let a = with_failing.handle_with_rng(&mut StdRng::seed_from_u64(7));
        let b = offline.handle_with_rng(&mut StdRng::seed_from_u64(7));

        assert_eq!(a.booklet_id, b.booklet_id);
        a.counter_task.unwrap().await.unwrap();
    }

    #[test]
    fn draws_cover_the_whole_pool() {
        let assigner = BookletAssigner::new(pool(19));
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [0u32; 19];
        for _ in 0..19_000 {
            seen[assigner.pool().draw(&mut rng).value() as usize] += 1;
        }
        // Uniform draw: each bucket expects 1000.
        for count in seen {
            assert!((800..1200).contains(&count), "bucket count {}", count);
        }
    }

    proptest! {
        #[test]
        fn assigned_id_is_always_inside_pool(size in 1u32..200, seed in any::<u64>()) {
            let result = BookletAssigner::new(pool(size))
                .handle_with_rng(&mut StdRng::seed_from_u64(seed));
            prop_assert!(result.booklet_id.value() < size);
        }
    }
}
