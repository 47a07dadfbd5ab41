//! Server-held survey sessions.
//!
//! Entries are dropped after a period without requests. A session evicted
//! while its results are still being saved keeps saving; only the handle
//! to the outcome goes away.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::handlers::SurveyFlow;
use crate::domain::foundation::SessionId;

/// Shared handle to one participant's flow.
pub type SharedFlow = Arc<Mutex<SurveyFlow>>;

struct Entry {
    flow: SharedFlow,
    last_seen: Instant,
}

/// In-memory map of live sessions keyed by the id assigned at consent.
///
/// Each flow sits behind its own mutex so requests for different sessions
/// never contend.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    entries: Arc<RwLock<HashMap<SessionId, Entry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: SessionId, flow: SurveyFlow) -> SharedFlow {
        let shared = Arc::new(Mutex::new(flow));
        self.entries.write().await.insert(
            id,
            Entry {
                flow: shared.clone(),
                last_seen: Instant::now(),
            },
        );
        shared
    }

    /// Looks up a session and marks it active.
    pub async fn get(&self, id: &SessionId) -> Option<SharedFlow> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.flow.clone())
    }

    pub async fn remove(&self, id: &SessionId) -> Option<SharedFlow> {
        self.entries.write().await.remove(id).map(|entry| entry.flow)
    }

    /// Drops sessions with no request for longer than `max_idle` and
    /// returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        before - entries.len()
    }

    /// Runs [`Self::evict_idle`] every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(max_idle).await;
                if evicted > 0 {
                    tracing::info!(evicted, "Evicted idle survey sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
