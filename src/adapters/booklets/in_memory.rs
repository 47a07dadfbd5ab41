//! Preloaded booklets for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::booklet::Booklet;
use crate::domain::foundation::BookletId;
use crate::ports::{BookletSource, BookletSourceError};

/// In-memory booklet source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookletSource {
    booklets: Arc<RwLock<HashMap<BookletId, Booklet>>>,
}

impl InMemoryBookletSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, booklet: Booklet) {
        self.booklets.write().await.insert(booklet.id(), booklet);
    }
}

#[async_trait]
impl BookletSource for InMemoryBookletSource {
    async fn load(&self, id: BookletId) -> Result<Booklet, BookletSourceError> {
        self.booklets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(BookletSourceError::NotFound(id))
    }
}
