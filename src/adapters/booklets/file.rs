//! Booklet content read from a directory of JSON files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::booklet::Booklet;
use crate::domain::foundation::BookletId;
use crate::ports::{BookletSource, BookletSourceError};

use super::parse_booklet;

/// Reads booklet `n` from `<base_path>/n.json`.
#[derive(Debug, Clone)]
pub struct FileBookletSource {
    base_path: PathBuf,
}

impl FileBookletSource {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn booklet_path(&self, id: BookletId) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }
}

#[async_trait]
impl BookletSource for FileBookletSource {
    async fn load(&self, id: BookletId) -> Result<Booklet, BookletSourceError> {
        let path = self.booklet_path(id);
        if !path.exists() {
            return Err(BookletSourceError::NotFound(id));
        }

        let bytes = fs::read(&path).await.map_err(|e| BookletSourceError::Fetch {
            booklet_id: id,
            message: e.to_string(),
        })?;

        parse_booklet(id, &bytes)
    }
}
