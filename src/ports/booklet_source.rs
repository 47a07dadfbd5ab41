//! Booklet content port.
//!
//! Booklets are static content owned outside the survey core. Sources
//! return a validated [`Booklet`] or say why they could not.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::booklet::{Booklet, BookletError};
use crate::domain::foundation::BookletId;

/// Why booklet content could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookletSourceError {
    #[error("Booklet {0} not found")]
    NotFound(BookletId),

    #[error("Failed to fetch booklet {booklet_id}: {message}")]
    Fetch { booklet_id: BookletId, message: String },

    #[error("Failed to parse booklet {booklet_id}: {message}")]
    Parse { booklet_id: BookletId, message: String },

    #[error(transparent)]
    Invalid(#[from] BookletError),
}

/// Loads the ordered question sequence for a booklet.
#[async_trait]
pub trait BookletSource: Send + Sync {
    /// Load booklet `id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no content exists for the id
    /// - `Fetch` / `Parse` when content exists but cannot be read
    /// - `Invalid` when the content breaks booklet invariants
    async fn load(&self, id: BookletId) -> Result<Booklet, BookletSourceError>;
}
