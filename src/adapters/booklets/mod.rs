//! Booklet content adapters.
//!
//! ## Available Adapters
//!
//! - `FileBookletSource` - Reads `<dir>/<id>.json` from disk
//! - `HttpBookletSource` - Fetches `<base_url>/<id>.json` over HTTP
//! - `InMemoryBookletSource` - Preloaded booklets (testing/offline)
//!
//! Content is a JSON array of question objects, or an object with a
//! `questions` array.

mod file;
mod http;
mod in_memory;

pub use file::FileBookletSource;
pub use self::http::HttpBookletSource;
pub use in_memory::InMemoryBookletSource;

use serde::Deserialize;

use crate::domain::booklet::{Booklet, Question};
use crate::domain::foundation::BookletId;
use crate::ports::BookletSourceError;

#[derive(Deserialize)]
#[serde(untagged)]
enum BookletDocument {
    Questions(Vec<Question>),
    Wrapped { questions: Vec<Question> },
}

/// Parses booklet JSON into a validated booklet.
pub(crate) fn parse_booklet(id: BookletId, bytes: &[u8]) -> Result<Booklet, BookletSourceError> {
    let document: BookletDocument =
        serde_json::from_slice(bytes).map_err(|e| BookletSourceError::Parse {
            booklet_id: id,
            message: e.to_string(),
        })?;

    let questions = match document {
        BookletDocument::Questions(questions) => questions,
        BookletDocument::Wrapped { questions } => questions,
    };

    Ok(Booklet::new(id, questions)?)
}
