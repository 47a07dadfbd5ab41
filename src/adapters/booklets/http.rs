//! Booklet content fetched from a static file server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::domain::booklet::Booklet;
use crate::domain::foundation::BookletId;
use crate::ports::{BookletSource, BookletSourceError};

use super::parse_booklet;

/// Fetches booklet `n` from `<base_url>/n.json`.
#[derive(Debug, Clone)]
pub struct HttpBookletSource {
    base_url: String,
    client: Client,
}

impl HttpBookletSource {
    /// Creates a source with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn booklet_url(&self, id: BookletId) -> String {
        format!("{}/{}.json", self.base_url, id)
    }
}

#[async_trait]
impl BookletSource for HttpBookletSource {
    async fn load(&self, id: BookletId) -> Result<Booklet, BookletSourceError> {
        let url = self.booklet_url(id);
        let fetch_error = |message: String| BookletSourceError::Fetch {
            booklet_id: id,
            message,
        };

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                fetch_error(format!("timed out fetching {}", url))
            } else {
                fetch_error(e.to_string())
            }
        })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(BookletSourceError::NotFound(id)),
            status => return Err(fetch_error(format!("{} returned {}", url, status))),
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        parse_booklet(id, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booklet_url_strips_trailing_slash() {
        let source =
            HttpBookletSource::new("https://cdn.example.com/booklets/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            source.booklet_url(BookletId::new(12, 19).unwrap()),
            "https://cdn.example.com/booklets/12.json"
        );
    }
}
