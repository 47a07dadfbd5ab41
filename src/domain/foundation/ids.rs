//! Strongly-typed identifier value objects.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for one participant's survey session.
///
/// Generated once when consent is given and never changed afterwards. It is
/// the only join key shared by the consent, result, and fallback records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a SessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Participant identifier as sent by clients of the legacy response endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SessionId> for UserId {
    fn from(id: SessionId) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of a booklet within the configured pool `[0, pool_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookletId(u32);

impl BookletId {
    /// Creates a BookletId, returning error if it falls outside the pool.
    pub fn new(id: u32, pool_size: u32) -> Result<Self, ValidationError> {
        if id >= pool_size {
            return Err(ValidationError::out_of_range(
                "booklet_id",
                0,
                pool_size.saturating_sub(1) as i32,
                id as i32,
            ));
        }
        Ok(Self(id))
    }

    /// Returns the raw numeric id.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BookletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The configured booklet pool; ids are drawn from `[0, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookletPool(u32);

impl BookletPool {
    /// Creates a pool, returning error for an empty pool.
    pub fn new(size: u32) -> Result<Self, ValidationError> {
        if size == 0 {
            return Err(ValidationError::out_of_range("booklet_count", 1, i32::MAX, 0));
        }
        Ok(Self(size))
    }

    pub fn size(&self) -> u32 {
        self.0
    }

    /// Validates a raw id against this pool.
    pub fn booklet(&self, id: u32) -> Result<BookletId, ValidationError> {
        BookletId::new(id, self.0)
    }

    /// Draws a uniformly random id from the pool.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> BookletId {
        BookletId(rng.gen_range(0..self.0))
    }
}
