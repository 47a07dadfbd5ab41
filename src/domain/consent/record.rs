//! Consent acknowledgement and the record produced from it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{SessionId, Timestamp, ValidationError};

/// Which storage tier ended up holding a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMethod {
    /// Durable primary store.
    Primary,
    /// Local, never-transmitted fallback store.
    FallbackLocal,
    /// Every tier failed; the record lives only in the session.
    Failed,
}

impl SaveMethod {
    /// Returns true unless every tier failed.
    pub fn is_saved(&self) -> bool {
        !matches!(self, SaveMethod::Failed)
    }
}

impl fmt::Display for SaveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaveMethod::Primary => "primary",
            SaveMethod::FallbackLocal => "fallback_local",
            SaveMethod::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// The participant's answer to the consent form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentAck {
    pub given: bool,
    pub timestamp: Timestamp,
    /// Client user-agent string, if known.
    #[serde(default)]
    pub client_context: Option<String>,
}

impl ConsentAck {
    pub fn new(given: bool, timestamp: Timestamp) -> Self {
        Self {
            given,
            timestamp,
            client_context: None,
        }
    }

    pub fn with_client_context(mut self, context: impl Into<String>) -> Self {
        self.client_context = Some(context.into());
        self
    }

    /// Ensures consent was actually given.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` on `consent_given` when the box was not ticked
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.given {
            Ok(())
        } else {
            Err(ValidationError::invalid_format(
                "consent_given",
                "informed consent is required to participate",
            ))
        }
    }
}

/// Payload written to each consent storage tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentDraft {
    pub session_id: SessionId,
    pub consent_given: bool,
    pub consent_timestamp: Timestamp,
    pub client_context: String,
}

impl ConsentDraft {
    /// Starts a draft for a fresh session.
    pub fn for_new_session(ack: &ConsentAck) -> Self {
        Self {
            session_id: SessionId::new(),
            consent_given: ack.given,
            consent_timestamp: ack.timestamp,
            client_context: ack.client_context.clone().unwrap_or_default(),
        }
    }

    /// Key used for the local fallback copy.
    pub fn local_key(&self) -> String {
        format!("consent_{}", self.session_id)
    }
}

/// Persisted consent record; created once per session and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub session_id: SessionId,
    pub consent_given: bool,
    pub consent_timestamp: Timestamp,
    pub client_context: String,
    pub save_method: SaveMethod,
    pub storage_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_error: Option<String>,
}

impl ConsentRecord {
    /// Record stored by the primary tier.
    pub fn primary(draft: ConsentDraft, storage_id: impl Into<String>) -> Self {
        Self::from_draft(draft, SaveMethod::Primary, storage_id.into(), None, None)
    }

    /// Record that only reached the local fallback.
    pub fn fallback_local(draft: ConsentDraft, primary_error: impl Into<String>) -> Self {
        let storage_id = format!("local_{}", draft.session_id);
        Self::from_draft(
            draft,
            SaveMethod::FallbackLocal,
            storage_id,
            Some(primary_error.into()),
            None,
        )
    }

    /// Record that no tier accepted.
    pub fn failed(
        draft: ConsentDraft,
        primary_error: impl Into<String>,
        local_error: impl Into<String>,
    ) -> Self {
        let storage_id = format!("error_{}", draft.session_id);
        Self::from_draft(
            draft,
            SaveMethod::Failed,
            storage_id,
            Some(primary_error.into()),
            Some(local_error.into()),
        )
    }

    fn from_draft(
        draft: ConsentDraft,
        save_method: SaveMethod,
        storage_id: String,
        primary_error: Option<String>,
        local_error: Option<String>,
    ) -> Self {
        Self {
            session_id: draft.session_id,
            consent_given: draft.consent_given,
            consent_timestamp: draft.consent_timestamp,
            client_context: draft.client_context,
            save_method,
            storage_id,
            primary_error,
            local_error,
        }
    }

    /// Rebuilds the draft so the same consent can be saved again.
    pub fn to_draft(&self) -> ConsentDraft {
        ConsentDraft {
            session_id: self.session_id,
            consent_given: self.consent_given,
            consent_timestamp: self.consent_timestamp,
            client_context: self.client_context.clone(),
        }
    }

    /// True when the participant should be told their consent was only kept locally.
    pub fn needs_warning(&self) -> bool {
        self.save_method != SaveMethod::Primary
    }

    /// Developer-facing report, present only if some tier failed.
    pub fn error_report(&self) -> Option<ConsentErrorReport> {
        if self.primary_error.is_none() && self.local_error.is_none() {
            return None;
        }
        Some(ConsentErrorReport {
            session_id: self.session_id,
            save_method: self.save_method,
            storage_id: self.storage_id.clone(),
            primary_error: self.primary_error.clone(),
            local_error: self.local_error.clone(),
            consent_timestamp: self.consent_timestamp,
            client_context: self.client_context.clone(),
            generated_at: Timestamp::now(),
        })
    }
}

/// Copyable diagnostics for a consent save that degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentErrorReport {
    pub session_id: SessionId,
    pub save_method: SaveMethod,
    pub storage_id: String,
    pub primary_error: Option<String>,
    pub local_error: Option<String>,
    pub consent_timestamp: Timestamp,
    pub client_context: String,
    pub generated_at: Timestamp,
}

impl ConsentErrorReport {
    /// Pretty JSON suitable for pasting into a bug report.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
