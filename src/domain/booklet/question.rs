//! A single question as stored in booklet content.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::options::{parse_options, ParsedOptions, RawOptions};

/// Position of a question within its booklet.
///
/// Unique per booklet; defines both display order and the answer-key order.
pub type QuestionPosition = u32;

/// Question entity, read-only for the survey core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub position: QuestionPosition,

    #[serde(rename = "question", default)]
    pub prompt: String,

    /// Localized prompt, when the content has been translated.
    #[serde(rename = "question_zh", default, skip_serializing_if = "Option::is_none")]
    pub prompt_localized: Option<String>,

    #[serde(default)]
    pub category: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub difficulty: String,

    /// Image URL or data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RawOptions>,

    /// Correct label; used only for scoring at completion.
    #[serde(default, alias = "correct_answer", skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Overlap item shared with another booklet for linking.
    #[serde(default)]
    pub is_linking: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_booklet: Option<u32>,

    /// Booklet the content generator placed this question in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booklet_id: Option<u32>,
}

impl Question {
    /// Returns the selectable option labels.
    ///
    /// A malformed options encoding degrades to an empty set and is logged;
    /// it never fails the session.
    pub fn option_labels(&self) -> ParsedOptions {
        let Some(raw) = &self.options else {
            return ParsedOptions::empty();
        };
        match parse_options(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(position = self.position, error = %e, "Falling back to empty option set");
                ParsedOptions::empty()
            }
        }
    }

    /// Returns true if `label` matches the correct answer.
    pub fn is_correct(&self, label: &str) -> bool {
        self.answer.as_deref().map(str::trim) == Some(label.trim())
    }

    /// Prompt in the preferred language, falling back to the original.
    pub fn prompt_for(&self, prefer_localized: bool) -> &str {
        match (&self.prompt_localized, prefer_localized) {
            (Some(localized), true) if !localized.trim().is_empty() => localized,
            _ => &self.prompt,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
