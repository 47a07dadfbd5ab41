//! Option label extraction for question content.
//!
//! Booklet files carry a question's options in more than one shape:
//! a delimited string (`"A, B, C, D"`), a string holding a label→text
//! mapping in strict JSON or single-quoted dictionary syntax, or an
//! already-structured mapping or list. Only the label set matters for
//! answering, so every shape reduces to an ordered list of labels.
//!
//! Text is tried in a fixed order:
//!
//! 1. strict structured parse
//! 2. structured parse after normalizing single quotes
//! 3. comma split (only for text that does not open a mapping)
//! 4. empty

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Options field as it appears in booklet content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOptions {
    Text(String),
    Mapping(Map<String, Value>),
    List(Vec<String>),
}

/// Which decoding path produced the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionEncoding {
    /// Strict JSON mapping inside a string.
    StrictMapping,
    /// Mapping that only parsed after quote normalization.
    NormalizedMapping,
    /// Comma-delimited label list.
    Delimited,
    /// Structured mapping or list in the content itself.
    Structured,
    /// Nothing usable.
    Empty,
}

/// Labels recovered from an options field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOptions {
    pub labels: Vec<String>,
    pub encoding: OptionEncoding,
}

impl ParsedOptions {
    fn new(labels: Vec<String>, encoding: OptionEncoding) -> Self {
        Self { labels, encoding }
    }

    /// No labels.
    pub fn empty() -> Self {
        Self::new(Vec::new(), OptionEncoding::Empty)
    }

    /// Returns true if `label` is one of the options.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A mapping-looking options string that no structured parse accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed options mapping {raw:?}: {reason}")]
pub struct OptionParseError {
    pub raw: String,
    pub reason: String,
}

/// Extracts option labels from text.
///
/// # Errors
///
/// Returns `OptionParseError` when the text opens a mapping (`{`) but
/// neither the strict nor the quote-normalized parse accepts it.
pub fn parse_option_text(raw: &str) -> Result<ParsedOptions, OptionParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(ParsedOptions::empty());
    }

    if trimmed.starts_with('{') {
        let strict_err = match serde_json::from_str::<Map<String, Value>>(trimmed) {
            Ok(map) => return Ok(ParsedOptions::new(keys(map), OptionEncoding::StrictMapping)),
            Err(e) => e,
        };

        let normalized = trimmed.replace('\'', "\"");
        return match serde_json::from_str::<Map<String, Value>>(&normalized) {
            Ok(map) => Ok(ParsedOptions::new(keys(map), OptionEncoding::NormalizedMapping)),
            Err(e) => Err(OptionParseError {
                raw: raw.to_string(),
                reason: format!("strict: {}; normalized: {}", strict_err, e),
            }),
        };
    }

    let labels: Vec<String> = trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if labels.is_empty() {
        Ok(ParsedOptions::empty())
    } else {
        Ok(ParsedOptions::new(labels, OptionEncoding::Delimited))
    }
}

/// Extracts option labels from any options shape.
///
/// # Errors
///
/// See [`parse_option_text`]; structured shapes never fail.
pub fn parse_options(raw: &RawOptions) -> Result<ParsedOptions, OptionParseError> {
    match raw {
        RawOptions::Text(text) => parse_option_text(text),
        RawOptions::Mapping(map) => Ok(ParsedOptions::new(
            keys(map.clone()),
            OptionEncoding::Structured,
        )),
        RawOptions::List(items) => {
            let labels: Vec<String> = items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if labels.is_empty() {
                Ok(ParsedOptions::empty())
            } else {
                Ok(ParsedOptions::new(labels, OptionEncoding::Structured))
            }
        }
    }
}

fn keys(map: Map<String, Value>) -> Vec<String> {
    map.into_iter().map(|(k, _)| k).collect()
}
