//! Schema types for Copilot chat-session files.
//!
//! The Copilot Chat extension writes one `.json` document per conversation
//! under `<workspaceStorage>/<hash>/chatSessions/`. The schema is internal
//! and has drifted across extension releases, so everything beyond the
//! session id is optional and the response field is resolved into an explicit
//! union before use instead of being probed ad hoc at each access site.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// A stored chat conversation: an ordered list of request/response pairs.
///
/// A document without a `sessionId` fails deserialization; the caller skips
/// that file and moves on.
#[derive(Debug, Deserialize)]
pub struct ChatSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "creationDate", default)]
    pub creation_date: Option<CreationDate>,
    #[serde(default)]
    pub requests: Vec<Request>,
}

/// One request/response exchange.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub message: Option<RequestMessage>,
    #[serde(default)]
    pub response: ResponseField,
}

/// The human side of an exchange.
#[derive(Debug, Deserialize)]
pub struct RequestMessage {
    #[serde(default)]
    pub text: Option<String>,
}

/// The assistant side of an exchange, as stored on disk.
///
/// Newer files carry an array of response parts, older ones a single string,
/// and aborted requests nothing at all. Any other shape (null, object) is
/// treated as absent rather than failing the file.
#[derive(Debug, Default)]
pub enum ResponseField {
    #[default]
    Absent,
    Text(String),
    Parts(Vec<ResponsePart>),
}

impl ResponseField {
    /// Concatenate the string-typed part values with single spaces.
    ///
    /// `None` when the response is not a part list or no part carries a
    /// non-empty string value. Single-string responses are deliberately not
    /// rendered here; only part lists hold exportable assistant text.
    pub fn joined_parts(&self) -> Option<String> {
        let ResponseField::Parts(parts) = self else {
            return None;
        };
        let values: Vec<&str> = parts
            .iter()
            .filter_map(|p| p.value.as_ref().and_then(serde_json::Value::as_str))
            .filter(|s| !s.is_empty())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(" "))
        }
    }
}

impl<'de> Deserialize<'de> for ResponseField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => Self::Parts(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::Object(mut map) => ResponsePart {
                            value: map.remove("value"),
                        },
                        _ => ResponsePart { value: None },
                    })
                    .collect(),
            ),
            _ => Self::Absent,
        })
    }
}

/// One element of a part-list response. Only string-typed `value`s
/// participate in concatenation; anything else is carried but ignored.
#[derive(Debug)]
pub struct ResponsePart {
    pub value: Option<serde_json::Value>,
}

/// Session creation timestamp: RFC3339 text or epoch milliseconds, depending
/// on the extension version that wrote the file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreationDate {
    Text(String),
    Millis(i64),
}

impl CreationDate {
    fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
        }
    }

    /// Locale-independent `M/D/YYYY` calendar date, or `"unknown date"` when
    /// the stored value cannot be interpreted.
    pub fn display_date(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
            None => "unknown date".to_string(),
        }
    }
}
