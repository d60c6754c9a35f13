//! Normalised error for every backend call.
//!
//! The backend reports failures in several shapes: a bare string,
//! `{"ErrorMessage": "..."}`, `{"ErrorMessage": {"field": ["..."]}}`,
//! `{"Result": {"message": "..."}}`, and the framework's own
//! `{"detail": "..."}` / `{"field": ["..."]}`. They are collapsed here once;
//! nothing upstream looks at raw bodies.

use serde_json::Value;
use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "Operation failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// Blocked on the client before any request was made.
    Validation,
    /// The backend answered with a non-2xx status.
    Http(u16),
    /// No usable response (connection, TLS, ...).
    Network,
    /// A 2xx body that could not be decoded.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub kind: RequestErrorKind,
    pub message: String,
}

impl RequestError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::Decode, message)
    }

    /// Builds the error for a non-2xx response from its raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::new(RequestErrorKind::Http(status), extract_message(body))
    }

    fn new(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() { FALLBACK_MESSAGE.to_string() } else { message };
        Self { kind, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            RequestErrorKind::Http(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::decode(err.to_string())
        } else {
            RequestError::network(err.to_string())
        }
    }
}

/// Picks the first human-readable message out of an error body.
pub fn extract_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return FALLBACK_MESSAGE.to_string();
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => message_from_value(&value).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        // Non-JSON bodies (proxies, HTML error pages) are passed through as text.
        Err(_) => body.to_string(),
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Object(map) => {
            if let Some(inner) = map.get("ErrorMessage") {
                match inner {
                    Value::String(s) => {
                        if let Some(m) = non_blank(s) {
                            return Some(m);
                        }
                    }
                    Value::Object(fields) => {
                        if let Some(m) = fields.values().next().and_then(first_text) {
                            return Some(m);
                        }
                    }
                    _ => {}
                }
            }

            if let Some(m) = map
                .get("Result")
                .and_then(|r| r.get("message"))
                .and_then(Value::as_str)
                .and_then(non_blank)
            {
                return Some(m);
            }

            ["detail", "error", "message", "non_field_errors"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(first_text)
                .or_else(|| map.values().next().and_then(first_text))
        }
        Value::Array(items) => items.first().and_then(first_text),
        _ => None,
    }
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Array(items) => items.first().and_then(first_text),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
