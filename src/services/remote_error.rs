//! Remote call errors
//!
//! Parses wallet-service and merchant-backend error responses into one
//! structured type. The display form is the remote message itself so it
//! can be surfaced to users without re-wrapping.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Non-2xx HTTP response
    #[error("{message}")]
    Http { status: u16, message: String },
    /// 2xx response that reported failure in its body
    #[error("{0}")]
    Rejected(String),
    /// Network/connection error (timeout, DNS, etc.)
    #[error("{0}")]
    Network(String),
    /// Body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Longest plain-text body surfaced as an error message
pub const MAX_TEXT_MESSAGE: usize = 200;

/// Error body shapes used by both services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RemoteError {
    /// Build an error from a failed HTTP response.
    ///
    /// Prefers the JSON `error` field, then `message`, then a plain-text body
    /// (cut to `MAX_TEXT_MESSAGE` characters), then `fallback`.
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .filter(|m| !m.is_empty());

        let text = body.trim();
        let message = match parsed {
            Some(msg) => msg,
            // JSON without a message, or an HTML error page from a proxy
            None if text.is_empty() || text.starts_with('{') || text.starts_with('<') => {
                fallback.to_string()
            }
            None if text.chars().count() > MAX_TEXT_MESSAGE => {
                let head: String = text.chars().take(MAX_TEXT_MESSAGE).collect();
                format!("{}...", head.trim_end())
            }
            None => text.to_string(),
        };

        RemoteError::Http { status, message }
    }

    /// Parse a network/reqwest error
    pub fn from_network_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            RemoteError::Network("Connection failed".to_string())
        } else if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}
