//! Result, error and response envelope types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every failure a caller can see is normalized into one of these variants.
/// The `Display` output is the human-readable message shown to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a response (DNS, refused connection, timeout)
    #[error("{0}")]
    Transport(String),

    /// The server answered with a status outside 200-299
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The envelope carried `success: false`
    #[error("{0}")]
    Api(String),

    /// Client-side validation failed before any request was sent
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Invalid response from server: {0}")]
    Decode(String),

    #[error("A request is already in progress")]
    Busy,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error with a single message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status code, if the server answered with one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

fn default_success() -> bool {
    true
}

/// Response envelope returned by every backend endpoint:
/// `{ "success": bool, "data": ..., "message": "..." }`
///
/// A missing `success` field is treated as success; only an explicit
/// `false` marks the call as failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// The server message, or `fallback` when it is missing or blank
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Take the payload, failing if the server sent none
    pub fn into_data(self) -> Result<T> {
        self.data
            .ok_or_else(|| Error::Decode("response carried no data".to_string()))
    }
}

impl<T: Default> Envelope<T> {
    /// Take the payload, treating a missing or null `data` as empty
    pub fn into_data_or_default(self) -> T {
        self.data.unwrap_or_default()
    }
}
