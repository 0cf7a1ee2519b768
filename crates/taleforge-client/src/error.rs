//! Error types for the gateway layer.
//!
//! [`ApiError`] covers everything that can go wrong talking to the story
//! server. Recovery does not match on individual variants: it asks
//! [`ApiError::class`] and handles the four [`ErrorClass`]es, so the mapping
//! from HTTP outcome to user-visible behavior lives in one place.

use serde::Deserialize;
use thiserror::Error;

/// Fallback text when the server gives no usable message.
pub const GENERIC_FAILURE: &str = "An error occurred while processing your request";

/// Text shown when no response was received.
pub const NO_RESPONSE: &str = "No response from backend server. Please check your connection.";

/// Text shown when the story model behind the server is down.
pub const MODEL_UNAVAILABLE: &str = "LLM server is currently unavailable. Please try again later.";

/// Gateway failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server refused the request (4xx other than auth).
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided or fallback message.
        message: String,
    },

    /// Credentials missing, expired or insufficient (401/403).
    #[error("authentication required (HTTP {status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// The server failed (5xx).
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided or fallback message.
        message: String,
    },

    /// No response was received.
    #[error("{0}")]
    Network(String),

    /// A successful response had an unexpected body.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Recovery class for an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Shown inline next to the input; the submission is undone.
    Validation,
    /// The session view is abandoned for the login entry point.
    Auth,
    /// Shown as a blocking notice; the submission is undone.
    Server,
    /// Shown as a blocking notice; the submission is undone.
    Network,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-success HTTP response.
    ///
    /// `body` is the raw response text; a JSON object with an `error` (or
    /// `message`) string supplies the user-facing message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed.error.or(parsed.message).filter(|m| !m.trim().is_empty());

        match status {
            401 | 403 => Self::Unauthorized { status },
            503 => Self::Server { status, message: MODEL_UNAVAILABLE.to_owned() },
            500..=u16::MAX => Self::Server {
                status,
                message: message.unwrap_or_else(|| GENERIC_FAILURE.to_owned()),
            },
            _ => Self::Rejected {
                status,
                message: message.unwrap_or_else(|| GENERIC_FAILURE.to_owned()),
            },
        }
    }

    /// No response was received at all.
    pub fn no_response() -> Self {
        Self::Network(NO_RESPONSE.to_owned())
    }

    /// Recovery class.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Rejected { .. } => ErrorClass::Validation,
            Self::Unauthorized { .. } => ErrorClass::Auth,
            Self::Server { .. } | Self::Decode(_) => ErrorClass::Server,
            Self::Network(_) => ErrorClass::Network,
        }
    }

    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. }
            | Self::Unauthorized { status }
            | Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

/// Character sheet rejected before reaching the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CharacterError {
    /// Player name is empty after trimming.
    #[error("player name must not be empty")]
    EmptyName,

    /// An attribute is outside the allowed range.
    #[error("{attribute} must be between {min} and {max}, got {value}")]
    ScoreOutOfRange {
        /// Attribute name.
        attribute: &'static str,
        /// Offending score.
        value: u8,
        /// Lowest allowed score.
        min: u8,
        /// Highest allowed score.
        max: u8,
    },

    /// Scores do not add up to the point budget.
    #[error("attribute scores must total {expected}, got {actual}")]
    PointTotal {
        /// Required total.
        expected: u32,
        /// Actual total.
        actual: u32,
    },
}

/// Credential storage failure.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Reading or writing the backing file failed.
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
