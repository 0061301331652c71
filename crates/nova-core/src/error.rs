//! Error types for Nova Core
//!
//! Provides error handling for:
//! - Id validation and item resolution
//! - Remote calls (classified by HTTP status)
//! - Edit locking and read-only artifacts
//! - Process model integrity
//!
//! [`NovaError`] is `Clone` because a single failure is observed by every
//! caller awaiting a shared load and by every subscriber of an artifact's
//! error stream.

use nova_artifact::{ItemTypePredefined, LockResultKind, ModelError};
use std::fmt;

/// HTTP status classification used for redirect decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpStatus {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ServerError,
    Other(u16),
}

impl HttpStatus {
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500 => Self::ServerError,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::ServerError => 500,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Main Nova error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum NovaError {
    /// Route id is not a finite integer
    #[error("invalid item id: {0:?}")]
    InvalidId(String),

    /// Remote call answered with a non-success status
    #[error("request failed with status {status}: {message}")]
    Api { status: HttpStatus, message: String },

    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// Process payload is structurally invalid
    #[error("invalid process model: {0}")]
    Model(#[from] ModelError),

    /// Requested version is past the last published one
    #[error("version {requested} not found (latest is {available})")]
    VersionNotFound { requested: i32, available: i32 },

    /// Item kind cannot be opened in the editor
    #[error("{0} cannot be opened")]
    NotAvailable(ItemTypePredefined),

    /// Historical, deleted or permission-restricted artifact
    #[error("artifact {0} is read-only")]
    ReadOnly(i32),

    /// Edit lock could not be acquired
    #[error("lock failed for artifact {id}: {reason:?}")]
    LockFailed { id: i32, reason: LockResultKind },

    /// Collection received two entries with one id
    #[error("duplicate id {0}")]
    DuplicateId(i32),

    /// Sub-artifact outlived its owning artifact
    #[error("owning artifact has been released")]
    Detached,

    /// Operation was cancelled by a newer one
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl NovaError {
    /// Build an API error from a status and message
    #[inline]
    pub fn api(status: HttpStatus, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status, for errors that came from the server
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<HttpStatus> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(HttpStatus::NotFound)
    }

    /// Errors after which the current view cannot continue
    #[inline]
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self.status(),
            Some(HttpStatus::Forbidden | HttpStatus::ServerError | HttpStatus::Unauthorized)
        )
    }
}

impl From<reqwest::Error> for NovaError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::api(HttpStatus::from_code(status.as_u16()), err.to_string()),
            None if err.is_decode() => Self::Decode(err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for NovaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
