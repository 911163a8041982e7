//! Chat completion error types

use thiserror::Error;

/// Failure of a single chat completion call
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection failure, timeout, or the body could not be read
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("remote service returned HTTP {status}: {body}")]
    RemoteService { status: u16, body: String },

    /// The body did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Rejected locally before any network call
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteService {
            status,
            body: body.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Classify the error for diagnostics
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            Self::Transport(_) => LlmErrorKind::Network,
            Self::RemoteService { status, .. } => match status {
                401 | 403 => LlmErrorKind::Auth,
                429 => LlmErrorKind::RateLimit,
                400..=499 => LlmErrorKind::InvalidRequest,
                500..=599 => LlmErrorKind::ServerError,
                _ => LlmErrorKind::Unknown,
            },
            Self::MalformedResponse(_) => LlmErrorKind::Malformed,
            Self::InvalidRequest(_) => LlmErrorKind::InvalidRequest,
        }
    }
}

/// Error classification
///
/// Nothing in this crate retries; `is_retryable` tells a caller whether
/// resubmitting the same turn has a chance of succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Network issues, timeouts
    Network,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request, either from the service (4xx) or caught locally
    InvalidRequest,
    /// Response body could not be understood
    Malformed,
    /// Anything else
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
