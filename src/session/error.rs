//! Session-level errors

use super::SessionState;
use crate::llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A chat completion call failed; nothing but a pending user turn was recorded
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("session is over ({state}); reset it to start a new date")]
    Terminal { state: SessionState },

    #[error("session already has a greeting or turns; reset it first")]
    AlreadyStarted,

    #[error("message is empty")]
    EmptyMessage,

    #[error("another call is already in flight for this session")]
    Busy,

    #[error("session worker failed: {0}")]
    Worker(String),
}

impl SessionError {
    /// Whether resubmitting the same call might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.kind().is_retryable(),
            Self::Busy => true,
            Self::Terminal { .. } | Self::AlreadyStarted | Self::EmptyMessage | Self::Worker(_) => {
                false
            }
        }
    }
}
