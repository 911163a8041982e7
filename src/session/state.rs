//! Session state and turn types

use crate::profile::ReferenceImage;
use serde::Serialize;
use std::fmt;

/// Lifecycle of one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Active,
    Succeeded,
    Failed,
}

impl SessionState {
    /// Terminal states are sticky; only `reset` leaves them
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who said a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Character,
}

/// One message in the conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    /// Only ever set on the opening greeting: the photo it reacted to
    pub image: Option<ReferenceImage>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            image: None,
        }
    }

    pub fn character(text: impl Into<String>) -> Self {
        Self {
            role: Role::Character,
            text: text.into(),
            image: None,
        }
    }
}

/// Result of one successful `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub reply: String,
    /// Evaluation for this turn before smoothing (5 when unparseable)
    pub raw_score: u8,
    /// Smoothed score after this turn
    pub score: u8,
    pub state: SessionState,
    /// The character asking the user out, present only on success
    pub closing: Option<String>,
}
