//! Arena Date - conversation and scoring core for a Clash Royale dating sim
//!
//! A player chats with a card character. Each player turn gets an
//! in-character reply and a separate 0-10 evaluation; the smoothed score
//! decides whether the date fails or ends with the character asking the
//! player out.

pub mod catalog;
pub mod config;
pub mod llm;
pub mod profile;
pub mod session;

#[cfg(test)]
mod testing;

pub use catalog::{Card, Catalog, CatalogError};
pub use config::{ConfigError, LlmConfig, SessionConfig};
pub use llm::{AnthropicService, ChatCompletionClient, LlmError, LoggingClient};
pub use profile::{CharacterProfile, ReferenceImage, UserProfile};
pub use session::{
    AdvanceOutcome, ConversationSession, ConversationTurn, SessionError, SessionHandle,
    SessionState,
};
