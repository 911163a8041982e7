//! Conversation & scoring session
//!
//! Drives one date: an opening greeting, then user turns each answered by
//! an in-character reply and scored by a separate evaluation call. The
//! score decides whether the date fails, continues, or ends with the
//! character asking the user out.
//!
//! Every network call of a turn completes before anything is committed, so
//! a failed call leaves score, state and character turns untouched. The
//! user's text stays recorded as a pending turn; the next `advance`
//! replaces it instead of stacking a second user turn.

mod error;
mod handle;
pub mod prompts;
mod score;
mod state;

#[cfg(test)]
mod proptests;

pub use error::SessionError;
pub use handle::{join_task, SessionHandle, SessionSnapshot};
pub use score::{parse_raw_score, ScoreRules, ScoreTracker, MAX_SCORE, NEUTRAL_SCORE};
pub use state::{AdvanceOutcome, ConversationTurn, Role, SessionState};

use crate::config::SessionConfig;
use crate::llm::{ChatCompletionClient, LlmMessage};
use crate::profile::{CharacterProfile, UserProfile};
use std::sync::Arc;

pub struct ConversationSession {
    client: Arc<dyn ChatCompletionClient>,
    character: Arc<CharacterProfile>,
    user: Arc<UserProfile>,
    config: SessionConfig,
    turns: Vec<ConversationTurn>,
    tracker: ScoreTracker,
    state: SessionState,
    /// Character replies produced by `advance` (the greeting is not counted)
    exchanges: u32,
    closing: Option<String>,
}

impl ConversationSession {
    pub fn new(
        client: Arc<dyn ChatCompletionClient>,
        character: Arc<CharacterProfile>,
        user: Arc<UserProfile>,
        config: SessionConfig,
    ) -> Self {
        let tracker = ScoreTracker::new(ScoreRules::from(&config));
        Self {
            client,
            character,
            user,
            config,
            turns: Vec::new(),
            tracker,
            state: SessionState::Active,
            exchanges: 0,
            closing: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u8 {
        self.tracker.current()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    pub fn character(&self) -> &CharacterProfile {
        &self.character
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// The ask-out message, once the date has been won
    pub fn closing_message(&self) -> Option<&str> {
        self.closing.as_deref()
    }

    /// User text left behind by a failed `advance`
    pub fn pending_user_text(&self) -> Option<&str> {
        self.turns
            .last()
            .filter(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
    }

    /// Request the character's opening message
    ///
    /// With a user photo the character reacts to it; otherwise it sends a
    /// plain greeting. The greeting becomes the first turn and does not
    /// touch the score.
    pub async fn start(&mut self) -> Result<ConversationTurn, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::Terminal { state: self.state });
        }
        if !self.turns.is_empty() {
            return Err(SessionError::AlreadyStarted);
        }

        let max_tokens = self.config.greeting_max_tokens;
        let turn = if let Some(photo) = &self.user.photo {
            let system = prompts::photo_greeting_system(&self.character, &self.user);
            let text = self
                .client
                .complete_with_image(&system, photo.to_image_source(), prompts::PHOTO_OPENER, max_tokens)
                .await?;
            ConversationTurn {
                image: Some(photo.clone()),
                ..ConversationTurn::character(text)
            }
        } else {
            let system = prompts::greeting_system(&self.character, &self.user);
            let opener = [LlmMessage::user(prompts::GREETING_OPENER)];
            let text = self.client.complete(&system, &opener, max_tokens).await?;
            ConversationTurn::character(text)
        };

        tracing::info!(
            character = %self.character.name,
            with_photo = turn.image.is_some(),
            "Greeting received"
        );
        self.turns.push(turn.clone());
        Ok(turn)
    }

    /// Play one user turn
    pub async fn advance(&mut self, user_text: &str) -> Result<AdvanceOutcome, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::Terminal { state: self.state });
        }
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        if self.pending_user_text().is_some() {
            tracing::debug!(character = %self.character.name, "Replacing pending user turn");
            self.turns.pop();
        }
        self.turns.push(ConversationTurn::user(user_text));

        let mut history = self.wire_history();
        let reply = self
            .client
            .complete(
                &prompts::roleplay_system(&self.character, &self.user),
                &history,
                self.config.reply_max_tokens,
            )
            .await?;

        let raw_score = self.evaluate(user_text, &reply).await?;

        let mut tracker = self.tracker.clone();
        let score = tracker.update(raw_score);
        let exchanges = self.exchanges + 1;
        let state = if tracker.is_failure() {
            SessionState::Failed
        } else if tracker.is_success(exchanges) {
            SessionState::Succeeded
        } else {
            SessionState::Active
        };

        let closing = if state == SessionState::Succeeded {
            history.push(LlmMessage::assistant(reply.clone()));
            history.push(LlmMessage::user(prompts::CLOSING_CUE));
            let text = self
                .client
                .complete(
                    &prompts::closing_system(&self.character, &self.user),
                    &history,
                    self.config.closing_max_tokens,
                )
                .await?;
            Some(text)
        } else {
            None
        };

        self.turns.push(ConversationTurn::character(reply.clone()));
        self.tracker = tracker;
        self.exchanges = exchanges;
        self.state = state;
        self.closing.clone_from(&closing);

        tracing::info!(
            character = %self.character.name,
            exchange = exchanges,
            raw_score,
            score,
            state = %state,
            "Turn complete"
        );

        Ok(AdvanceOutcome {
            reply,
            raw_score,
            score,
            state,
            closing,
        })
    }

    /// Forget the conversation but keep both profiles
    pub fn reset(&mut self) {
        self.turns.clear();
        self.tracker.reset();
        self.state = SessionState::Active;
        self.exchanges = 0;
        self.closing = None;
        tracing::debug!(character = %self.character.name, "Session reset");
    }

    /// Raw evaluation of the user's statement; unparseable text is neutral
    async fn evaluate(&self, user_text: &str, reply: &str) -> Result<u8, SessionError> {
        let message = prompts::scoring_message(&self.character, &self.user, user_text, reply);
        let text = self
            .client
            .complete(
                prompts::scoring_system(),
                &[LlmMessage::user(message)],
                self.config.score_max_tokens,
            )
            .await?;

        Ok(parse_raw_score(&text).unwrap_or_else(|| {
            tracing::warn!(
                response = %text,
                default = NEUTRAL_SCORE,
                "Could not parse score, using neutral value"
            );
            NEUTRAL_SCORE
        }))
    }

    /// History as wire messages, always opening with a user message
    ///
    /// When the greeting leads, the opener that prompted it is put back in
    /// front as text. The photo is not resent.
    fn wire_history(&self) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        if let Some(first) = self.turns.first() {
            if first.role == Role::Character {
                let opener = if first.image.is_some() {
                    prompts::PHOTO_OPENER
                } else {
                    prompts::GREETING_OPENER
                };
                messages.push(LlmMessage::user(opener));
            }
        }
        messages.extend(self.turns.iter().map(|turn| match turn.role {
            Role::User => LlmMessage::user(turn.text.clone()),
            Role::Character => LlmMessage::assistant(turn.text.clone()),
        }));
        messages
    }
}
