//! Shared, single-flight access to a session from async callers
//!
//! The session lock is taken when a call is *created*, not when its future
//! is first polled. A second call made while one is in flight fails with
//! `SessionError::Busy` right away instead of queueing behind it.

use super::{AdvanceOutcome, ConversationSession, ConversationTurn, SessionError, SessionState};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Point-in-time copy of what a presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub score: u8,
    pub exchanges: u32,
    pub turns: Vec<ConversationTurn>,
    pub closing: Option<String>,
    pub pending_user_text: Option<String>,
}

#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<ConversationSession>>,
}

impl SessionHandle {
    pub fn new(session: ConversationSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Greeting call as a detached future, runnable on any executor
    pub fn start(
        &self,
    ) -> impl Future<Output = Result<ConversationTurn, SessionError>> + Send + 'static {
        let guard = self.inner.clone().try_lock_owned();
        async move {
            let mut session = guard.map_err(|_| SessionError::Busy)?;
            session.start().await
        }
    }

    pub fn advance(
        &self,
        user_text: impl Into<String>,
    ) -> impl Future<Output = Result<AdvanceOutcome, SessionError>> + Send + 'static {
        let user_text = user_text.into();
        let guard = self.inner.clone().try_lock_owned();
        async move {
            let mut session = guard.map_err(|_| SessionError::Busy)?;
            session.advance(&user_text).await
        }
    }

    /// Run `start` on the tokio runtime
    pub fn spawn_start(&self) -> JoinHandle<Result<ConversationTurn, SessionError>> {
        tokio::spawn(self.start())
    }

    /// Run `advance` on the tokio runtime
    pub fn spawn_advance(
        &self,
        user_text: impl Into<String>,
    ) -> JoinHandle<Result<AdvanceOutcome, SessionError>> {
        tokio::spawn(self.advance(user_text))
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        let mut session = self.inner.try_lock().map_err(|_| SessionError::Busy)?;
        session.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let session = self.inner.try_lock().map_err(|_| SessionError::Busy)?;
        Ok(SessionSnapshot {
            state: session.state(),
            score: session.score(),
            exchanges: session.exchanges(),
            turns: session.turns().to_vec(),
            closing: session.closing_message().map(str::to_string),
            pending_user_text: session.pending_user_text().map(str::to_string),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

/// Await a spawned session call, folding a panicked or cancelled task into
/// `SessionError::Worker`
pub async fn join_task<T>(handle: JoinHandle<Result<T, SessionError>>) -> Result<T, SessionError> {
    handle
        .await
        .map_err(|e| SessionError::Worker(e.to_string()))?
}
