//! Property-based tests for score accumulation and session transitions
//!
//! - The score never leaves `0..=10`, whatever the raw inputs
//! - Failure is latched until reset
//! - A session agrees with a bare `ScoreTracker` fed the same evaluations
//! - Committed turns are always `2N + 1` after the greeting, plus at most
//!   one pending user turn
//! - Terminal sessions reject input without touching the client

use super::*;
use crate::config::SessionConfig;
use crate::llm::LlmError;
use crate::profile::{CharacterProfile, UserProfile};
use crate::testing::MockChatClient;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    /// Reply succeeds, evaluation answers with this text
    Scored(String),
    ReplyFails,
    ScoreFails,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => (0u8..=12).prop_map(|n| Step::Scored(n.to_string())),
        1 => "[a-z ]{0,12}".prop_map(Step::Scored),
        1 => (0u8..=10).prop_map(|n| Step::Scored(format!("{n}/10 - because"))),
        1 => Just(Step::ReplyFails),
        1 => Just(Step::ScoreFails),
    ]
}

fn arb_rules() -> impl Strategy<Value = (u32, u8, Option<u8>)> {
    (1u32..=5, 0u8..=3, proptest::option::of(7u8..=10))
}

fn session(mock: &Arc<MockChatClient>, config: SessionConfig) -> ConversationSession {
    let character = CharacterProfile {
        name: "Hog Rider".to_string(),
        category: "troop".to_string(),
        personality: "A loud rider who never stops charging".to_string(),
        bio: "Always in a hurry.".to_string(),
        image: None,
    };
    ConversationSession::new(
        mock.clone(),
        Arc::new(character),
        Arc::new(UserProfile::new("Sam", "Likes fast decks")),
        config,
    )
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn score_stays_in_range(raws in proptest::collection::vec(any::<u8>(), 1..30)) {
        let mut tracker = ScoreTracker::new(ScoreRules::default());
        for raw in raws {
            let score = tracker.update(raw);
            prop_assert!(score <= MAX_SCORE);
            prop_assert_eq!(score, tracker.current());
        }
    }

    #[test]
    fn failure_is_latched(
        raws in proptest::collection::vec(0u8..=10, 1..30),
        floor in 0u8..=4,
    ) {
        let mut tracker = ScoreTracker::new(ScoreRules {
            failure_floor: floor,
            ..ScoreRules::default()
        });
        let mut failed = false;
        for (i, raw) in raws.into_iter().enumerate() {
            let score = tracker.update(raw);
            failed |= score <= floor;
            prop_assert_eq!(tracker.is_failure(), failed);
            if failed {
                prop_assert!(!tracker.is_success(u32::try_from(i).unwrap() + 1));
            }
        }
    }

    #[test]
    fn blend_moves_toward_raw(previous in 0u8..=10, raw in 0u8..=10) {
        let mut tracker = ScoreTracker::new(ScoreRules::default());
        tracker.update(previous);
        let score = tracker.update(raw);
        prop_assert!(score >= previous.min(raw));
        prop_assert!(score <= previous.max(raw));
    }

    #[test]
    fn parse_never_exceeds_max(text in ".{0,40}") {
        if let Some(raw) = parse_raw_score(&text) {
            prop_assert!(raw <= MAX_SCORE);
        } else {
            prop_assert!(!text.chars().any(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn session_matches_score_model(
        steps in proptest::collection::vec(arb_step(), 1..12),
        (exchanges_to_win, failure_floor, success_ceiling) in arb_rules(),
    ) {
        let config = SessionConfig {
            exchanges_to_win,
            failure_floor,
            success_ceiling,
            ..SessionConfig::default()
        };
        block_on(async move {
            let mock = Arc::new(MockChatClient::new());
            let mut s = session(&mock, config.clone());
            let mut model = ScoreTracker::new(ScoreRules::from(&config));
            let mut exchanges = 0u32;

            mock.queue_text("greeting");
            s.start().await.unwrap();

            for step in steps {
                let calls_before = mock.recorded_requests().len();

                if s.state().is_terminal() {
                    let result = s.advance("still here?").await;
                    let is_terminal_err = matches!(result, Err(SessionError::Terminal { .. }));
                    prop_assert!(is_terminal_err);
                    prop_assert_eq!(mock.recorded_requests().len(), calls_before);
                    continue;
                }

                let pending = match step {
                    Step::Scored(evaluation) => {
                        let raw = parse_raw_score(&evaluation).unwrap_or(NEUTRAL_SCORE);
                        let mut next = model.clone();
                        let expected_score = next.update(raw);
                        let won = !next.is_failure() && next.is_success(exchanges + 1);

                        mock.queue_text("reply");
                        mock.queue_text(&evaluation);
                        if won {
                            mock.queue_text("second date?");
                        }

                        let outcome = s.advance("hello").await.unwrap();
                        model = next;
                        exchanges += 1;

                        prop_assert_eq!(outcome.raw_score, raw);
                        prop_assert_eq!(outcome.score, expected_score);
                        prop_assert_eq!(outcome.closing.is_some(), won);
                        prop_assert_eq!(outcome.state == SessionState::Succeeded, won);
                        prop_assert_eq!(
                            outcome.state == SessionState::Failed,
                            model.is_failure()
                        );
                        false
                    }
                    Step::ReplyFails => {
                        mock.queue_error(LlmError::remote(503, "unavailable"));
                        prop_assert!(s.advance("hello").await.is_err());
                        true
                    }
                    Step::ScoreFails => {
                        mock.queue_text("reply");
                        mock.queue_error(LlmError::transport("reset"));
                        prop_assert!(s.advance("hello").await.is_err());
                        true
                    }
                };

                prop_assert_eq!(s.score(), model.current());
                prop_assert_eq!(s.exchanges(), exchanges);
                prop_assert_eq!(s.pending_user_text().is_some(), pending);
                let committed = 1 + 2 * usize::try_from(exchanges).unwrap() + usize::from(pending);
                prop_assert_eq!(s.turns().len(), committed);
                prop_assert_eq!(s.closing_message().is_some(), s.state() == SessionState::Succeeded);
            }
            Ok(())
        })?;
    }
}
