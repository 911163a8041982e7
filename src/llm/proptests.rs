//! Property-based tests for request validation and wire translation
//!
//! - Alternating user-first histories are always accepted
//! - Any history with two adjacent same-role messages is rejected
//! - Translation preserves message count, roles and text

use super::anthropic::{parse_response, AnthropicService};
use super::types::{ContentBlock, ImageSource, LlmMessage, LlmRequest, MessageRole};
use super::validate_history;
use crate::config::LlmConfig;
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,']{1,80}"
}

fn arb_image_block() -> impl Strategy<Value = ContentBlock> {
    (
        prop_oneof![
            Just("image/png".to_string()),
            Just("image/jpeg".to_string()),
            Just("image/webp".to_string()),
        ],
        "[a-zA-Z0-9+/]{8,40}",
    )
        .prop_map(|(media_type, data)| {
            ContentBlock::image(ImageSource::Base64 { media_type, data })
        })
}

/// Alternating history, user first, `1..=max` messages
fn arb_alternating_history(max: usize) -> impl Strategy<Value = Vec<LlmMessage>> {
    proptest::collection::vec(arb_text(), 1..=max).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                if i % 2 == 0 {
                    LlmMessage::user(text)
                } else {
                    LlmMessage::assistant(text)
                }
            })
            .collect()
    })
}

fn service() -> AnthropicService {
    AnthropicService::new(&LlmConfig::new("sk-proptest-key-0000")).unwrap()
}

proptest! {
    #[test]
    fn alternating_histories_are_valid(history in arb_alternating_history(12)) {
        prop_assert!(validate_history(&history).is_ok());
    }

    #[test]
    fn duplicated_role_is_rejected(
        history in arb_alternating_history(12),
        idx in any::<prop::sample::Index>(),
    ) {
        let mut history = history;
        let at = idx.index(history.len());
        let dup = history[at].clone();
        history.insert(at, dup);
        prop_assert!(validate_history(&history).is_err());
    }

    #[test]
    fn translation_preserves_roles_and_text(
        history in arb_alternating_history(10),
        system in arb_text(),
        max_tokens in 1u32..4096,
    ) {
        let request = LlmRequest { system: system.clone(), messages: history.clone(), max_tokens };
        let wire = serde_json::to_value(service().translate_request(&request)).unwrap();

        prop_assert_eq!(wire["system"].as_str(), Some(system.as_str()));
        prop_assert_eq!(wire["max_tokens"].as_u64(), Some(u64::from(max_tokens)));
        let messages = wire["messages"].as_array().unwrap();
        prop_assert_eq!(messages.len(), history.len());
        for (wire_msg, msg) in messages.iter().zip(&history) {
            prop_assert_eq!(wire_msg["role"].as_str(), Some(msg.role.as_str()));
            let ContentBlock::Text { text } = &msg.content[0] else {
                unreachable!("history is text only");
            };
            prop_assert_eq!(wire_msg["content"][0]["text"].as_str(), Some(text.as_str()));
        }
    }

    #[test]
    fn image_blocks_keep_media_type_and_data(block in arb_image_block(), prompt in arb_text()) {
        let request = LlmRequest {
            system: String::new(),
            messages: vec![LlmMessage {
                role: MessageRole::User,
                content: vec![block.clone(), ContentBlock::text(prompt)],
            }],
            max_tokens: 10,
        };
        let wire = serde_json::to_value(service().translate_request(&request)).unwrap();
        let ContentBlock::Image { source: ImageSource::Base64 { media_type, data } } = block else {
            unreachable!("strategy yields images");
        };
        let source = &wire["messages"][0]["content"][0]["source"];
        prop_assert_eq!(source["type"].as_str(), Some("base64"));
        prop_assert_eq!(source["media_type"].as_str(), Some(media_type.as_str()));
        prop_assert_eq!(source["data"].as_str(), Some(data.as_str()));
    }

    #[test]
    fn parsed_text_matches_first_block(texts in proptest::collection::vec(arb_text(), 1..4)) {
        let blocks: Vec<_> = texts
            .iter()
            .map(|t| serde_json::json!({ "type": "text", "text": t }))
            .collect();
        let body = serde_json::json!({ "content": blocks, "stop_reason": "end_turn" }).to_string();
        let response = parse_response(&body).unwrap();
        prop_assert_eq!(response.first_text().unwrap(), texts[0].as_str());
    }
}
