//! Prompt construction for the greeting, reply, scoring and closing calls

use crate::profile::{CharacterProfile, UserProfile};
use std::fmt::Write;

/// User-side opener for a text-only greeting
pub const GREETING_OPENER: &str = "Say hello!";

/// User-side opener sent alongside the user's photo
pub const PHOTO_OPENER: &str = "This is my profile picture. What do you think?";

/// User-side cue for the final ask-out message
pub const CLOSING_CUE: &str =
    "[The date has gone wonderfully and is wrapping up. Say goodbye for now.]";

const SCORING_PROMPT: &str = r"You are evaluating a dating conversation. Rate the user's statement on a scale of 0-10 based on:
- How appropriate and engaging it is
- How well it matches the character's personality and interests
- Social skills and charm
- Romantic potential

Respond with ONLY a single number from 0 to 10.";

fn character_header(character: &CharacterProfile) -> String {
    let mut header = format!(
        "You are roleplaying as a character with this personality: {}",
        character.personality
    );
    if !character.bio.trim().is_empty() {
        let _ = write!(header, "\nYour own dating profile reads: {}", character.bio);
    }
    header
}

/// Opening message when the user supplied a photo
pub fn photo_greeting_system(character: &CharacterProfile, user: &UserProfile) -> String {
    format!(
        "{}\nYou are on a dating app and just matched with someone who has this bio: {}\n\
         You just saw their profile picture. Comment on their appearance, demeanor, and what you \
         notice in the background. Be charming, witty, and flirty. Keep it brief (2-3 sentences). \
         Stay in character.",
        character_header(character),
        user.bio
    )
}

/// Opening message without a photo
pub fn greeting_system(character: &CharacterProfile, user: &UserProfile) -> String {
    format!(
        "{}\nYou are on a dating app and just matched with someone who has this bio: {}\n\
         Start the conversation with a brief, charming greeting (2-3 sentences). Stay in character.",
        character_header(character),
        user.bio
    )
}

/// In-character replies during the date
pub fn roleplay_system(character: &CharacterProfile, user: &UserProfile) -> String {
    format!(
        "{}\nYou are on a date with someone who has this bio: {}\n\
         Stay in character at all times. Be engaging and respond naturally to what they say. \
         Keep responses relatively brief (2-3 sentences) as this is a chat conversation.",
        character_header(character),
        user.bio
    )
}

/// Evaluation of one user statement
pub fn scoring_system() -> &'static str {
    SCORING_PROMPT
}

/// The single user message sent to the scoring call
pub fn scoring_message(
    character: &CharacterProfile,
    user: &UserProfile,
    user_text: &str,
    reply: &str,
) -> String {
    format!(
        "Character Personality: {}\nUser Bio: {}\nUser Said: \"{user_text}\"\n\
         Character Responded: \"{reply}\"\n\nRate this from 0-10:",
        character.personality, user.bio
    )
}

/// The character asking the user out once the date is won
pub fn closing_system(character: &CharacterProfile, user: &UserProfile) -> String {
    format!(
        "{}\nYou are on a date with someone who has this bio: {}\n\
         The date went really well and you are smitten. Ask them out on a second date in a \
         charming, in-character way. Reference something from your conversation. \
         Keep it brief (2-3 sentences).",
        character_header(character),
        user.bio
    )
}
