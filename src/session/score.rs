//! Relationship score accumulation
//!
//! Policy: the first evaluation seeds the score directly. Each later raw
//! evaluation is blended 3/5 new, 2/5 previous, rounding half up:
//! `(3 * raw + 2 * previous + 2) / 5`. Raw values above 10 clamp to 10,
//! so the score always stays within `0..=10`.

use crate::config::SessionConfig;

pub const MAX_SCORE: u8 = 10;

/// Raw value used when the evaluation text has no number in it, and the
/// score reported before any evaluation
pub const NEUTRAL_SCORE: u8 = 5;

const NEW_WEIGHT: u16 = 3;
const OLD_WEIGHT: u16 = 2;

/// Termination thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRules {
    pub failure_floor: u8,
    pub exchanges_to_win: u32,
    pub success_ceiling: Option<u8>,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for ScoreRules {
    fn from(config: &SessionConfig) -> Self {
        Self {
            failure_floor: config.failure_floor,
            exchanges_to_win: config.exchanges_to_win,
            success_ceiling: config.success_ceiling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTracker {
    rules: ScoreRules,
    current: Option<u8>,
    failed: bool,
}

impl ScoreTracker {
    pub fn new(rules: ScoreRules) -> Self {
        Self {
            rules,
            current: None,
            failed: false,
        }
    }

    /// Fold one raw evaluation into the current score
    pub fn update(&mut self, raw: u8) -> u8 {
        let raw = raw.min(MAX_SCORE);
        let next = match self.current {
            None => raw,
            Some(previous) => {
                let blended = (NEW_WEIGHT * u16::from(raw)
                    + OLD_WEIGHT * u16::from(previous)
                    + (NEW_WEIGHT + OLD_WEIGHT) / 2)
                    / (NEW_WEIGHT + OLD_WEIGHT);
                u8::try_from(blended).map_or(MAX_SCORE, |s| s.min(MAX_SCORE))
            }
        };

        self.current = Some(next);
        if next <= self.rules.failure_floor {
            self.failed = true;
        }
        next
    }

    pub fn current(&self) -> u8 {
        self.current.unwrap_or(NEUTRAL_SCORE)
    }

    /// Whether any evaluation has been recorded
    pub fn is_seeded(&self) -> bool {
        self.current.is_some()
    }

    /// Latched once the score touches the floor
    pub fn is_failure(&self) -> bool {
        self.failed
    }

    pub fn is_success(&self, turns_completed: u32) -> bool {
        if self.failed {
            return false;
        }
        let by_ceiling = match (self.rules.success_ceiling, self.current) {
            (Some(ceiling), Some(current)) => current >= ceiling,
            _ => false,
        };
        by_ceiling || turns_completed >= self.rules.exchanges_to_win
    }

    pub fn rules(&self) -> ScoreRules {
        self.rules
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.failed = false;
    }
}

/// Extract the raw score from an evaluation reply
///
/// The first run of ASCII digits wins ("0/10 - rude" is 0, "10/10" is 10).
/// Values above 10 clamp to 10. `None` when the text has no digits at all.
pub fn parse_raw_score(text: &str) -> Option<u8> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    // Overlong digit runs overflow u32; they are still "above 10".
    let value = digits.parse::<u32>().unwrap_or(u32::MAX);
    Some(u8::try_from(value).map_or(MAX_SCORE, |v| v.min(MAX_SCORE)))
}
