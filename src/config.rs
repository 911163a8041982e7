//! Environment-based configuration
//!
//! Everything is read once at startup into typed values. The API key is
//! only ever supplied from the environment and is masked whenever logged.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for the chat completion service
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Per-request budget, covering connect through body read
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &mask_token(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable source (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup("ARENA_DATE_BASE_URL").filter(|s| !s.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(model) = lookup("ARENA_DATE_MODEL").filter(|s| !s.trim().is_empty()) {
            config.model = model;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "ARENA_DATE_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "ARENA_DATE_TIMEOUT_SECS",
                    value: secs.to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Rules and token budgets for one conversation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub greeting_max_tokens: u32,
    pub reply_max_tokens: u32,
    pub score_max_tokens: u32,
    pub closing_max_tokens: u32,
    /// Character replies needed, without failing, to win the date
    pub exchanges_to_win: u32,
    /// Current score at or below which the date fails
    pub failure_floor: u8,
    /// Current score at or above which the date is won early, if set
    pub success_ceiling: Option<u8>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting_max_tokens: 500,
            reply_max_tokens: 500,
            score_max_tokens: 10,
            closing_max_tokens: 500,
            exchanges_to_win: 3,
            failure_floor: 0,
            success_ceiling: None,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(tokens) = parse_var::<u32>(&lookup, "ARENA_DATE_MAX_TOKENS")? {
            if tokens == 0 {
                return Err(ConfigError::Invalid {
                    var: "ARENA_DATE_MAX_TOKENS",
                    value: tokens.to_string(),
                });
            }
            config.greeting_max_tokens = tokens;
            config.reply_max_tokens = tokens;
            config.closing_max_tokens = tokens;
        }
        if let Some(exchanges) = parse_var::<u32>(&lookup, "ARENA_DATE_EXCHANGES")? {
            if exchanges == 0 {
                return Err(ConfigError::Invalid {
                    var: "ARENA_DATE_EXCHANGES",
                    value: exchanges.to_string(),
                });
            }
            config.exchanges_to_win = exchanges;
        }
        if let Some(floor) = parse_var::<u8>(&lookup, "ARENA_DATE_FAILURE_FLOOR")? {
            if floor > 10 {
                return Err(ConfigError::Invalid {
                    var: "ARENA_DATE_FAILURE_FLOOR",
                    value: floor.to_string(),
                });
            }
            config.failure_floor = floor;
        }
        if let Some(ceiling) = parse_var::<u8>(&lookup, "ARENA_DATE_SUCCESS_CEILING")? {
            if ceiling > 10 {
                return Err(ConfigError::Invalid {
                    var: "ARENA_DATE_SUCCESS_CEILING",
                    value: ceiling.to_string(),
                });
            }
            config.success_ceiling = Some(ceiling);
        }
        Ok(config)
    }
}

/// Location of the card dataset, `ARENA_DATE_CARDS` or `cards.json`
pub fn catalog_path() -> PathBuf {
    env::var("ARENA_DATE_CARDS").map_or_else(|_| PathBuf::from("cards.json"), PathBuf::from)
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// Masks an API key for logging: first 7 chars + "***" + last 4 chars.
/// Keys of 11 chars or fewer are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars.iter().take(7).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{head}***{tail}")
}
