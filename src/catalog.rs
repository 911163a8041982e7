//! Card catalog
//!
//! The card dataset is a JSON array of card objects. It is deserialized
//! into typed [`Card`]s and checked before any card is turned into a
//! [`CharacterProfile`] for a session.

use crate::profile::{CharacterProfile, ReferenceImage};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Fallback height, in inches, for unparseable height strings (5'0")
const DEFAULT_HEIGHT_INCHES: u32 = 60;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read card catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("card catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("card #{index} ({name:?}) is invalid: {reason}")]
    Invalid {
        index: usize,
        name: String,
        reason: String,
    },
}

/// One entry in the card dataset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Card {
    #[serde(rename = "card_name")]
    pub name: String,
    pub image: String,
    pub height: String,
    pub attack_range: String,
    /// 0.0 (always busy) to 1.0 (always free)
    pub free_time: f64,
    /// 0.0 (not at all) to 1.0 (fully humanoid)
    pub humanoid_score: f64,
    pub category: String,
    pub personality: String,
}

impl Card {
    fn validate(&self, index: usize) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::Invalid {
            index,
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("card_name is empty"));
        }
        if self.category.trim().is_empty() {
            return Err(invalid("category is empty"));
        }
        if self.personality.trim().is_empty() {
            return Err(invalid("personality is empty"));
        }
        if !(0.0..=1.0).contains(&self.free_time) {
            return Err(invalid("free_time must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.humanoid_score) {
            return Err(invalid("humanoid_score must be within 0..=1"));
        }
        Ok(())
    }

    /// Height in inches, parsed from strings like `6'0"` or `5'11`
    pub fn height_inches(&self) -> u32 {
        let cleaned: String = self
            .height
            .chars()
            .filter(|c| *c != '"' && *c != '\\')
            .collect();
        let mut parts = cleaned.split('\'');
        let feet = parts.next().map(str::trim).and_then(|f| f.parse::<u32>().ok());
        let inches = match parts.next().map(str::trim) {
            None | Some("") => Some(0),
            Some(i) => i.parse::<u32>().ok(),
        };

        let total = match (feet, inches) {
            (Some(feet), Some(inches)) => feet.checked_mul(12).and_then(|f| f.checked_add(inches)),
            _ => None,
        };
        match total {
            Some(total) => total,
            None => {
                tracing::warn!(card = %self.name, height = %self.height, "Unparseable card height");
                DEFAULT_HEIGHT_INCHES
            }
        }
    }

    /// Personality text used to roleplay this card
    pub fn persona_prompt(&self) -> String {
        format!(
            "You are {} from Clash Royale, a {}. Your personality can be described as: {}. \
             You are on a dating app and just matched with someone. \
             Be charming, witty, and stay in character based on your Clash Royale persona. \
             Keep responses relatively brief (2-3 sentences) as this is a chat conversation. \
             Show interest in getting to know your match.",
            self.name, self.category, self.personality
        )
    }

    /// Short dating-profile biography shown on the card
    pub fn bio(&self) -> String {
        let humanoid = if self.humanoid_score >= 0.9 {
            "Very humanoid and relatable."
        } else if self.humanoid_score >= 0.6 {
            "Somewhat humanoid."
        } else {
            "Unique and mysterious."
        };

        let availability = if self.free_time >= 0.6 {
            "Has plenty of free time for dates!"
        } else if self.free_time >= 0.4 {
            "Balances work and personal life."
        } else {
            "Very busy, but makes time for the right person."
        };

        format!(
            "A {} {} from the Arena. {humanoid} {availability}",
            self.personality.to_lowercase(),
            self.category
        )
    }

    /// Build the session-facing profile for this card
    pub fn to_profile(&self, image: Option<ReferenceImage>) -> CharacterProfile {
        CharacterProfile {
            name: self.name.clone(),
            category: self.category.clone(),
            personality: self.persona_prompt(),
            bio: self.bio(),
            image,
        }
    }
}

/// Validated set of cards
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<Card>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        for (index, card) in cards.iter().enumerate() {
            card.validate(index)?;
        }
        Ok(Self { cards })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), cards = catalog.len(), "Card catalog loaded");
        Ok(catalog)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Case-insensitive lookup by card name
    pub fn find(&self, name: &str) -> Option<&Card> {
        let name = name.trim();
        self.cards.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}
