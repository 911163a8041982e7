//! Immutable participant profiles handed to a session at construction

use crate::llm::ImageSource;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Maximum photo size (5MB)
const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Supported image formats and their media types
const SUPPORTED_FORMATS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// Unknown extensions are sent as JPEG
const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("image too large: {size} bytes (max {max} bytes)", max = MAX_IMAGE_SIZE)]
    TooLarge { size: u64 },
}

/// Raw image bytes plus their media type
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    /// Read an image from disk, deriving the media type from its extension
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let io_err = |source| ImageError::Io {
            path: path.display().to_string(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
        if metadata.len() > MAX_IMAGE_SIZE {
            return Err(ImageError::TooLarge {
                size: metadata.len(),
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        Ok(Self::new(bytes, media_type_for_path(path)))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_image_source(&self) -> ImageSource {
        ImageSource::Base64 {
            media_type: self.media_type.clone(),
            data: self.to_base64(),
        }
    }
}

/// Media type for a file path, by extension
pub fn media_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .and_then(|ext| {
            SUPPORTED_FORMATS
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, media_type)| *media_type)
        })
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// The matched character the user is chatting with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterProfile {
    pub name: String,
    /// Persona label, e.g. "troop" or "building"
    pub category: String,
    /// Full personality description used in the roleplay prompts
    pub personality: String,
    /// Short dating-profile biography of the character
    pub bio: String,
    /// Card art for presentation layers; never sent to the model
    pub image: Option<ReferenceImage>,
}

/// The player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub bio: String,
    pub photo: Option<ReferenceImage>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bio: bio.into(),
            photo: None,
        }
    }

    #[must_use]
    pub fn with_photo(mut self, photo: ReferenceImage) -> Self {
        self.photo = Some(photo);
        self
    }
}
