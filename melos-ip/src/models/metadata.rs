//! Typed asset metadata envelope
//!
//! Replaces free-form metadata maps with a versioned envelope: a known
//! required subset plus an opaque `extra` extension map for forward
//! compatibility.

use super::ip_asset::Creator;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn default_schema_version() -> u32 {
    1
}

/// Asset metadata supplied by the creator at registration time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub creators: Vec<Creator>,

    /// URL of the audio media itself
    pub media_url: String,

    /// Media MIME type (e.g. "audio/mpeg")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_mime: Option<String>,

    /// Cover image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Opaque extension map, passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,
}

impl AssetMetadata {
    /// Validate the required subset
    ///
    /// Fails fast before any network call is made.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.media_url.trim().is_empty() {
            return Err("media_url must not be empty".to_string());
        }
        if self.creators.is_empty() {
            return Err("at least one creator is required".to_string());
        }
        let total: u32 = self
            .creators
            .iter()
            .map(|c| c.contribution_percent as u32)
            .sum();
        if total != 100 {
            return Err(format!(
                "creator contributions must sum to 100, got {}",
                total
            ));
        }
        Ok(())
    }

    /// IP metadata document uploaded to the storage gateway
    ///
    /// `media_hash` is the SHA-256 of the media content when available.
    pub fn to_ip_metadata(&self, media_hash: Option<&str>) -> Value {
        json!({
            "schema_version": self.schema_version,
            "title": self.title,
            "description": self.description,
            "creators": self.creators,
            "media": {
                "url": self.media_url,
                "mime_type": self.media_mime,
                "hash": media_hash,
            },
            "image": self.image_url,
            "extra": self.extra,
        })
    }

    /// NFT metadata document uploaded to the storage gateway
    pub fn to_nft_metadata(&self) -> Value {
        json!({
            "name": self.title,
            "description": self.description,
            "image": self.image_url,
            "animation_url": self.media_url,
            "attributes": [
                {"trait_type": "media_type", "value": self.media_mime},
            ],
        })
    }
}
