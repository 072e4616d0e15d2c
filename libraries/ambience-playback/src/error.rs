//! Error types for ambient playback

use thiserror::Error;

/// Playback errors
///
/// The engine recovers from the load and start variants itself; they reach
/// callers only through the backend traits and the event channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Asset could not be fetched, decoded, or did not load in time
    #[error("Failed to load audio asset {asset}: {reason}")]
    AssetLoad { asset: String, reason: String },

    /// Output refused to start the loaded asset
    #[error("Failed to start playback of {asset}: {reason}")]
    PlaybackStart { asset: String, reason: String },

    /// Two catalog entries share a name
    #[error("Duplicate sound in catalog: {0}")]
    DuplicateSound(String),
}

impl PlaybackError {
    /// Create an asset load error
    pub fn asset_load(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    /// Create a playback start error
    pub fn playback_start(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PlaybackStart {
            asset: asset.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
