//! Platform-agnostic audio output traits
//!
//! Abstracts the audio primitive for different platforms. The engine only
//! needs to load an asset into a handle, loop it, change its volume while it
//! plays, and start or pause it.

use crate::catalog::SoundDescriptor;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Loads catalog assets into playable handles
///
/// Implementations resolve [`SoundDescriptor::asset_ref`] however their
/// platform requires (file path, URL, embedded bytes).
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Load and decode an asset
    ///
    /// Resolves once the asset can play through. The returned handle must be
    /// paused (not producing audio) until [`AudioHandle::play`] is called.
    ///
    /// # Errors
    /// `PlaybackError::AssetLoad` if the asset is unreachable or undecodable
    async fn load(&self, sound: &SoundDescriptor) -> Result<Arc<dyn AudioHandle>>;
}

/// A single loaded asset attached to an output
///
/// All methods take `&self`; implementations keep volume and transport
/// flags in shared state so a fade task can write volume while another
/// task owns the handle.
#[async_trait]
pub trait AudioHandle: Send + Sync {
    /// Restart from the beginning when the end is reached
    fn set_looping(&self, looping: bool);

    /// Set instantaneous volume (0.0-1.0), effective while playing
    fn set_volume(&self, volume: f32);

    /// Current instantaneous volume
    fn volume(&self) -> f32;

    /// Start producing audio
    ///
    /// Resolves once output has started.
    ///
    /// # Errors
    /// `PlaybackError::PlaybackStart` if the output refuses to start
    async fn play(&self) -> Result<()>;

    /// Stop producing audio (position is kept)
    fn pause(&self);

    /// True unless the handle is currently producing audio
    fn is_paused(&self) -> bool;
}
