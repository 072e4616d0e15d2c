//! Ambient sound catalog
//!
//! Immutable, ordered list of the sounds a front end can offer. The engine
//! never checks catalog membership; front ends look sounds up here and hand
//! the descriptor to [`PlaybackEngine::play`](crate::PlaybackEngine::play).

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundDescriptor {
    /// Unique key, also the display name
    pub name: String,

    /// Display glyph (not used by the engine)
    pub icon: String,

    /// Locator for the audio resource, resolved by the backend
    pub asset_ref: String,

    /// Short human-readable description
    pub description: String,
}

impl SoundDescriptor {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        asset_ref: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            asset_ref: asset_ref.into(),
            description: description.into(),
        }
    }
}

/// Ordered collection of sounds with unique names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCatalog {
    sounds: Vec<SoundDescriptor>,
}

impl SoundCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn new(sounds: Vec<SoundDescriptor>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(sounds.len());
        for sound in &sounds {
            if !seen.insert(sound.name.as_str()) {
                return Err(PlaybackError::DuplicateSound(sound.name.clone()));
            }
        }

        Ok(Self { sounds })
    }

    /// The built-in ambient sounds, in display order
    pub fn builtin() -> &'static SoundCatalog {
        static BUILTIN: OnceLock<SoundCatalog> = OnceLock::new();

        BUILTIN.get_or_init(|| SoundCatalog {
            sounds: vec![
                SoundDescriptor::new("Rain", "🌧️", "/sounds/rain.mp3", "Gentle rain sounds"),
                SoundDescriptor::new(
                    "Forest",
                    "🌲",
                    "/sounds/forest.mp3",
                    "Peaceful forest ambience",
                ),
                SoundDescriptor::new("Ocean", "🌊", "/sounds/ocean.mp3", "Calming ocean waves"),
                SoundDescriptor::new(
                    "White Noise",
                    "🌫️",
                    "/sounds/white-noise.mp3",
                    "Steady white noise",
                ),
                SoundDescriptor::new("Birds", "🐦", "/sounds/birds.mp3", "Morning birdsong"),
                SoundDescriptor::new("Stream", "💧", "/sounds/stream.mp3", "Flowing water"),
            ],
        })
    }

    /// All sounds in stable order
    pub fn list_sounds(&self) -> &[SoundDescriptor] {
        &self.sounds
    }

    /// Look a sound up by name (exact match)
    pub fn find(&self, name: &str) -> Option<&SoundDescriptor> {
        self.sounds.iter().find(|sound| sound.name == name)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}
