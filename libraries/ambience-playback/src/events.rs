//! Playback Events
//!
//! Event-based communication so every UI surface sharing one engine sees the
//! same state. Events are emitted at key points:
//! - Asset load started
//! - Sound started (after a successful load and start)
//! - Sound stopped (handle released)
//! - Volume target changed
//! - Load or start failure

use crate::catalog::SoundDescriptor;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Asset load started
    Loading {
        /// Sound being loaded
        sound: SoundDescriptor,
    },

    /// Sound is playing and fading in
    Started {
        /// The new current sound
        sound: SoundDescriptor,
    },

    /// Sound faded out and its handle was released
    Stopped {
        /// The sound that stopped
        sound: SoundDescriptor,
    },

    /// Volume target changed
    VolumeChanged {
        /// New target (0.0-1.0)
        volume: f32,
    },

    /// Load or start failed; the engine is back to nothing playing
    Error {
        /// Sound that failed
        sound: SoundDescriptor,
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    /// Sound the event refers to, if any
    pub fn sound(&self) -> Option<&SoundDescriptor> {
        match self {
            PlaybackEvent::Loading { sound }
            | PlaybackEvent::Started { sound }
            | PlaybackEvent::Stopped { sound }
            | PlaybackEvent::Error { sound, .. } => Some(sound),
            PlaybackEvent::VolumeChanged { .. } => None,
        }
    }
}
