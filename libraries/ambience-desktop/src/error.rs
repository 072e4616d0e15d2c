//! Desktop audio errors
use ambience_playback::{PlaybackError, SoundDescriptor};
use thiserror::Error;

/// Result type for desktop audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Desktop audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// Device not found
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// CPAL error
    #[error("CPAL error: {0}")]
    CpalError(String),

    /// Output thread exited before answering
    #[error("Audio output thread is not running")]
    OutputClosed,

    /// Asset could not be opened
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Asset path escapes the asset directory
    #[error("Invalid asset path: {0}")]
    InvalidAssetPath(String),

    /// Container or codec error
    #[error("Decode error: {0}")]
    Decode(String),

    /// Sample rate conversion error
    #[error("Sample rate conversion error: {0}")]
    ResampleError(String),
}

impl AudioError {
    /// True for failures of the output device rather than the asset
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound
                | Self::StreamBuildError(_)
                | Self::PlayError(_)
                | Self::CpalError(_)
                | Self::OutputClosed
        )
    }

    /// Convert into the engine's error for `sound`
    ///
    /// Output failures surface as start errors, everything else as load errors.
    pub fn into_playback_error(self, sound: &SoundDescriptor) -> PlaybackError {
        if self.is_output_error() {
            PlaybackError::playback_start(&sound.name, self.to_string())
        } else {
            PlaybackError::asset_load(&sound.asset_ref, self.to_string())
        }
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::CpalError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AudioError::Decode(err.to_string())
    }
}
