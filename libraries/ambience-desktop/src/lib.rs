//! Desktop audio backend for Focus Ambience
//!
//! Implements the `ambience-playback` backend traits for desktop platforms.
//!
//! # Features
//!
//! - Universal decoding through Symphonia (MP3, FLAC, OGG, WAV, AAC)
//! - Automatic sample rate conversion to the device rate (Rubato)
//! - Cross-platform output through CPAL
//! - Gapless looping and per-handle volume
//!
//! # Example
//!
//! ```no_run
//! use ambience_desktop::DesktopBackend;
//! use ambience_playback::{EngineConfig, PlaybackEngine, SoundCatalog};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let backend = Arc::new(DesktopBackend::new("./assets"));
//! let engine = PlaybackEngine::new(backend, EngineConfig::default());
//!
//! let forest = SoundCatalog::builtin().find("Forest").unwrap();
//! engine.play(forest).await;
//! # }
//! ```

mod backend;
pub mod decode;
mod error;
mod output;

pub use backend::DesktopBackend;
pub use decode::{decode_file, DecodedAudio};
pub use error::{AudioError, Result};
pub use output::{CpalHandle, OutputDevice};
