//! Focus Ambience - Playback Engine
//!
//! Platform-agnostic ambient sound playback for study focus sessions.
//!
//! This crate provides:
//! - Sound catalog (built-in or configured, unique names, stable order)
//! - Playback engine (one sound at a time, smooth transitions)
//! - Cancellable stepped fades (linear, square root, S-curve, equal power)
//! - Volume target with clamping
//! - Playback events for UI synchronization
//!
//! # Architecture
//!
//! `ambience-playback` has no audio device code:
//! - No dependency on CPAL or Symphonia
//! - Runs on any tokio runtime
//!
//! Platform-specific code (asset loading, audio output) is provided through
//! the [`AudioBackend`] and [`AudioHandle`] traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use ambience_playback::{AudioBackend, EngineConfig, PlaybackEngine, SoundCatalog};
//! use std::sync::Arc;
//!
//! # async fn run(backend: Arc<dyn AudioBackend>) {
//! let engine = PlaybackEngine::new(backend, EngineConfig::default());
//!
//! let rain = SoundCatalog::builtin().find("Rain").unwrap();
//! engine.set_volume(0.4).await;
//! engine.play(rain).await;
//! assert_eq!(engine.current_sound().as_ref(), Some(rain));
//!
//! // Another surface can share the same engine
//! let widget = engine.clone();
//! widget.stop().await;
//! # }
//! ```

mod catalog;
mod engine;
mod error;
mod events;
mod fade;
mod output;
pub mod types;
mod volume;

// Public exports
pub use catalog::{SoundCatalog, SoundDescriptor};
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use fade::{FadeCurve, FadeHandle, FadeOutcome, FadePlan};
pub use output::{AudioBackend, AudioHandle};
pub use types::{EngineConfig, PlaybackStatus};
pub use volume::Volume;
