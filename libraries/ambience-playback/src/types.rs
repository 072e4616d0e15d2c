//! Configuration types for the playback engine

use crate::catalog::SoundDescriptor;
use crate::fade::FadeCurve;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot of the engine for status displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Sound attached to the active handle, if any
    pub sound: Option<SoundDescriptor>,

    /// Whether the active handle is producing audio
    pub playing: bool,

    /// Volume target (0.0-1.0)
    pub volume: f32,
}

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial volume target (0.0-1.0, default: 0.5)
    pub initial_volume: f32,

    /// Fade in/out duration for play and stop in milliseconds (default: 1000)
    pub fade_duration_ms: u32,

    /// Duration of each half of a volume-change duck in milliseconds (default: 500)
    pub duck_duration_ms: u32,

    /// Volume writes per fade (default: 20)
    pub fade_steps: u32,

    /// Fade curve type (default: Linear)
    pub fade_curve: FadeCurve,

    /// Upper bound on a single asset load in milliseconds (default: 10000)
    pub load_timeout_ms: u64,

    /// Buffered events per subscriber before old ones are dropped (default: 32)
    pub event_capacity: usize,
}

impl EngineConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.fade_duration_ms))
    }

    pub fn duck_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duck_duration_ms))
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.5,
            fade_duration_ms: 1000,
            duck_duration_ms: 500,
            fade_steps: 20,
            fade_curve: FadeCurve::Linear,
            load_timeout_ms: 10_000,
            event_capacity: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.initial_volume, 0.5);
        assert_eq!(config.fade_duration(), Duration::from_secs(1));
        assert_eq!(config.duck_duration(), Duration::from_millis(500));
        assert_eq!(config.fade_steps, 20);
        assert_eq!(config.fade_curve, FadeCurve::Linear);
        assert_eq!(config.load_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"fade_steps": 10, "fade_curve": "equal-power"}"#).unwrap();

        assert_eq!(config.fade_steps, 10);
        assert_eq!(config.fade_curve, FadeCurve::EqualPower);
        assert_eq!(config.fade_duration_ms, 1000);
        assert_eq!(config.event_capacity, 32);
    }
}
