//! CLI configuration
//!
//! Read from an optional TOML file (`ambience.toml` in the working directory,
//! or the path given with `--config`), then overridden by environment
//! variables such as `AMBIENCE_AUDIO__ASSET_DIR=/usr/share/ambience`.

use crate::error::{CliError, Result};
use ambience_playback::{EngineConfig, FadeCurve, SoundCatalog, SoundDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AmbienceConfig {
    #[serde(default = "default_audio")]
    pub audio: AudioSettings,

    /// Replaces the built-in catalog when present
    #[serde(default)]
    pub sounds: Option<Vec<SoundDescriptor>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioSettings {
    /// Directory that catalog locators such as `/sounds/rain.mp3` resolve against
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: u32,

    #[serde(default = "default_duck_duration_ms")]
    pub duck_duration_ms: u32,

    #[serde(default = "default_fade_steps")]
    pub fade_steps: u32,

    #[serde(default)]
    pub fade_curve: FadeCurve,

    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
}

impl AmbienceConfig {
    /// Load configuration from file and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            config::Environment::with_prefix("AMBIENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            // An explicit file must exist
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("ambience.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(env);

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.fade_steps == 0 {
            return Err(CliError::Config(
                "fade_steps must be at least 1 (set AMBIENCE_AUDIO__FADE_STEPS)".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.audio.initial_volume) {
            return Err(CliError::Config(format!(
                "initial_volume must be between 0.0 and 1.0, got {}",
                self.audio.initial_volume
            )));
        }

        if self.audio.load_timeout_ms == 0 {
            return Err(CliError::Config(
                "load_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(sounds) = &self.sounds {
            if sounds.is_empty() {
                return Err(CliError::Config(
                    "sounds list is empty; remove it to use the built-in catalog".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Engine settings derived from the audio section
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_volume: self.audio.initial_volume,
            fade_duration_ms: self.audio.fade_duration_ms,
            duck_duration_ms: self.audio.duck_duration_ms,
            fade_steps: self.audio.fade_steps,
            fade_curve: self.audio.fade_curve,
            load_timeout_ms: self.audio.load_timeout_ms,
            ..EngineConfig::default()
        }
    }

    /// Configured sounds, or the built-in catalog
    pub fn catalog(&self) -> Result<SoundCatalog> {
        match &self.sounds {
            Some(sounds) => Ok(SoundCatalog::new(sounds.clone())?),
            None => Ok(SoundCatalog::builtin().clone()),
        }
    }
}

// Default values
fn default_audio() -> AudioSettings {
    AudioSettings {
        asset_dir: default_asset_dir(),
        initial_volume: default_initial_volume(),
        fade_duration_ms: default_fade_duration_ms(),
        duck_duration_ms: default_duck_duration_ms(),
        fade_steps: default_fade_steps(),
        fade_curve: FadeCurve::default(),
        load_timeout_ms: default_load_timeout_ms(),
    }
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("./assets")
}

fn default_initial_volume() -> f32 {
    EngineConfig::default().initial_volume
}

fn default_fade_duration_ms() -> u32 {
    EngineConfig::default().fade_duration_ms
}

fn default_duck_duration_ms() -> u32 {
    EngineConfig::default().duck_duration_ms
}

fn default_fade_steps() -> u32 {
    EngineConfig::default().fade_steps
}

fn default_load_timeout_ms() -> u64 {
    EngineConfig::default().load_timeout_ms
}

impl Default for AmbienceConfig {
    fn default() -> Self {
        Self {
            audio: default_audio(),
            sounds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        config::Environment::with_prefix("AMBIENCE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("ambience.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_match_engine() {
        let config = AmbienceConfig::default();
        assert_eq!(config.engine_config(), EngineConfig::default());
        assert_eq!(config.audio.asset_dir, PathBuf::from("./assets"));
        assert_eq!(config.catalog().unwrap().len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[audio]
asset_dir = "/srv/ambience"
fade_duration_ms = 2000
fade_curve = "s-curve"
"#,
        );

        let config = AmbienceConfig::load_with_env(Some(&path), env(&[])).unwrap();
        assert_eq!(config.audio.asset_dir, PathBuf::from("/srv/ambience"));

        let engine = config.engine_config();
        assert_eq!(engine.fade_duration(), Duration::from_secs(2));
        assert_eq!(engine.fade_curve, FadeCurve::SCurve);
        assert_eq!(engine.fade_steps, 20);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[audio]\nfade_steps = 10\n");

        let config = AmbienceConfig::load_with_env(
            Some(&path),
            env(&[
                ("AMBIENCE_AUDIO__FADE_STEPS", "40"),
                ("AMBIENCE_AUDIO__ASSET_DIR", "/opt/sounds"),
            ]),
        )
        .unwrap();

        assert_eq!(config.audio.fade_steps, 40);
        assert_eq!(config.audio.asset_dir, PathBuf::from("/opt/sounds"));
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");

        let result = AmbienceConfig::load_with_env(Some(&missing), env(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn custom_sounds_replace_builtin() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[[sounds]]
name = "Fireplace"
icon = "🔥"
asset_ref = "/sounds/fireplace.ogg"
description = "Crackling fire"

[[sounds]]
name = "Cafe"
icon = "☕"
asset_ref = "/sounds/cafe.ogg"
description = "Quiet coffee shop"
"#,
        );

        let config = AmbienceConfig::load_with_env(Some(&path), env(&[])).unwrap();
        let catalog = config.catalog().unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.list_sounds()[0].name, "Fireplace");
        assert!(catalog.find("Rain").is_none());
    }

    #[test]
    fn duplicate_custom_sounds_are_rejected() {
        let sound = SoundDescriptor::new("Rain", "🌧️", "/sounds/rain.mp3", "Rain");
        let config = AmbienceConfig {
            sounds: Some(vec![sound.clone(), sound]),
            ..AmbienceConfig::default()
        };

        assert!(matches!(config.catalog(), Err(CliError::Catalog(_))));
    }

    #[test]
    fn validate_rejects_zero_steps() {
        let mut config = AmbienceConfig::default();
        config.audio.fade_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_volume() {
        let mut config = AmbienceConfig::default();
        config.audio.initial_volume = 1.5;
        assert!(config.validate().is_err());
    }
}
