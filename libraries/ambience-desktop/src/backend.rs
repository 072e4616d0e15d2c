//! Desktop asset loading
//!
//! Catalog locators look like `/sounds/rain.mp3`; they are resolved against
//! a local asset directory, decoded on the blocking pool, and attached to the
//! default output device.

use crate::decode::decode_file;
use crate::error::{AudioError, Result};
use crate::output::{CpalHandle, OutputDevice};
use ambience_playback::{AudioBackend, AudioHandle, PlaybackError, SoundDescriptor};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loads ambient sounds from disk and plays them through CPAL
#[derive(Debug, Clone)]
pub struct DesktopBackend {
    asset_root: PathBuf,
}

impl DesktopBackend {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Map an asset locator to a file under the asset directory
    ///
    /// Locators are root-relative (`/sounds/rain.mp3`). Parent-directory
    /// components are rejected.
    pub fn resolve(&self, asset_ref: &str) -> Result<PathBuf> {
        let relative = Path::new(asset_ref.trim_start_matches('/'));

        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AudioError::InvalidAssetPath(asset_ref.to_string()));
        }

        Ok(self.asset_root.join(relative))
    }

    /// Blocking part of a load: decode, open the device, attach
    fn open(name: String, path: &Path) -> Result<CpalHandle> {
        let audio = decode_file(path)?;
        let device = OutputDevice::open_default()?;
        CpalHandle::new(name, device, audio)
    }
}

#[async_trait]
impl AudioBackend for DesktopBackend {
    async fn load(&self, sound: &SoundDescriptor) -> ambience_playback::Result<Arc<dyn AudioHandle>> {
        let path = self
            .resolve(&sound.asset_ref)
            .map_err(|e| e.into_playback_error(sound))?;
        debug!("Loading {} from {}", sound.name, path.display());

        let name = sound.name.clone();
        let handle = tokio::task::spawn_blocking(move || Self::open(name, &path))
            .await
            .map_err(|e| PlaybackError::asset_load(&sound.asset_ref, e.to_string()))?
            .map_err(|e| e.into_playback_error(sound))?;

        info!("Loaded {} ({} Hz output)", sound.name, handle.sample_rate());
        Ok(Arc::new(handle))
    }
}
