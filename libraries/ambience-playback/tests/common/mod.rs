//! Shared test helpers: an in-memory audio backend
//!
//! Handles record every volume write so tests can check fade shapes and make
//! sure nothing writes after it was superseded.

#![allow(dead_code)]

use ambience_playback::{
    AudioBackend, AudioHandle, PlaybackError, Result, SoundCatalog, SoundDescriptor,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock audio handle
pub struct MockHandle {
    pub name: String,
    volume: Mutex<f32>,
    history: Mutex<Vec<f32>>,
    paused: AtomicBool,
    looping: AtomicBool,
    play_calls: AtomicUsize,
    refuse_start: bool,
    start_delay: Option<Duration>,
}

impl MockHandle {
    fn new(name: String, refuse_start: bool, start_delay: Option<Duration>) -> Self {
        Self {
            name,
            volume: Mutex::new(1.0),
            history: Mutex::new(Vec::new()),
            paused: AtomicBool::new(true),
            looping: AtomicBool::new(false),
            play_calls: AtomicUsize::new(0),
            refuse_start,
            start_delay,
        }
    }

    /// Every volume written, in order
    pub fn history(&self) -> Vec<f32> {
        self.history.lock().unwrap().clone()
    }

    pub fn play_calls(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    pub fn is_looping(&self) -> bool {
        self.looping.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioHandle for MockHandle {
    fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::SeqCst);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
        self.history.lock().unwrap().push(volume);
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    async fn play(&self) -> Result<()> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        if self.refuse_start {
            return Err(PlaybackError::playback_start(
                &self.name,
                "autoplay blocked",
            ));
        }
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// Mock audio backend
///
/// Loads succeed instantly unless configured otherwise.
#[derive(Default)]
pub struct MockBackend {
    handles: Mutex<Vec<Arc<MockHandle>>>,
    failing: Mutex<HashSet<String>>,
    refusing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    start_delays: Mutex<HashMap<String, Duration>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Loads of `name` fail with an asset error
    pub fn fail_load(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Handles for `name` refuse to start
    pub fn refuse_start(&self, name: &str) {
        self.refusing.lock().unwrap().insert(name.to_string());
    }

    /// Loads of `name` take `delay`
    pub fn delay_load(&self, name: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(name.to_string(), delay);
    }

    /// Handles for `name` take `delay` to start (or to refuse)
    pub fn delay_start(&self, name: &str, delay: Duration) {
        self.start_delays
            .lock()
            .unwrap()
            .insert(name.to_string(), delay);
    }

    /// Every handle created so far
    pub fn handles(&self) -> Vec<Arc<MockHandle>> {
        self.handles.lock().unwrap().clone()
    }

    pub fn handles_for(&self, name: &str) -> Vec<Arc<MockHandle>> {
        self.handles()
            .into_iter()
            .filter(|handle| handle.name == name)
            .collect()
    }

    /// Handles currently producing audio
    pub fn audible(&self) -> Vec<Arc<MockHandle>> {
        self.handles()
            .into_iter()
            .filter(|handle| !handle.is_paused())
            .collect()
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    async fn load(&self, sound: &SoundDescriptor) -> Result<Arc<dyn AudioHandle>> {
        let delay = self.delays.lock().unwrap().get(&sound.name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&sound.name) {
            return Err(PlaybackError::asset_load(&sound.asset_ref, "404 Not Found"));
        }

        let refuse = self.refusing.lock().unwrap().contains(&sound.name);
        let start_delay = self.start_delays.lock().unwrap().get(&sound.name).copied();
        let handle = Arc::new(MockHandle::new(sound.name.clone(), refuse, start_delay));
        self.handles.lock().unwrap().push(Arc::clone(&handle));

        Ok(handle)
    }
}

/// Built-in sound by name
pub fn sound(name: &str) -> SoundDescriptor {
    SoundCatalog::builtin()
        .find(name)
        .cloned()
        .unwrap_or_else(|| panic!("{} is not a built-in sound", name))
}

pub fn is_non_decreasing(values: &[f32]) -> bool {
    values.windows(2).all(|w| w[1] >= w[0])
}

pub fn is_non_increasing(values: &[f32]) -> bool {
    values.windows(2).all(|w| w[1] <= w[0])
}
