//! Playback engine - core orchestration
//!
//! Owns the single active audio handle, the volume target, and the one fade
//! allowed to write volume at any time.
//!
//! Every operation is async and may suspend while an asset loads, while the
//! output starts, or between fade steps. Operations never queue: a newer
//! `play`/`stop` bumps the transport epoch and cancels the active fade, and
//! an older operation that resumes with a stale epoch gives up. Volume
//! writes re-check their fade's token under the state lock, so a cancelled
//! fade cannot write after its replacement has started.

use crate::{
    catalog::SoundDescriptor,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    fade::{FadeHandle, FadeOutcome, FadePlan},
    output::{AudioBackend, AudioHandle},
    types::{EngineConfig, PlaybackStatus},
    volume::Volume,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle and sound are stored together so one is never set without the other
struct ActiveSound {
    sound: SoundDescriptor,
    handle: Arc<dyn AudioHandle>,

    // Set once a play/stop starts fading this handle out for release
    releasing: bool,
}

struct ActiveFade {
    id: u64,
    token: CancellationToken,
}

struct EngineState {
    current: Option<ActiveSound>,
    volume: Volume,
    active_fade: Option<ActiveFade>,
    epoch: u64,
    next_fade_id: u64,
}

impl EngineState {
    fn cancel_fade(&mut self) {
        if let Some(fade) = self.active_fade.take() {
            fade.token.cancel();
        }
    }

    /// Supersede any in-flight play/stop
    fn begin_transport(&mut self) -> u64 {
        self.cancel_fade();
        self.epoch += 1;
        self.epoch
    }

    fn is_current(&self, handle: &Arc<dyn AudioHandle>) -> bool {
        self.current
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.handle, handle))
    }
}

struct EngineInner {
    backend: Arc<dyn AudioBackend>,
    config: EngineConfig,
    state: Mutex<EngineState>,
    events: broadcast::Sender<PlaybackEvent>,
}

/// A fade started by the engine
struct RunningFade {
    id: u64,
    fade: FadeHandle,
}

impl RunningFade {
    /// Wait for the fade and free the fade slot if it is still ours
    async fn finish(self, inner: &EngineInner) -> FadeOutcome {
        let outcome = self.fade.finished().await;

        let mut state = inner.lock_state();
        if state
            .active_fade
            .as_ref()
            .is_some_and(|active| active.id == self.id)
        {
            state.active_fade = None;
        }

        outcome
    }
}

impl EngineInner {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Cancel the active fade and start a new one on `handle`
    fn start_fade(
        self: &Arc<Self>,
        state: &mut EngineState,
        handle: Arc<dyn AudioHandle>,
        target: f32,
        duration: Duration,
    ) -> RunningFade {
        state.cancel_fade();

        let plan = FadePlan::new(
            handle.volume(),
            target,
            duration,
            self.config.fade_steps,
            self.config.fade_curve,
        );

        let inner = Arc::clone(self);
        let fade = FadeHandle::spawn(plan, move |token, volume| {
            let _state = inner.lock_state();
            if token.is_cancelled() {
                return false;
            }
            handle.set_volume(volume);
            true
        });

        let id = state.next_fade_id;
        state.next_fade_id += 1;
        state.active_fade = Some(ActiveFade {
            id,
            token: fade.canceller(),
        });

        RunningFade { id, fade }
    }

    /// Pause and drop the current handle
    fn release_current(&self, state: &mut EngineState) {
        if let Some(active) = state.current.take() {
            active.handle.pause();
            info!("Stopped ambient sound {}", active.sound.name);
            self.emit(PlaybackEvent::Stopped {
                sound: active.sound,
            });
        }
    }

    async fn load(&self, sound: &SoundDescriptor) -> Result<Arc<dyn AudioHandle>> {
        let timeout = self.config.load_timeout();

        match tokio::time::timeout(timeout, self.backend.load(sound)).await {
            Ok(result) => result,
            Err(_) => Err(PlaybackError::asset_load(
                &sound.asset_ref,
                format!("load timed out after {:?}", timeout),
            )),
        }
    }

    /// Report a failed play and make sure nothing of it is left behind
    ///
    /// A failure of a play that a newer play/stop already superseded is only
    /// logged. The newer operation owns the transport and its fade-out of
    /// the failed handle is left running.
    fn abandon(
        &self,
        sound: &SoundDescriptor,
        error: &PlaybackError,
        epoch: u64,
        handle: Option<&Arc<dyn AudioHandle>>,
    ) {
        if let Some(handle) = handle {
            handle.pause();
        }

        let mut state = self.lock_state();
        if state.epoch != epoch {
            debug!("Superseded {} failed: {}", sound.name, error);
            return;
        }

        warn!("Ambient sound {} failed: {}", sound.name, error);

        if let Some(handle) = handle {
            if state.is_current(handle) {
                state.cancel_fade();
                state.current = None;
            }
        }

        self.emit(PlaybackEvent::Error {
            sound: sound.clone(),
            message: error.to_string(),
        });
    }
}

/// Ambient sound playback engine
///
/// Cheap to clone; every clone drives the same engine. Construct one at
/// start-up and hand clones to each UI surface.
///
/// Guarantees:
/// - At most one audio handle is alive at a time
/// - Transitions fade out the old sound before the new one fades in
/// - The volume target stays within [0.0, 1.0]
/// - Load and start failures leave nothing playing and are never returned
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
}

impl PlaybackEngine {
    /// Create a new playback engine on top of a platform backend
    pub fn new(backend: Arc<dyn AudioBackend>, config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let state = EngineState {
            current: None,
            volume: Volume::new(config.initial_volume),
            active_fade: None,
            epoch: 0,
            next_fade_id: 0,
        };

        Self {
            inner: Arc::new(EngineInner {
                backend,
                config,
                state: Mutex::new(state),
                events,
            }),
        }
    }

    // ===== Playback Control =====

    /// Play `sound`, crossfading away from whatever is playing
    ///
    /// Re-playing the sound that is already audible is a no-op. Failures are
    /// logged and published as [`PlaybackEvent::Error`]; afterwards nothing
    /// is playing.
    pub async fn play(&self, sound: &SoundDescriptor) {
        let inner = &self.inner;

        let (epoch, fade_out) = {
            let mut state = inner.lock_state();

            if let Some(active) = &state.current {
                if active.sound.name == sound.name
                    && !active.releasing
                    && !active.handle.is_paused()
                {
                    debug!("{} is already playing", sound.name);
                    return;
                }
            }

            let epoch = state.begin_transport();
            let outgoing = state.current.as_mut().map(|active| {
                active.releasing = true;
                Arc::clone(&active.handle)
            });
            let fade_out = outgoing.map(|handle| {
                inner.start_fade(&mut state, handle, 0.0, inner.config.fade_duration())
            });

            (epoch, fade_out)
        };

        // Fade out and release the previous sound
        if let Some(fade) = fade_out {
            if fade.finish(inner).await == FadeOutcome::Cancelled {
                debug!("Switch to {} superseded during fade-out", sound.name);
                return;
            }

            let mut state = inner.lock_state();
            if state.epoch != epoch {
                return;
            }
            inner.release_current(&mut state);
        }

        // Load the new sound
        info!("Loading ambient sound {} ({})", sound.name, sound.asset_ref);
        inner.emit(PlaybackEvent::Loading {
            sound: sound.clone(),
        });

        let handle = match inner.load(sound).await {
            Ok(handle) => handle,
            Err(e) => {
                inner.abandon(sound, &e, epoch, None);
                return;
            }
        };

        handle.set_looping(true);
        handle.set_volume(0.0);

        {
            let mut state = inner.lock_state();
            if state.epoch != epoch {
                debug!("Discarding {}: superseded while loading", sound.name);
                handle.pause();
                return;
            }

            state.current = Some(ActiveSound {
                sound: sound.clone(),
                handle: Arc::clone(&handle),
                releasing: false,
            });
        }

        if let Err(e) = handle.play().await {
            inner.abandon(sound, &e, epoch, Some(&handle));
            return;
        }

        // Fade in to the current target
        let fade_in = {
            let mut state = inner.lock_state();
            if state.epoch != epoch {
                // A newer operation owns the handle; if it already let go, silence it
                if !state.is_current(&handle) {
                    handle.pause();
                }
                return;
            }

            let target = state.volume.level();
            info!("Playing ambient sound {} (volume {:.2})", sound.name, target);
            inner.emit(PlaybackEvent::Started {
                sound: sound.clone(),
            });

            inner.start_fade(&mut state, handle, target, inner.config.fade_duration())
        };

        if fade_in.finish(inner).await == FadeOutcome::Cancelled {
            debug!("Fade-in of {} superseded", sound.name);
        }
    }

    /// Fade out and release the active sound
    ///
    /// No-op when nothing is playing, apart from discarding a load that is
    /// still in flight.
    pub async fn stop(&self) {
        let inner = &self.inner;

        let (epoch, fade_out) = {
            let mut state = inner.lock_state();
            let epoch = state.begin_transport();

            let Some(active) = state.current.as_mut() else {
                debug!("Stop requested with nothing playing");
                return;
            };
            active.releasing = true;
            let handle = Arc::clone(&active.handle);

            let fade_out = inner.start_fade(&mut state, handle, 0.0, inner.config.fade_duration());
            (epoch, fade_out)
        };

        if fade_out.finish(inner).await == FadeOutcome::Cancelled {
            debug!("Stop superseded during fade-out");
            return;
        }

        let mut state = inner.lock_state();
        if state.epoch == epoch {
            inner.release_current(&mut state);
        }
    }

    // ===== Volume =====

    /// Set the volume target (clamped to 0.0-1.0)
    ///
    /// A playing sound ducks to silence and fades back up to the new target.
    /// While nothing is playing, or while the sound is being faded out by a
    /// play/stop, only the target changes; the next fade-in uses it.
    ///
    /// A play/stop fade-out in progress is never interrupted.
    pub async fn set_volume(&self, level: f32) {
        let inner = &self.inner;

        let (handle, fade_down) = {
            let mut state = inner.lock_state();
            state.volume.set_level(level);
            let target = state.volume.level();

            debug!("Volume target set to {:.2}", target);
            inner.emit(PlaybackEvent::VolumeChanged { volume: target });

            let handle = match state.current.as_ref() {
                Some(active) if !active.releasing && !active.handle.is_paused() => {
                    Arc::clone(&active.handle)
                }
                _ => return,
            };

            let fade_down =
                inner.start_fade(&mut state, Arc::clone(&handle), 0.0, inner.config.duck_duration());
            (handle, fade_down)
        };

        if fade_down.finish(inner).await == FadeOutcome::Cancelled {
            return;
        }

        let fade_up = {
            let mut state = inner.lock_state();

            // Someone else started a fade or released the handle in between
            let still_ours = state.active_fade.is_none()
                && state
                    .current
                    .as_ref()
                    .is_some_and(|active| Arc::ptr_eq(&active.handle, &handle) && !active.releasing);
            if !still_ours {
                return;
            }

            let target = state.volume.level();
            inner.start_fade(&mut state, handle, target, inner.config.duck_duration())
        };

        fade_up.finish(inner).await;
    }

    /// Volume target (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.inner.lock_state().volume.level()
    }

    // ===== State Queries =====

    /// True if a handle is active and producing audio
    pub fn is_playing(&self) -> bool {
        self.inner
            .lock_state()
            .current
            .as_ref()
            .is_some_and(|active| !active.handle.is_paused())
    }

    /// Sound attached to the active handle
    pub fn current_sound(&self) -> Option<SoundDescriptor> {
        self.inner
            .lock_state()
            .current
            .as_ref()
            .map(|active| active.sound.clone())
    }

    /// Consistent snapshot of sound, transport and volume
    pub fn status(&self) -> PlaybackStatus {
        let state = self.inner.lock_state();

        PlaybackStatus {
            sound: state.current.as_ref().map(|active| active.sound.clone()),
            playing: state
                .current
                .as_ref()
                .is_some_and(|active| !active.handle.is_paused()),
            volume: state.volume.level(),
        }
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }
}
