//! CPAL-based output handle (one audio thread per loaded sound)

use crate::decode::{DecodedAudio, CHANNELS};
use crate::error::{AudioError, Result};
use ambience_playback::{AudioHandle, PlaybackError};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// Default output device and the stream configuration it prefers
pub struct OutputDevice {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
}

impl OutputDevice {
    /// Open the system's default output device
    ///
    /// # Errors
    /// Returns an error if no audio device is found or configuration fails
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate();
        let config = supported.config();

        Ok(Self {
            device,
            config,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

/// Commands sent to the audio thread
enum OutputCommand {
    /// Build the stream if needed and start it
    Start {
        reply: oneshot::Sender<Result<()>>,
    },
    /// Pause the stream
    Pause,
    /// Shutdown the audio thread
    Shutdown,
}

/// State shared between the handle and the real-time callback
struct SharedState {
    /// Interleaved stereo at the device rate
    samples: Vec<f32>,
    /// Next frame to play
    position: AtomicUsize,
    /// f32 bits of the volume (0.0 to 1.0)
    volume: AtomicU32,
    paused: AtomicBool,
    looping: AtomicBool,
}

impl SharedState {
    fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: AtomicUsize::new(0),
            volume: AtomicU32::new(1.0_f32.to_bits()),
            paused: AtomicBool::new(true),
            looping: AtomicBool::new(false),
        }
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }
}

/// One decoded sound attached to the output device
///
/// A dedicated thread owns the CPAL `Stream`, which is not `Send` on every
/// platform. The handle talks to it over a channel; volume, pause and loop
/// flags are atomics read directly by the audio callback.
pub struct CpalHandle {
    name: String,
    commands: Sender<OutputCommand>,
    state: Arc<SharedState>,
    sample_rate: u32,
}

impl CpalHandle {
    /// Attach `audio` to `device`, resampling it to the device rate
    ///
    /// The handle starts paused; nothing is sent to the device until
    /// [`AudioHandle::play`].
    pub fn new(name: impl Into<String>, device: OutputDevice, audio: DecodedAudio) -> Result<Self> {
        let name = name.into();
        let sample_rate = device.sample_rate();
        let audio = audio.resample(sample_rate)?;

        let state = Arc::new(SharedState::new(audio.into_samples()));
        let (commands, command_rx) = bounded::<OutputCommand>(32);

        let thread_state = Arc::clone(&state);
        thread::Builder::new()
            .name(format!("ambience-output-{}", name))
            .spawn(move || run_output_thread(device, thread_state, command_rx))
            .map_err(|e| AudioError::StreamBuildError(format!("cannot spawn output thread: {}", e)))?;

        debug!("Opened output for {} at {} Hz", name, sample_rate);

        Ok(Self {
            name,
            commands,
            state,
            sample_rate,
        })
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start_error(&self, error: AudioError) -> PlaybackError {
        PlaybackError::playback_start(&self.name, error.to_string())
    }
}

#[async_trait]
impl AudioHandle for CpalHandle {
    fn set_looping(&self, looping: bool) {
        self.state.looping.store(looping, Ordering::Relaxed);
    }

    fn set_volume(&self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.state.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn volume(&self) -> f32 {
        self.state.volume()
    }

    async fn play(&self) -> ambience_playback::Result<()> {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(OutputCommand::Start { reply })
            .map_err(|_| self.start_error(AudioError::OutputClosed))?;

        match response.await {
            Ok(result) => result.map_err(|e| self.start_error(e)),
            Err(_) => Err(self.start_error(AudioError::OutputClosed)),
        }
    }

    fn pause(&self) {
        self.state.paused.store(true, Ordering::SeqCst);

        if self.commands.try_send(OutputCommand::Pause).is_err() {
            debug!("Output thread for {} did not take pause", self.name);
        }
    }

    fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }
}

impl Drop for CpalHandle {
    fn drop(&mut self) {
        // The thread also exits once the channel disconnects
        let _ = self.commands.try_send(OutputCommand::Shutdown);
    }
}

/// Audio thread main loop
///
/// Owns the CPAL stream for the lifetime of the handle.
fn run_output_thread(
    device: OutputDevice,
    state: Arc<SharedState>,
    commands: Receiver<OutputCommand>,
) {
    let mut stream: Option<Stream> = None;

    while let Ok(command) = commands.recv() {
        match command {
            OutputCommand::Start { reply } => {
                let result = start_stream(&device, &state, &mut stream);
                if result.is_err() {
                    state.paused.store(true, Ordering::SeqCst);
                }
                let _ = reply.send(result);
            }
            OutputCommand::Pause => {
                // Re-assert after a Start that was queued before the pause
                state.paused.store(true, Ordering::SeqCst);
                if let Some(s) = &stream {
                    if let Err(e) = s.pause() {
                        warn!("Failed to pause output stream: {}", e);
                    }
                }
            }
            OutputCommand::Shutdown => break,
        }
    }
}

fn start_stream(
    device: &OutputDevice,
    state: &Arc<SharedState>,
    stream: &mut Option<Stream>,
) -> Result<()> {
    if stream.is_none() {
        let callback_state = Arc::clone(state);
        let channels = usize::from(device.channels());

        let built = device.device.build_output_stream(
            &device.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                fill_output(data, channels, &callback_state);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;
        *stream = Some(built);
    }

    state.paused.store(false, Ordering::SeqCst);
    if let Some(s) = stream.as_ref() {
        s.play()?;
    }

    Ok(())
}

/// Audio callback body (runs in the real-time audio thread)
///
/// Maps the stereo source onto `channels` output channels: mono devices get
/// the downmix, channels beyond the second stay silent.
fn fill_output(output: &mut [f32], channels: usize, state: &SharedState) {
    let total_frames = state.samples.len() / CHANNELS;

    if channels == 0 || total_frames == 0 || state.paused.load(Ordering::Relaxed) {
        output.fill(0.0);
        return;
    }

    let volume = state.volume();
    let looping = state.looping.load(Ordering::Relaxed);
    let mut frame = state.position.load(Ordering::Relaxed);

    for out in output.chunks_mut(channels) {
        if frame >= total_frames {
            if looping {
                frame = 0;
            } else {
                out.fill(0.0);
                continue;
            }
        }

        let left = state.samples[frame * CHANNELS] * volume;
        let right = state.samples[frame * CHANNELS + 1] * volume;

        if let [mono] = out {
            *mono = (left + right) * 0.5;
        } else {
            out[0] = left;
            out[1] = right;
            out[2..].fill(0.0);
        }

        frame += 1;
    }

    if frame >= total_frames && !looping {
        // Reached the end; a finished sound reports paused
        state.paused.store(true, Ordering::SeqCst);
    }
    state.position.store(frame, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_state(samples: Vec<f32>) -> SharedState {
        let state = SharedState::new(samples);
        state.paused.store(false, Ordering::SeqCst);
        state
    }

    #[test]
    fn paused_output_is_silent() {
        let state = SharedState::new(vec![0.5; 8]);
        let mut output = vec![1.0; 8];

        fill_output(&mut output, 2, &state);
        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(state.position.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn volume_scales_samples() {
        let state = playing_state(vec![1.0, -1.0, 0.5, -0.5]);
        state.volume.store(0.5_f32.to_bits(), Ordering::Relaxed);
        let mut output = vec![0.0; 4];

        fill_output(&mut output, 2, &state);
        assert_eq!(output, vec![0.5, -0.5, 0.25, -0.25]);
    }

    #[test]
    fn looping_wraps_to_start() {
        let state = playing_state(vec![0.1, 0.1, 0.2, 0.2]);
        state.looping.store(true, Ordering::Relaxed);
        let mut output = vec![0.0; 10];

        fill_output(&mut output, 2, &state);
        assert_eq!(output, vec![0.1, 0.1, 0.2, 0.2, 0.1, 0.1, 0.2, 0.2, 0.1, 0.1]);
        assert!(!state.paused.load(Ordering::SeqCst));
        assert_eq!(state.position.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn end_without_loop_pauses() {
        let state = playing_state(vec![0.3, 0.3]);
        let mut output = vec![1.0; 6];

        fill_output(&mut output, 2, &state);
        assert_eq!(output, vec![0.3, 0.3, 0.0, 0.0, 0.0, 0.0]);
        assert!(state.paused.load(Ordering::SeqCst));
    }

    #[test]
    fn mono_device_gets_downmix() {
        let state = playing_state(vec![1.0, 0.0, 0.5, 0.5]);
        let mut output = vec![0.0; 2];

        fill_output(&mut output, 1, &state);
        assert_eq!(output, vec![0.5, 0.5]);
    }

    #[test]
    fn surround_device_uses_front_pair() {
        let state = playing_state(vec![0.2, 0.4]);
        let mut output = vec![1.0; 4];

        fill_output(&mut output, 4, &state);
        assert_eq!(output, vec![0.2, 0.4, 0.0, 0.0]);
    }

    #[test]
    fn create_handle_on_default_device() {
        // Skip in headless environments
        let Ok(device) = OutputDevice::open_default() else {
            return;
        };

        let audio = DecodedAudio::new(vec![0.0; 4800 * 2], 48000);
        let handle = CpalHandle::new("Silence", device, audio).unwrap();

        assert!(handle.is_paused());
        handle.set_volume(2.0);
        assert_eq!(handle.volume(), 1.0);
    }
}
