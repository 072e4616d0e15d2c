//! Asset decoding with Symphonia
//!
//! Ambient loops are short, so an asset is decoded completely up front into
//! interleaved stereo f32 and then resampled once to the device rate. The
//! output callback only copies samples.
//!
//! Every Symphonia sample type goes through the same interleaving helper;
//! only the normalization function changes per format. Mono is duplicated
//! to both channels, extra channels beyond the first two are dropped.

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Channels in every decoded buffer
pub const CHANNELS: usize = 2;

/// Fully decoded asset, interleaved stereo
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Interleaved stereo samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Convert to `target_rate`; a no-op when the rates already match
    pub fn resample(self, target_rate: u32) -> Result<Self> {
        if self.sample_rate == target_rate || self.frames() == 0 {
            return Ok(Self {
                sample_rate: target_rate,
                ..self
            });
        }

        debug!(
            "Resampling {} frames from {} Hz to {} Hz",
            self.frames(),
            self.sample_rate,
            target_rate
        );

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Cubic,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let frames = self.frames();
        let mut resampler = SincFixedIn::<f32>::new(
            f64::from(target_rate) / f64::from(self.sample_rate),
            2.0,
            params,
            frames,
            CHANNELS,
        )
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

        // Deinterleave for rubato
        let mut planar = vec![Vec::with_capacity(frames); CHANNELS];
        for frame in self.samples.chunks_exact(CHANNELS) {
            for (channel, sample) in planar.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }

        let resampled = resampler
            .process(&planar, None)
            .map_err(|e| AudioError::ResampleError(e.to_string()))?;

        // Interleave the result
        let output_frames = resampled[0].len();
        let mut samples = Vec::with_capacity(output_frames * CHANNELS);
        for frame_idx in 0..output_frames {
            for channel in &resampled {
                samples.push(channel[frame_idx]);
            }
        }

        Ok(Self {
            samples,
            sample_rate: target_rate,
        })
    }
}

/// Decode an audio file (MP3, FLAC, OGG, WAV, AAC, ...) completely
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).map_err(|source| AudioError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format_reader = probed.format;

    let track = format_reader
        .default_track()
        .ok_or_else(|| AudioError::Decode("No audio tracks found".into()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("Unknown sample rate".into()))?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_stereo_f32(decoded, &mut samples),
            // A corrupt packet is skipped, not fatal
            Err(SymphoniaError::DecodeError(e)) => warn!("Skipping packet in {}: {}", path.display(), e),
            Err(e) => return Err(e.into()),
        }
    }

    if samples.is_empty() {
        return Err(AudioError::Decode(format!(
            "{} contains no audio",
            path.display()
        )));
    }

    let audio = DecodedAudio::new(samples, sample_rate);
    debug!(
        "Decoded {} ({} Hz, {:.1}s)",
        path.display(),
        sample_rate,
        audio.duration().as_secs_f32()
    );

    Ok(audio)
}

/// Append a planar buffer to `output` as interleaved stereo f32
fn interleave_to_stereo_f32<T, F>(
    buf: &symphonia::core::audio::AudioBuffer<T>,
    normalize: F,
    output: &mut Vec<f32>,
) where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    output.reserve(buf.frames() * CHANNELS);
    for (l, r) in left.iter().zip(right) {
        output.push(normalize(*l));
        output.push(normalize(*r));
    }
}

/// Normalize any Symphonia sample format to [-1.0, 1.0]
fn append_stereo_f32(decoded: AudioBufferRef, output: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(&buf, |s| s, output),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(&buf, |s| s as f32, output),
        AudioBufferRef::S8(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i8::MAX as f32, output);
        }
        AudioBufferRef::S16(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i16::MAX as f32, output);
        }
        AudioBufferRef::S24(buf) => {
            interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 8_388_607.0, output);
        }
        AudioBufferRef::S32(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i32::MAX as f32, output);
        }
        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0, output);
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0, output);
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(
                &buf,
                |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0,
                output,
            );
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0, output);
        }
    }
}
