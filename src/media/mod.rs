//! Media services used by the renderers.
//!
//! The renderers only see the traits in this module. Each trait has one
//! system implementation:
//!
//! - [`wav`]: WAV audio decoding (`hound`)
//! - [`output`]: audio output device (`cpal` + `ringbuf`)
//! - [`ffmpeg`]: video decoding and audio extraction via `ffmpeg`/`ffprobe`
//! - [`system`]: backend bundling the above for the binary
//!
//! Tests substitute scripted implementations.

pub mod ffmpeg;
pub mod output;
pub mod system;
pub mod wav;

use std::path::Path;

use image::RgbImage;

use crate::error::Result;
use crate::player::signals::StopSignal;

pub use ffmpeg::{FfmpegExtractor, FfmpegVideo, VideoInfo};
pub use output::{CpalOutput, FormatAdapter};
pub use system::SystemBackend;
pub use wav::WavSource;

/// Native format of an audio asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Format requested from the output device.
///
/// `sample_rate` already includes the speed factor: at 2x a 44.1 kHz asset
/// is written at 88.2 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl OutputFormat {
    /// Output format for `spec` played at `speed_factor`.
    pub fn for_speed(spec: AudioSpec, speed_factor: f64) -> Self {
        Self {
            sample_rate: (spec.sample_rate as f64 * speed_factor).round() as u32,
            channels: spec.channels,
        }
    }
}

/// A seekable stream of decoded audio.
pub trait AudioSource {
    fn spec(&self) -> AudioSpec;

    /// Move the read position to `secs` seconds into the asset.
    fn seek(&mut self, secs: f64) -> Result<()>;

    /// Current read position in seconds.
    fn position(&self) -> f64;

    /// Read up to `frames` interleaved frames. `None` at end of asset.
    fn read_chunk(&mut self, frames: usize) -> Result<Option<Vec<f32>>>;
}

/// An open audio output device.
///
/// Dropping the sink releases the stream and then the device.
pub trait AudioSink {
    /// Write interleaved samples, blocking while the device queue is full.
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Wait for queued samples to play out, giving up early if `stop` is set.
    fn drain(&mut self, _stop: &StopSignal) -> Result<()> {
        Ok(())
    }
}

/// Opens audio assets and output devices.
///
/// Shared with the audio thread, so it must be `Send + Sync`. Sources and
/// sinks are created on the audio thread and never leave it.
pub trait AudioBackend: Send + Sync {
    fn open_audio(&self, path: &Path) -> Result<Box<dyn AudioSource>>;

    fn open_output(&self, format: OutputFormat) -> Result<Box<dyn AudioSink>>;
}

/// A seekable stream of decoded video frames.
pub trait VideoSource {
    /// Native frame rate.
    fn fps(&self) -> f64;

    /// Native frame size as (width, height).
    fn size(&self) -> (u32, u32);

    /// Move the read position to `secs` seconds into the asset.
    fn seek(&mut self, secs: f64) -> Result<()>;

    /// Next frame, or `None` at end of asset.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Opens video assets.
pub trait VideoBackend {
    fn open_video(&self, path: &Path) -> Result<Box<dyn VideoSource>>;
}

/// Writes a standalone audio asset extracted from a video.
pub trait AudioExtractor {
    fn extract_audio(&self, video: &Path, audio: &Path) -> Result<()>;
}
