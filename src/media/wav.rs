//! WAV audio source.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use tracing::debug;

use crate::error::{PlayerError, Result};
use crate::media::{AudioSource, AudioSpec};

/// Decodes a WAV file into interleaved `f32` samples.
///
/// Integer formats from 8 to 32 bits are scaled into `[-1.0, 1.0)`.
pub struct WavSource {
    path: PathBuf,
    reader: WavReader<BufReader<File>>,
    spec: hound::WavSpec,
    /// Read position in frames
    position: u32,
    /// Total length in frames
    duration: u32,
}

impl WavSource {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path).map_err(|e| PlayerError::asset_open(path, e))?;
        let spec = reader.spec();
        let duration = reader.duration();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(PlayerError::asset_open(path, "WAV header has no channels or rate"));
        }

        debug!(
            "Opened {}: {} Hz, {} ch, {} bit {:?}, {} frames",
            path.display(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format,
            duration
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            spec,
            position: 0,
            duration,
        })
    }

    /// Total length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration as f64 / self.spec.sample_rate as f64
    }

    fn read_float(&mut self, wanted: usize, out: &mut Vec<f32>) -> Result<()> {
        for sample in self.reader.samples::<f32>().take(wanted) {
            out.push(sample.map_err(|e| PlayerError::decode(&self.path, e))?);
        }
        Ok(())
    }

    fn read_int(&mut self, wanted: usize, out: &mut Vec<f32>) -> Result<()> {
        let bits = self.spec.bits_per_sample.clamp(1, 32) as u32;
        let scale = 1.0 / (1u64 << (bits - 1)) as f32;
        for sample in self.reader.samples::<i32>().take(wanted) {
            let value = sample.map_err(|e| PlayerError::decode(&self.path, e))?;
            out.push(value as f32 * scale);
        }
        Ok(())
    }
}

impl AudioSource for WavSource {
    fn spec(&self) -> AudioSpec {
        AudioSpec {
            sample_rate: self.spec.sample_rate,
            channels: self.spec.channels,
        }
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        let frame = (secs.max(0.0) * self.spec.sample_rate as f64) as u64;
        let frame = frame.min(self.duration as u64) as u32;
        self.reader
            .seek(frame)
            .map_err(|e| PlayerError::decode(&self.path, e))?;
        self.position = frame;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position as f64 / self.spec.sample_rate as f64
    }

    fn read_chunk(&mut self, frames: usize) -> Result<Option<Vec<f32>>> {
        let channels = self.spec.channels as usize;
        let wanted = frames * channels;
        let mut out = Vec::with_capacity(wanted);

        match self.spec.sample_format {
            SampleFormat::Float => self.read_float(wanted, &mut out)?,
            SampleFormat::Int => self.read_int(wanted, &mut out)?,
        }

        if out.is_empty() {
            return Ok(None);
        }
        self.position = self
            .position
            .saturating_add((out.len() / channels) as u32)
            .min(self.duration);
        Ok(Some(out))
    }
}
