//! Audio output using cpal
//!
//! The device pulls samples from a lock-free ring buffer inside the cpal
//! callback; [`CpalOutput::write`] pushes into it and blocks while it is full.
//! When the device cannot run the requested format directly, a
//! [`FormatAdapter`] converts channel count and rate on the writer side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use tracing::{debug, error, info, warn};

use crate::error::{PlayerError, Result};
use crate::media::{AudioSink, OutputFormat};
use crate::player::signals::StopSignal;

/// Sleep between attempts to push into a full queue.
const PUSH_RETRY: Duration = Duration::from_millis(2);
/// Give up when the device has not taken a sample for this long.
const STALL_TIMEOUT: Duration = Duration::from_secs(2);
/// Queue length in seconds of output audio.
const QUEUE_SECS: f64 = 0.25;

/// Audio output device with a running stream.
///
/// Drop order is explicit: the stream is stopped and released first, then
/// the device handle.
pub struct CpalOutput {
    stream: Option<Stream>,
    device: Option<Device>,
    producer: HeapProd<f32>,
    adapter: FormatAdapter,
    /// Set by the stream error callback
    error_flag: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device for `format`.
    pub fn open(format: OutputFormat) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlayerError::Device("No default output device found".to_string()))?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let (config, sample_format) = select_config(&device, format)?;
        info!(
            "Audio device {}: {} Hz, {} ch, {:?} (requested {} Hz, {} ch)",
            name,
            config.sample_rate.0,
            config.channels,
            sample_format,
            format.sample_rate,
            format.channels
        );

        let adapter = FormatAdapter::new(
            format.channels,
            format.sample_rate,
            config.channels,
            config.sample_rate.0,
        );

        let capacity = ((config.sample_rate.0 as f64 * QUEUE_SECS) as usize
            * config.channels as usize)
            .max(4096);
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();
        let error_flag = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, consumer, &error_flag),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer, &error_flag),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, consumer, &error_flag),
            other => Err(PlayerError::Device(format!(
                "Unsupported sample format {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| PlayerError::Device(format!("Failed to start stream: {}", e)))?;

        Ok(Self {
            stream: Some(stream),
            device: Some(device),
            producer,
            adapter,
            error_flag,
        })
    }

    fn check_stream(&self) -> Result<()> {
        if self.error_flag.load(Ordering::SeqCst) {
            return Err(PlayerError::Device("Audio stream reported an error".to_string()));
        }
        Ok(())
    }
}

impl AudioSink for CpalOutput {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        let converted = self.adapter.process(samples);
        let mut offset = 0;
        let mut last_progress = Instant::now();

        while offset < converted.len() {
            self.check_stream()?;
            let pushed = self.producer.push_slice(&converted[offset..]);
            if pushed > 0 {
                offset += pushed;
                last_progress = Instant::now();
                continue;
            }
            if last_progress.elapsed() > STALL_TIMEOUT {
                return Err(PlayerError::Device("Audio device stopped consuming samples".to_string()));
            }
            thread::sleep(PUSH_RETRY);
        }
        Ok(())
    }

    fn drain(&mut self, stop: &StopSignal) -> Result<()> {
        let started = Instant::now();
        while self.producer.occupied_len() > 0 && !stop.is_set() {
            self.check_stream()?;
            if started.elapsed() > STALL_TIMEOUT {
                warn!("Audio queue did not drain, dropping remaining samples");
                break;
            }
            thread::sleep(PUSH_RETRY);
        }
        Ok(())
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("Failed to pause audio stream: {}", e);
            }
            drop(stream);
        }
        drop(self.device.take());
        debug!("Audio output released");
    }
}

/// Pick a device configuration for `format`.
///
/// Prefers an exact channel/rate match in a sample format we can write,
/// otherwise falls back to the device default (the adapter converts).
fn select_config(device: &Device, format: OutputFormat) -> Result<(StreamConfig, SampleFormat)> {
    let supported = device
        .supported_output_configs()
        .map_err(|e| PlayerError::Device(format!("Failed to get device configs: {}", e)))?;

    let mut best: Option<(StreamConfig, SampleFormat)> = None;
    for range in supported {
        if range.channels() != format.channels
            || range.min_sample_rate().0 > format.sample_rate
            || range.max_sample_rate().0 < format.sample_rate
        {
            continue;
        }
        let sample_format = range.sample_format();
        if !matches!(
            sample_format,
            SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
        ) {
            continue;
        }
        let config = range
            .with_sample_rate(cpal::SampleRate(format.sample_rate))
            .config();
        let better = match &best {
            None => true,
            Some((_, current)) => *current != SampleFormat::F32 && sample_format == SampleFormat::F32,
        };
        if better {
            best = Some((config, sample_format));
        }
    }

    if let Some(found) = best {
        return Ok(found);
    }

    let default = device
        .default_output_config()
        .map_err(|e| PlayerError::Device(format!("Failed to get default config: {}", e)))?;
    debug!(
        "No exact config for {} Hz / {} ch, using device default",
        format.sample_rate, format.channels
    );
    Ok((default.config(), default.sample_format()))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut consumer: HeapCons<f32>,
    error_flag: &Arc<AtomicBool>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let error_flag = Arc::clone(error_flag);
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for sample in data.iter_mut() {
                    let value = consumer.try_pop().unwrap_or(0.0);
                    *sample = T::from_sample(value.clamp(-1.0, 1.0));
                }
            },
            move |err| {
                error!("Audio stream error: {}", err);
                error_flag.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| PlayerError::Device(format!("Failed to build output stream: {}", e)))
}

/// Converts interleaved samples between channel layouts and rates.
///
/// Channels are mapped by index (extra output channels repeat the last
/// input channel). Rates are converted by linear interpolation, keeping
/// state across calls so chunk boundaries are seamless.
#[derive(Debug, Clone)]
pub struct FormatAdapter {
    in_channels: usize,
    out_channels: usize,
    /// Input frames consumed per output frame
    step: f64,
    /// Fractional read position into `pending`, in frames
    phase: f64,
    /// Channel-mapped frames not yet fully consumed
    pending: Vec<f32>,
}

impl FormatAdapter {
    pub fn new(in_channels: u16, in_rate: u32, out_channels: u16, out_rate: u32) -> Self {
        Self {
            in_channels: in_channels.max(1) as usize,
            out_channels: out_channels.max(1) as usize,
            step: in_rate.max(1) as f64 / out_rate.max(1) as f64,
            phase: 0.0,
            pending: Vec::new(),
        }
    }

    /// True when input passes through unchanged.
    pub fn is_identity(&self) -> bool {
        self.in_channels == self.out_channels && self.step == 1.0
    }

    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.is_identity() {
            return input.to_vec();
        }

        let mapped = self.map_channels(input);
        if self.step == 1.0 {
            return mapped;
        }
        self.resample(&mapped)
    }

    fn map_channels(&self, input: &[f32]) -> Vec<f32> {
        if self.in_channels == self.out_channels {
            return input.to_vec();
        }
        let frames = input.len() / self.in_channels;
        let mut out = Vec::with_capacity(frames * self.out_channels);
        for frame in input.chunks_exact(self.in_channels) {
            for ch in 0..self.out_channels {
                out.push(frame[ch.min(self.in_channels - 1)]);
            }
        }
        out
    }

    fn resample(&mut self, mapped: &[f32]) -> Vec<f32> {
        let oc = self.out_channels;
        self.pending.extend_from_slice(mapped);
        let available = self.pending.len() / oc;

        let mut out = Vec::with_capacity(((available as f64 / self.step) as usize + 1) * oc);
        while self.phase + 1.0 < available as f64 {
            let index = self.phase as usize;
            let t = (self.phase - index as f64) as f32;
            let a = &self.pending[index * oc..(index + 1) * oc];
            let b = &self.pending[(index + 1) * oc..(index + 2) * oc];
            for ch in 0..oc {
                out.push(a[ch] + (b[ch] - a[ch]) * t);
            }
            self.phase += self.step;
        }

        let consumed = (self.phase as usize).min(available.saturating_sub(1));
        self.pending.drain(..consumed * oc);
        self.phase -= consumed as f64;
        out
    }
}
