//! Shared fakes for the integration tests
//!
//! The fake backends record what happened in a shared timeline so tests can
//! check ordering across the video and audio threads.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::{Rgb, RgbImage};

use syncplay::media::{
    AudioBackend, AudioSink, AudioSource, AudioSpec, OutputFormat, VideoBackend, VideoSource,
};
use syncplay::player::{FrameDisplay, StatusInfo, StopSignal};
use syncplay::{PlayerError, Result};

pub const AUDIO_RATE: u32 = 1000;
pub const VIDEO_FPS: f64 = 1000.0;

/// Something observable that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Output device opened for an audio asset
    AudioOpened(PathBuf),
    /// Output device released
    AudioClosed(PathBuf),
    /// Audio read position moved: (asset, from, to)
    AudioSeek(PathBuf, f64, f64),
}

pub type Timeline = Arc<Mutex<Vec<Event>>>;

fn record(timeline: &Timeline, event: Event) {
    timeline.lock().unwrap().push(event);
}

/// Snapshot of everything recorded so far.
pub fn events(timeline: &Timeline) -> Vec<Event> {
    timeline.lock().unwrap().clone()
}

// ============================================================================
// Audio
// ============================================================================

struct FakeAudioSource {
    path: PathBuf,
    total_frames: usize,
    pos: usize,
    timeline: Timeline,
}

impl AudioSource for FakeAudioSource {
    fn spec(&self) -> AudioSpec {
        AudioSpec {
            sample_rate: AUDIO_RATE,
            channels: 1,
        }
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        let from = self.position();
        self.pos = ((secs * AUDIO_RATE as f64).round() as usize).min(self.total_frames);
        record(
            &self.timeline,
            Event::AudioSeek(self.path.clone(), from, secs),
        );
        Ok(())
    }

    fn position(&self) -> f64 {
        self.pos as f64 / AUDIO_RATE as f64
    }

    fn read_chunk(&mut self, frames: usize) -> Result<Option<Vec<f32>>> {
        if self.pos >= self.total_frames {
            return Ok(None);
        }
        let end = (self.pos + frames).min(self.total_frames);
        let chunk = vec![0.0; end - self.pos];
        self.pos = end;
        Ok(Some(chunk))
    }
}

/// Sink that takes a little wall time per write, like a real device.
struct FakeSink {
    path: PathBuf,
    timeline: Timeline,
    writes: usize,
    /// Fail the write with this (1-based) number
    fail_on_write: Option<usize>,
}

impl AudioSink for FakeSink {
    fn write(&mut self, _samples: &[f32]) -> Result<()> {
        self.writes += 1;
        if self.fail_on_write == Some(self.writes) {
            return Err(PlayerError::Device("device disconnected".to_string()));
        }
        thread::sleep(Duration::from_millis(1));
        Ok(())
    }
}

impl Drop for FakeSink {
    fn drop(&mut self) {
        record(&self.timeline, Event::AudioClosed(self.path.clone()));
    }
}

/// Audio backend serving silent assets of a fixed length.
pub struct FakeAudioBackend {
    pub timeline: Timeline,
    total_frames: usize,
    missing: HashSet<PathBuf>,
    fail_on_write: Option<usize>,
    /// Asset opened by the most recent `open_audio`, paired with its sink
    last_opened: Mutex<Option<PathBuf>>,
}

impl FakeAudioBackend {
    pub fn new(timeline: Timeline, seconds: f64) -> Self {
        Self {
            timeline,
            total_frames: (seconds * AUDIO_RATE as f64) as usize,
            missing: HashSet::new(),
            fail_on_write: None,
            last_opened: Mutex::new(None),
        }
    }

    /// Make opening `path` fail.
    pub fn with_missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.insert(path.into());
        self
    }

    /// Make every output device fail on its `n`th write.
    pub fn with_device_failure_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }
}

impl AudioBackend for FakeAudioBackend {
    fn open_audio(&self, path: &Path) -> Result<Box<dyn AudioSource>> {
        if self.missing.contains(path) {
            return Err(PlayerError::asset_open(path, "File not found"));
        }
        *self.last_opened.lock().unwrap() = Some(path.to_path_buf());
        Ok(Box::new(FakeAudioSource {
            path: path.to_path_buf(),
            total_frames: self.total_frames,
            pos: 0,
            timeline: self.timeline.clone(),
        }))
    }

    fn open_output(&self, _format: OutputFormat) -> Result<Box<dyn AudioSink>> {
        let path = self.last_opened.lock().unwrap().clone().unwrap_or_default();
        record(&self.timeline, Event::AudioOpened(path.clone()));
        Ok(Box::new(FakeSink {
            path,
            timeline: self.timeline.clone(),
            writes: 0,
            fail_on_write: self.fail_on_write,
        }))
    }
}

// ============================================================================
// Video
// ============================================================================

struct FakeVideoSource {
    frames: u32,
    next: u32,
}

impl VideoSource for FakeVideoSource {
    fn fps(&self) -> f64 {
        VIDEO_FPS
    }

    fn size(&self) -> (u32, u32) {
        (8, 6)
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        self.next = (secs * VIDEO_FPS).round() as u32;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.next >= self.frames {
            return Ok(None);
        }
        self.next += 1;
        Ok(Some(RgbImage::from_pixel(8, 6, Rgb([40, 80, 120]))))
    }
}

/// Video backend with a frame count per asset.
#[derive(Default)]
pub struct FakeVideoBackend {
    frames: HashMap<PathBuf, u32>,
}

impl FakeVideoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, path: impl Into<PathBuf>, frames: u32) -> Self {
        self.frames.insert(path.into(), frames);
        self
    }
}

impl VideoBackend for FakeVideoBackend {
    fn open_video(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
        let frames = *self
            .frames
            .get(path)
            .ok_or_else(|| PlayerError::asset_open(path, "File not found"))?;
        Ok(Box::new(FakeVideoSource { frames, next: 0 }))
    }
}

// ============================================================================
// Display
// ============================================================================

/// Stands for Ctrl-C in a key script.
pub const CTRL_C: char = '\u{3}';

fn key_event(c: char) -> KeyEvent {
    if c == CTRL_C {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    } else {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }
}

/// Display fed by a script of keys, one per poll; `None` entries and an
/// exhausted script mean no key.
#[derive(Default)]
pub struct ScriptedDisplay {
    keys: VecDeque<Option<char>>,
    pub shown: Vec<StatusInfo>,
    /// Interrupt this signal when the given number of frames has been shown
    interrupt_at: Option<(usize, StopSignal)>,
}

impl ScriptedDisplay {
    pub fn new(keys: &[Option<char>]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn interrupt_after(mut self, frames: usize, stop: StopSignal) -> Self {
        self.interrupt_at = Some((frames, stop));
        self
    }
}

impl FrameDisplay for ScriptedDisplay {
    fn show(&mut self, frame: &RgbImage, status: &StatusInfo) -> Result<()> {
        assert_eq!(frame.dimensions(), (16, 12), "frames are scaled to the display size");
        self.shown.push(status.clone());
        if let Some((frames, stop)) = &self.interrupt_at {
            if self.shown.len() == *frames {
                stop.interrupt();
            }
        }
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>> {
        Ok(self
            .keys
            .pop_front()
            .flatten()
            .map(key_event))
    }
}
