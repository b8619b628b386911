//! Backend wiring the system media services together.

use std::path::Path;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::media::{
    AudioBackend, AudioSink, AudioSource, CpalOutput, FfmpegVideo, OutputFormat, VideoBackend,
    VideoSource, WavSource,
};

/// WAV + cpal for audio, ffmpeg for video.
#[derive(Debug, Clone)]
pub struct SystemBackend {
    media: MediaConfig,
}

impl SystemBackend {
    pub fn new(media: MediaConfig) -> Self {
        Self { media }
    }
}

impl AudioBackend for SystemBackend {
    fn open_audio(&self, path: &Path) -> Result<Box<dyn AudioSource>> {
        Ok(Box::new(WavSource::open(path)?))
    }

    fn open_output(&self, format: OutputFormat) -> Result<Box<dyn AudioSink>> {
        Ok(Box::new(CpalOutput::open(format)?))
    }
}

impl VideoBackend for SystemBackend {
    fn open_video(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
        Ok(Box::new(FfmpegVideo::open(
            &self.media.ffmpeg,
            &self.media.ffprobe,
            path,
        )?))
    }
}
