//! Player configuration.
//!
//! Every field has a built-in default, so running without a config file
//! behaves like the fixed playlist player. A TOML file may override any
//! subset of fields; missing fields keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Default playlist used when neither the command line nor a config file
/// names any videos.
pub const DEFAULT_PLAYLIST: &[&str] = &["video.mp4", "video2.mp4"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Video files to play, in order
    pub playlist: Vec<PathBuf>,
    pub display: DisplayConfig,
    pub playback: PlaybackConfig,
    pub media: MediaConfig,
}

/// Display window settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target frame width after zoom scaling
    pub width: u32,
    /// Target frame height after zoom scaling
    pub height: u32,
    /// Window title
    pub window_name: String,
    /// Input poll timeout per frame, in milliseconds
    pub poll_timeout_ms: u64,
    /// Draw the status bar below the frame
    pub show_status: bool,
}

/// Playback tuning.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Timeline seconds skipped by one fast-forward
    pub fast_forward_secs: f64,
    /// Audio frames read and written per chunk
    pub chunk_frames: usize,
}

/// External media tools and derived asset naming.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Extension of the extracted audio asset next to each video
    pub audio_extension: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playlist: DEFAULT_PLAYLIST.iter().map(PathBuf::from).collect(),
            display: DisplayConfig::default(),
            playback: PlaybackConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            window_name: "Video".to_string(),
            poll_timeout_ms: 1,
            show_status: true,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fast_forward_secs: 10.0,
            chunk_frames: 1024,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            audio_extension: "wav".to_string(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.playlist.is_empty() {
            bail!("playlist must contain at least one video");
        }
        if self.display.width == 0 || self.display.height == 0 {
            bail!(
                "display size must be non-zero, got {}x{}",
                self.display.width,
                self.display.height
            );
        }
        let ff = self.playback.fast_forward_secs;
        if ff.is_nan() || ff <= 0.0 {
            bail!("fast_forward_secs must be positive");
        }
        if self.playback.chunk_frames == 0 {
            bail!("chunk_frames must be positive");
        }
        Ok(())
    }

    /// Target display size as (width, height).
    pub fn display_size(&self) -> (u32, u32) {
        (self.display.width, self.display.height)
    }
}

/// Parse a `WIDTHxHEIGHT` size string.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", w))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", h))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok((width, height))
}
