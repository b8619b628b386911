//! Video decoding and audio extraction through the `ffmpeg` command line.
//!
//! Metadata comes from `ffprobe` JSON output. Frames are streamed from a
//! single `ffmpeg` process writing raw `rgb24` to stdout; seeking restarts
//! that process at the new offset.

use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::media::{AudioExtractor, VideoSource};

/// Frame rate assumed when the container does not report one.
const FALLBACK_FPS: f64 = 30.0;

/// Stream properties read with `ffprobe`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Container duration in seconds, 0.0 if unknown
    pub duration: f64,
}

impl VideoInfo {
    fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Parse an ffprobe rate such as `30000/1001` or `25`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Extract [`VideoInfo`] from `ffprobe -print_format json -show_format -show_streams`.
pub fn parse_probe_output(json: &str) -> std::result::Result<VideoInfo, String> {
    let json: Value =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse ffprobe output: {}", e))?;

    let stream = json["streams"]
        .as_array()
        .and_then(|streams| streams.first())
        .ok_or("No video stream")?;

    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;
    if width == 0 || height == 0 {
        return Err("Video stream has no dimensions".to_string());
    }

    let fps = stream["avg_frame_rate"]
        .as_str()
        .and_then(parse_frame_rate)
        .or_else(|| stream["r_frame_rate"].as_str().and_then(parse_frame_rate))
        .unwrap_or(FALLBACK_FPS);

    let duration = json["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width,
        height,
        fps,
        duration,
    })
}

/// Read stream metadata for `path` with `ffprobe`.
pub fn probe_video(ffprobe: &Path, path: &Path) -> Result<VideoInfo> {
    if !path.exists() {
        return Err(PlayerError::asset_open(path, "File not found"));
    }

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| PlayerError::asset_open(path, tool_error(ffprobe, e)))?;

    if !output.status.success() {
        return Err(PlayerError::asset_open(path, "ffprobe could not read the file"));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
        .map_err(|message| PlayerError::asset_open(path, message))
}

fn tool_error(tool: &Path, err: std::io::Error) -> String {
    if err.kind() == ErrorKind::NotFound {
        format!("{} not found", tool.display())
    } else {
        format!("Failed to run {}: {}", tool.display(), err)
    }
}

/// Decodes video frames with an `ffmpeg` child process.
pub struct FfmpegVideo {
    ffmpeg: PathBuf,
    path: PathBuf,
    info: VideoInfo,
    process: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    /// Offset the decoder starts at on the next read
    pending_start: Option<f64>,
}

impl FfmpegVideo {
    /// Probe `path`. Decoding starts on the first read, from the beginning
    /// or from the last seek.
    pub fn open(ffmpeg: &Path, ffprobe: &Path, path: &Path) -> Result<Self> {
        let info = probe_video(ffprobe, path)?;
        info!(
            "Opened {}: {}x{} @ {:.3} fps, {:.1}s",
            path.display(),
            info.width,
            info.height,
            info.fps,
            info.duration
        );

        let video = Self {
            ffmpeg: ffmpeg.to_path_buf(),
            path: path.to_path_buf(),
            info,
            process: None,
            stdout: None,
            pending_start: Some(0.0),
        };
        Ok(video)
    }

    pub fn info(&self) -> VideoInfo {
        self.info
    }

    fn start_at(&mut self, secs: f64) -> Result<()> {
        self.stop();

        let mut process = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-ss", &format!("{:.3}", secs.max(0.0)), "-i"])
            .arg(&self.path)
            .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlayerError::asset_open(&self.path, tool_error(&self.ffmpeg, e)))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| PlayerError::asset_open(&self.path, "ffmpeg stdout unavailable"))?;

        debug!("Started decoder for {} at {:.3}s", self.path.display(), secs);
        self.stdout = Some(BufReader::with_capacity(self.info.frame_size(), stdout));
        self.process = Some(process);
        Ok(())
    }

    fn stop(&mut self) {
        self.stdout = None;
        if let Some(mut process) = self.process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}

impl VideoSource for FfmpegVideo {
    fn fps(&self) -> f64 {
        self.info.fps
    }

    fn size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        self.stop();
        self.pending_start = Some(secs);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if let Some(secs) = self.pending_start.take() {
            self.start_at(secs)?;
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buffer = vec![0u8; self.info.frame_size()];
        match stdout.read_exact(&mut buffer) {
            Ok(()) => Ok(RgbImage::from_raw(self.info.width, self.info.height, buffer)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(PlayerError::decode(&self.path, e)),
        }
    }
}

impl Drop for FfmpegVideo {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Extracts a video's audio track into a 16-bit PCM WAV file.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    ffmpeg: PathBuf,
}

impl FfmpegExtractor {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl AudioExtractor for FfmpegExtractor {
    fn extract_audio(&self, video: &Path, audio: &Path) -> Result<()> {
        if !video.exists() {
            return Err(PlayerError::extraction(video, "File not found"));
        }

        info!("Extracting audio {} -> {}", video.display(), audio.display());
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-y", "-i"])
            .arg(video)
            .args(["-vn", "-acodec", "pcm_s16le"])
            .arg(audio)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PlayerError::extraction(video, tool_error(&self.ffmpeg, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.lines().last().unwrap_or("ffmpeg failed").trim();
            // Do not leave a partial file behind; it would skip extraction next run.
            if audio.exists() {
                if let Err(e) = std::fs::remove_file(audio) {
                    warn!("Failed to remove partial {}: {}", audio.display(), e);
                }
            }
            return Err(PlayerError::extraction(video, message));
        }
        Ok(())
    }
}
