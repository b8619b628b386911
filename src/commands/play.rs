//! Play command handler

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use syncplay::media::{FfmpegExtractor, SystemBackend};
use syncplay::player::{
    prepare_audio, AudioSettings, Playlist, PlaylistDriver, PlaylistEnd, StopSignal,
    TerminalDisplay, VideoSettings,
};
use syncplay::PlayerConfig;

/// Resolve the effective configuration from defaults, an optional config
/// file and command-line overrides.
pub fn resolve_config(
    videos: Vec<PathBuf>,
    size: Option<(u32, u32)>,
    config_path: Option<&Path>,
) -> Result<PlayerConfig> {
    let mut config = match config_path {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    if !videos.is_empty() {
        config.playlist = videos;
    }
    if let Some((width, height)) = size {
        config.display.width = width;
        config.display.height = height;
    }
    config.validate()?;
    Ok(config)
}

/// Extract missing audio, then play the playlist until it ends, the user
/// quits, or the process is interrupted.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    videos: Vec<PathBuf>,
    size: Option<(u32, u32)>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(videos, size, config_path)?;
    let playlist = Playlist::from_videos(&config.playlist, &config.media.audio_extension);

    // Installed before extraction so Ctrl-C during the pre-pass is reported
    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.interrupt())
        .context("Failed to install interrupt handler")?;

    let extractor = FfmpegExtractor::new(config.media.ffmpeg.clone());
    let extracted = prepare_audio(&playlist, &extractor, &stop)?;
    if extracted > 0 {
        info!("Extracted {} audio track(s)", extracted);
    }
    if stop.is_interrupted() {
        println!("Interrupt received, stopping...");
        return Ok(());
    }

    let backend = Arc::new(SystemBackend::new(config.media.clone()));
    let audio_settings = AudioSettings {
        chunk_frames: config.playback.chunk_frames,
        fast_forward_step: config.playback.fast_forward_secs,
    };
    let video_settings = VideoSettings {
        display_size: config.display_size(),
        poll_timeout: Duration::from_millis(config.display.poll_timeout_ms),
        fast_forward_step: config.playback.fast_forward_secs,
    };

    let summary = {
        // Restore the terminal before printing anything
        let mut display =
            TerminalDisplay::open(&config.display.window_name, config.display.show_status)?;
        PlaylistDriver::new(&playlist, backend.clone(), &*backend)
            .with_audio_settings(audio_settings)
            .with_video_settings(video_settings)
            .run(&mut display, &stop)?
    };

    match summary.end {
        PlaylistEnd::Interrupted => println!("Interrupt received, stopping..."),
        PlaylistEnd::AllFinished | PlaylistEnd::Stopped => println!("all video finished"),
    }
    Ok(())
}
