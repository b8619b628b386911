//! syncplay CLI entry point

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use syncplay::config::parse_size;

mod commands;

/// Terminal video playlist player with synchronized audio
#[derive(Parser)]
#[command(name = "syncplay")]
#[command(version)]
#[command(about = "Play videos in the terminal with synchronized audio")]
#[command(
    long_about = "Play a playlist of videos in the terminal while each video's audio track \
plays alongside it. Missing audio tracks are extracted next to the videos with ffmpeg.

KEYS:
    q / Esc            Quit
    Ctrl-C             Stop the whole run
    a / d              Previous / next video
    w / s              Zoom in / out
    c                  Skip forward 10 seconds
    p                  Toggle 1x / 2x speed

EXAMPLES:
    syncplay                          Play video.mp4 then video2.mp4
    syncplay intro.mp4 talk.mp4       Play the given videos in order
    syncplay --size 1280x720 a.mp4    Scale frames to 1280x720 before display
    syncplay --config player.toml     Load settings from a TOML file"
)]
pub struct Cli {
    /// Videos to play in order [default: video.mp4 video2.mp4]
    #[arg(value_name = "VIDEOS")]
    pub videos: Vec<PathBuf>,

    /// Frame size after zoom scaling, as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Load settings from a TOML file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings reach stderr (the
/// terminal is busy showing video) and a log file gets `info`.
fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let default_level = if log_file.is_some() { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;
    commands::play::handle(cli.videos, cli.size, cli.config.as_deref())
}
