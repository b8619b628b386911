//! Player errors.

use std::path::PathBuf;

/// Errors that can end a playback session or abort startup.
///
/// None of these are retried. Asset, device and display failures abort the
/// current session and are propagated out of the playlist driver; extraction
/// failures abort startup before the first session begins.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Failed to open asset {path}: {message}")]
    AssetOpen { path: PathBuf, message: String },

    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Audio device failure: {0}")]
    Device(String),

    #[error("Failed to extract audio from {video}: {message}")]
    Extraction { video: PathBuf, message: String },

    #[error("Display failure: {0}")]
    Display(String),

    #[error("Audio thread panicked")]
    AudioThread,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    /// Build an `AssetOpen` error for `path`.
    pub fn asset_open(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::AssetOpen {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build a `Decode` error for `path`.
    pub fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build an `Extraction` error for `video`.
    pub fn extraction(video: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Extraction {
            video: video.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
