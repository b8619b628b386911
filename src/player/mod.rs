//! Playlist player with synchronized audio
//!
//! Plays a list of videos, each with a standalone audio track streamed on a
//! separate thread, under interactive transport control.
//!
//! # Architecture
//!
//! The player is organized into submodules:
//! - `state`: TransportState and shared types (SessionParameters, Outcome, TransportEvent)
//! - `signals`: Stop and fast-forward signals shared by the two renderer threads
//! - `input/`: Keyboard input handling
//! - `playback/`: Frame pacing and center-crop zoom
//! - `render/`: Display trait and the terminal display (frames, status bar)
//! - `audio`: Audio renderer thread
//! - `video`: Video renderer loop
//! - `playlist`: Playlist driver and outcome interpretation
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use syncplay::config::MediaConfig;
//! use syncplay::media::SystemBackend;
//! use syncplay::player::{Playlist, PlaylistDriver, SessionContext, TerminalDisplay};
//!
//! let playlist = Playlist::from_videos(&["video.mp4", "video2.mp4"], "wav");
//! let backend = Arc::new(SystemBackend::new(MediaConfig::default()));
//! let mut display = TerminalDisplay::open("Video", true).unwrap();
//! let ctx = SessionContext::new();
//!
//! let summary = PlaylistDriver::new(&playlist, backend.clone(), &*backend)
//!     .run(&mut display, &ctx.stop)
//!     .unwrap();
//! println!("{:?}", summary.end);
//! ```

pub mod audio;
pub(crate) mod input;
pub(crate) mod playback;
pub mod playlist;
pub mod render;
pub mod signals;
pub mod state;
pub mod video;

pub use audio::{stream_audio, AudioEnd, AudioSettings, AudioTask};
pub use playlist::{
    prepare_audio, Cursor, Playlist, PlaylistDriver, PlaylistEnd, PlaylistEntry, RunSummary,
    SessionRecord,
};
pub use render::{FrameDisplay, StatusInfo, TerminalDisplay};
pub use signals::{FastForwardSignal, SessionContext, StopSignal};
pub use state::{
    InputResult, Outcome, SessionParameters, SessionPosition, TransportEvent, TransportState,
};
pub use video::{play_video, NowPlaying, VideoSettings};
