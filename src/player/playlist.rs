//! Playlist driver.
//!
//! Runs one session per iteration and decides from its outcome which item
//! plays next and with what carry-over state. The audio thread of a session
//! is always joined before the next session starts or the driver returns.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::media::{AudioBackend, AudioExtractor, VideoBackend};
use crate::player::audio::{AudioSettings, AudioTask};
use crate::player::render::FrameDisplay;
use crate::player::signals::{SessionContext, StopSignal};
use crate::player::state::{Outcome, SessionParameters, NORMAL_SPEED};
use crate::player::video::{play_video, NowPlaying, VideoSettings};

/// A video and the standalone audio asset played alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub video: PathBuf,
    pub audio: PathBuf,
}

impl PlaylistEntry {
    /// Pair `video` with the file of the same name and `audio_extension`.
    pub fn for_video(video: impl Into<PathBuf>, audio_extension: &str) -> Self {
        let video = video.into();
        let audio = video.with_extension(audio_extension);
        Self { video, audio }
    }

    /// Display title: the video's file name.
    pub fn title(&self) -> String {
        self.video
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.video.display().to_string())
    }
}

/// Ordered list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries }
    }

    /// Build a playlist from video paths, deriving each audio path.
    pub fn from_videos<P: AsRef<Path>>(videos: &[P], audio_extension: &str) -> Self {
        Self::new(
            videos
                .iter()
                .map(|v| PlaylistEntry::for_video(v.as_ref(), audio_extension))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a signed index; `None` outside `0..len`.
    pub fn get(&self, index: i64) -> Option<&PlaylistEntry> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }
}

/// Extract the audio of every entry whose audio asset does not exist yet.
///
/// Each missing asset is extracted exactly once. Returns how many were
/// extracted. Once `stop` is interrupted the remaining entries are skipped,
/// and an extraction that fails because of the interrupt is not an error.
pub fn prepare_audio(
    playlist: &Playlist,
    extractor: &dyn AudioExtractor,
    stop: &StopSignal,
) -> Result<usize> {
    let mut extracted = 0;
    for entry in playlist.entries() {
        if stop.is_interrupted() {
            info!("Interrupted, skipping remaining audio extraction");
            break;
        }
        if entry.audio.exists() {
            debug!("Audio present: {}", entry.audio.display());
            continue;
        }
        if !entry.video.exists() {
            return Err(PlayerError::asset_open(&entry.video, "File not found"));
        }
        match extractor.extract_audio(&entry.video, &entry.audio) {
            Ok(()) => extracted += 1,
            Err(e) if stop.is_interrupted() => {
                debug!("Extraction ended by interrupt: {}", e);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(extracted)
}

/// How the playlist loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistEnd {
    /// The index left the playlist (end reached, or previous from the first item)
    AllFinished,
    /// The user quit
    Stopped,
    /// A process interrupt arrived
    Interrupted,
}

/// One completed session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionRecord {
    pub index: usize,
    pub params: SessionParameters,
    pub outcome: Outcome,
}

/// Result of a full playlist run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub end: PlaylistEnd,
    pub sessions: Vec<SessionRecord>,
}

/// Index and carry-over state between sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub index: i64,
    pub start_time: f64,
    pub speed_factor: f64,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            index: 0,
            start_time: 0.0,
            speed_factor: NORMAL_SPEED,
        }
    }
}

impl Cursor {
    /// Apply a session outcome. Returns `None` when the loop must stop.
    pub fn advance(self, outcome: &Outcome) -> Option<Self> {
        let position = outcome.position();
        let speed_factor = position.speed_factor;
        match outcome {
            Outcome::Finished(_) | Outcome::Next(_) => Some(Self {
                index: self.index + 1,
                start_time: 0.0,
                speed_factor,
            }),
            Outcome::Previous(_) => Some(Self {
                index: self.index - 1,
                start_time: 0.0,
                speed_factor,
            }),
            Outcome::SpeedChanged(_) => Some(Self {
                index: self.index,
                start_time: position.current_time,
                speed_factor,
            }),
            Outcome::Stopped(_) => None,
        }
    }
}

/// Plays a playlist session by session.
pub struct PlaylistDriver<'a> {
    playlist: &'a Playlist,
    audio_backend: Arc<dyn AudioBackend>,
    video_backend: &'a dyn VideoBackend,
    audio_settings: AudioSettings,
    video_settings: VideoSettings,
}

impl<'a> PlaylistDriver<'a> {
    pub fn new(
        playlist: &'a Playlist,
        audio_backend: Arc<dyn AudioBackend>,
        video_backend: &'a dyn VideoBackend,
    ) -> Self {
        Self {
            playlist,
            audio_backend,
            video_backend,
            audio_settings: AudioSettings::default(),
            video_settings: VideoSettings::default(),
        }
    }

    pub fn with_audio_settings(mut self, settings: AudioSettings) -> Self {
        self.audio_settings = settings;
        self
    }

    pub fn with_video_settings(mut self, settings: VideoSettings) -> Self {
        self.video_settings = settings;
        self
    }

    /// Run until the index leaves the playlist, the user quits, or `stop`
    /// is interrupted.
    ///
    /// Asset, device and display failures end the run with an error after
    /// the failing session's audio thread has been joined.
    pub fn run(&self, display: &mut dyn FrameDisplay, stop: &StopSignal) -> Result<RunSummary> {
        let ctx = SessionContext::with_stop(stop.clone());
        let mut sessions = Vec::new();
        let mut cursor = Cursor::default();

        let end = loop {
            if ctx.stop.is_interrupted() {
                break PlaylistEnd::Interrupted;
            }
            let Some(entry) = self.playlist.get(cursor.index) else {
                break PlaylistEnd::AllFinished;
            };
            let index = cursor.index as usize;

            ctx.reset();
            let params = SessionParameters::new(cursor.start_time, cursor.speed_factor);
            info!(
                "Session {}/{}: {} from {:.3}s at {}x",
                index + 1,
                self.playlist.len(),
                entry.video.display(),
                params.start_time,
                params.speed_factor
            );

            let outcome = self.run_session(display, entry, index, &ctx, params)?;
            info!("Session ended: {} at {:.3}s", outcome.name(), outcome.position().current_time);
            sessions.push(SessionRecord {
                index,
                params,
                outcome,
            });

            if ctx.stop.is_interrupted() {
                break PlaylistEnd::Interrupted;
            }
            match cursor.advance(&outcome) {
                Some(next) => cursor = next,
                None => break PlaylistEnd::Stopped,
            }
        };

        debug!("Playlist ended: {:?} after {} session(s)", end, sessions.len());
        Ok(RunSummary { end, sessions })
    }

    fn run_session(
        &self,
        display: &mut dyn FrameDisplay,
        entry: &PlaylistEntry,
        index: usize,
        ctx: &SessionContext,
        params: SessionParameters,
    ) -> Result<Outcome> {
        let audio = AudioTask::spawn(
            self.audio_backend.clone(),
            entry.audio.clone(),
            params,
            ctx.clone(),
            self.audio_settings,
        )?;

        let now_playing = NowPlaying {
            title: entry.title(),
            index,
            total: self.playlist.len(),
        };
        let video = play_video(
            self.video_backend,
            display,
            &entry.video,
            ctx,
            &params,
            &self.video_settings,
            &now_playing,
        );

        ctx.stop.set();
        let audio = audio.join();
        let outcome = video?;
        if let Err(e) = audio {
            warn!("Audio failed during {}: {}", entry.audio.display(), e);
            return Err(e);
        }
        Ok(outcome)
    }
}
