//! Video renderer.
//!
//! Runs one session on the calling thread: decode, zoom, show, pace, poll.
//! The transport controller is consulted once per displayed frame and its
//! decision either mutates the session in place or ends it.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::media::VideoBackend;
use crate::player::input::handle_key_event;
use crate::player::playback::{apply_zoom, frame_interval, FramePacer};
use crate::player::render::{FrameDisplay, StatusInfo};
use crate::player::signals::SessionContext;
use crate::player::state::{InputResult, Outcome, SessionParameters, TransportState};

/// Per-run video settings.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    /// Size every frame is scaled to before display
    pub display_size: (u32, u32),
    /// How long to wait for a key after each frame
    pub poll_timeout: Duration,
    /// Timeline seconds skipped per fast-forward
    pub fast_forward_step: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            display_size: (800, 600),
            poll_timeout: Duration::from_millis(1),
            fast_forward_step: TransportState::FAST_FORWARD_SECS,
        }
    }
}

/// Which playlist item a session is playing, for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub index: usize,
    pub total: usize,
}

impl NowPlaying {
    fn status(&self, state: &TransportState) -> StatusInfo {
        StatusInfo {
            title: self.title.clone(),
            index: self.index,
            total: self.total,
            current_time: state.current_time,
            speed_factor: state.speed_factor,
            zoom_factor: state.zoom_factor,
        }
    }
}

/// Play `path` until the video ends, the user ends the session, or the
/// stop signal is set.
///
/// The stop signal is set whenever this returns an outcome, so the audio
/// side of the session winds down with it.
pub fn play_video(
    backend: &dyn VideoBackend,
    display: &mut dyn FrameDisplay,
    path: &Path,
    ctx: &SessionContext,
    params: &SessionParameters,
    settings: &VideoSettings,
    now_playing: &NowPlaying,
) -> Result<Outcome> {
    let mut source = backend.open_video(path)?;
    let fps = source.fps();
    let mut state =
        TransportState::new(params).with_fast_forward_step(settings.fast_forward_step);
    let mut pacer = FramePacer::new(frame_interval(fps, state.speed_factor));
    debug!(
        "Video {} at {:.3} fps, frame interval {:?}",
        path.display(),
        fps,
        pacer.interval()
    );

    source.seek(params.start_time)?;
    info!(
        "Video started: {} at {:.3}s, speed {}x",
        path.display(),
        params.start_time,
        params.speed_factor
    );

    while !ctx.stop.is_set() {
        let Some(frame) = source.next_frame()? else {
            ctx.stop.set();
            return Ok(state.finished());
        };
        state.advance_frame(fps);

        let frame = apply_zoom(&frame, state.zoom_factor, settings.display_size);
        display.show(&frame, &now_playing.status(&state))?;
        pacer.wait();

        let event = display
            .poll_key(settings.poll_timeout)?
            .and_then(handle_key_event);
        match state.apply(event) {
            InputResult::Continue => {}
            InputResult::Reposition(target) => {
                debug!("Video fast-forward to {:.3}s", target);
                source.seek(target)?;
                ctx.fast_forward.request();
                pacer.reset();
            }
            InputResult::End(outcome) => {
                ctx.stop.set();
                return Ok(outcome);
            }
            InputResult::Interrupt(outcome) => {
                info!("Interrupt key received");
                ctx.stop.interrupt();
                return Ok(outcome);
            }
        }
    }

    Ok(state.stopped())
}
