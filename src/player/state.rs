//! Player state management
//!
//! Contains the per-session `TransportState` that the video loop mutates in
//! response to input, plus the shared types that cross module boundaries:
//! session parameters, transport events and session outcomes.

/// Zoom never goes below this (no crop).
pub const MIN_ZOOM: f64 = 1.0;
/// Zoom change per zoom-in / zoom-out event.
pub const ZOOM_STEP: f64 = 1.0;
/// Speed used when leaving normal speed.
pub const FAST_SPEED: f64 = 2.0;
/// Normal playback speed.
pub const NORMAL_SPEED: f64 = 1.0;

/// Immutable parameters for one playback session.
///
/// Both renderers receive the same value when a session starts. Changes made
/// during the session (zoom, fast-forward) live in [`TransportState`] and on
/// the fast-forward signal; a speed change ends the session instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParameters {
    /// Timeline offset in seconds to seek to before streaming
    pub start_time: f64,
    /// Playback rate multiplier
    pub speed_factor: f64,
    /// Center-crop divisor
    pub zoom_factor: f64,
}

impl SessionParameters {
    /// Build parameters, clamping values into their valid ranges.
    pub fn new(start_time: f64, speed_factor: f64) -> Self {
        Self {
            start_time: start_time.max(0.0),
            speed_factor: if speed_factor > 0.0 {
                speed_factor
            } else {
                NORMAL_SPEED
            },
            zoom_factor: MIN_ZOOM,
        }
    }

    pub fn with_zoom(mut self, zoom_factor: f64) -> Self {
        self.zoom_factor = zoom_factor.max(MIN_ZOOM);
        self
    }
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self::new(0.0, NORMAL_SPEED)
    }
}

/// Where playback was when a session ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionPosition {
    /// Timeline position in seconds
    pub current_time: f64,
    /// Speed in effect at the end of the session
    pub speed_factor: f64,
}

/// Result of one playback session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The video ran out of frames
    Finished(SessionPosition),
    /// User skipped to the next item
    Next(SessionPosition),
    /// User went back to the previous item
    Previous(SessionPosition),
    /// User toggled speed; carries the new speed
    SpeedChanged(SessionPosition),
    /// User quit, or the session was stopped externally
    Stopped(SessionPosition),
}

impl Outcome {
    pub fn position(&self) -> SessionPosition {
        match *self {
            Outcome::Finished(p)
            | Outcome::Next(p)
            | Outcome::Previous(p)
            | Outcome::SpeedChanged(p)
            | Outcome::Stopped(p) => p,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Finished(_) => "finished",
            Outcome::Next(_) => "next",
            Outcome::Previous(_) => "previous",
            Outcome::SpeedChanged(_) => "speed_change",
            Outcome::Stopped(_) => "stop",
        }
    }
}

/// Interactive transport commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Quit,
    /// Ctrl-C while the terminal is in raw mode: quit and stop the playlist
    Interrupt,
    Previous,
    Next,
    ZoomIn,
    ZoomOut,
    FastForward,
    ToggleSpeed,
}

/// Result of processing an input event.
///
/// Returned by the transport controller to signal control flow decisions
/// to the video loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputResult {
    /// Keep playing with the (possibly updated) state
    Continue,
    /// Keep playing after moving the video stream to this position; the
    /// audio side must be told to jump as well
    Reposition(f64),
    /// End the session
    End(Outcome),
    /// End the session and every session after it
    Interrupt(Outcome),
}

/// Transport state for one session.
///
/// Owned by the video loop. Position advances one native frame at a time and
/// jumps on fast-forward.
#[derive(Debug, Clone)]
pub struct TransportState {
    /// Current timeline position in seconds
    pub current_time: f64,
    /// Center-crop divisor (>= 1.0)
    pub zoom_factor: f64,
    /// Playback rate multiplier
    pub speed_factor: f64,
    /// Seconds skipped by one fast-forward
    pub fast_forward_step: f64,
    /// Position of the last seek
    base_time: f64,
    /// Frames read since the last seek
    frames_since_base: u64,
}

impl TransportState {
    /// Default fast-forward step in seconds.
    pub const FAST_FORWARD_SECS: f64 = 10.0;

    pub fn new(params: &SessionParameters) -> Self {
        Self {
            current_time: params.start_time,
            zoom_factor: params.zoom_factor.max(MIN_ZOOM),
            speed_factor: params.speed_factor,
            fast_forward_step: Self::FAST_FORWARD_SECS,
            base_time: params.start_time,
            frames_since_base: 0,
        }
    }

    pub fn with_fast_forward_step(mut self, secs: f64) -> Self {
        self.fast_forward_step = secs;
        self
    }

    fn position(&self) -> SessionPosition {
        SessionPosition {
            current_time: self.current_time,
            speed_factor: self.speed_factor,
        }
    }

    /// Record that one frame at `native_fps` has been consumed.
    pub fn advance_frame(&mut self, native_fps: f64) {
        self.frames_since_base += 1;
        if native_fps > 0.0 {
            self.current_time = self.base_time + self.frames_since_base as f64 / native_fps;
        }
    }

    /// Move the position, e.g. after a seek.
    pub fn seek_to(&mut self, time: f64) {
        self.base_time = time.max(0.0);
        self.frames_since_base = 0;
        self.current_time = self.base_time;
    }

    pub fn zoom_in(&mut self) {
        self.zoom_factor += ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.zoom_factor = (self.zoom_factor - ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Flip between normal and fast speed.
    pub fn toggle_speed(&mut self) {
        self.speed_factor = if self.speed_factor == NORMAL_SPEED {
            FAST_SPEED
        } else {
            NORMAL_SPEED
        };
    }

    /// Session outcome for a stop that did not come from an explicit event.
    pub fn stopped(&self) -> Outcome {
        Outcome::Stopped(self.position())
    }

    /// Session outcome for running out of frames.
    pub fn finished(&self) -> Outcome {
        Outcome::Finished(self.position())
    }

    /// Apply one polled event.
    pub fn apply(&mut self, event: Option<TransportEvent>) -> InputResult {
        let Some(event) = event else {
            return InputResult::Continue;
        };

        match event {
            TransportEvent::Quit => InputResult::End(Outcome::Stopped(self.position())),
            TransportEvent::Interrupt => {
                InputResult::Interrupt(Outcome::Stopped(self.position()))
            }
            TransportEvent::Previous => InputResult::End(Outcome::Previous(self.position())),
            TransportEvent::Next => InputResult::End(Outcome::Next(self.position())),
            TransportEvent::ZoomIn => {
                self.zoom_in();
                InputResult::Continue
            }
            TransportEvent::ZoomOut => {
                self.zoom_out();
                InputResult::Continue
            }
            TransportEvent::FastForward => {
                let target = self.current_time + self.fast_forward_step;
                self.seek_to(target);
                InputResult::Reposition(target)
            }
            TransportEvent::ToggleSpeed => {
                self.toggle_speed();
                InputResult::End(Outcome::SpeedChanged(self.position()))
            }
        }
    }
}
