//! Frame pacing for the video loop.
//!
//! Best-effort soft real-time: each frame has a deadline one interval after
//! the previous one, and the loop sleeps only for whatever part of the
//! interval processing did not already use. A frame that overruns its
//! deadline is not compensated by shortening later frames beyond one
//! interval of catch-up, so a long stall does not cause a burst.

use std::thread;
use std::time::{Duration, Instant};

/// Target interval between frames for `native_fps` played at `speed_factor`.
pub fn frame_interval(native_fps: f64, speed_factor: f64) -> Duration {
    if native_fps <= 0.0 || speed_factor <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64((1.0 / native_fps) / speed_factor)
}

/// Sleeps the remainder of each frame interval.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Forget the schedule, e.g. after a seek.
    pub fn reset(&mut self) {
        self.next_deadline = None;
    }

    /// How long to sleep at `now` to meet the current deadline, and advance
    /// the schedule.
    pub fn next_delay(&mut self, now: Instant) -> Duration {
        let deadline = match self.next_deadline {
            Some(deadline) => deadline,
            None => now + self.interval,
        };

        let delay = deadline.saturating_duration_since(now);
        // Catch up at most one interval after an overrun.
        self.next_deadline = Some(if now > deadline + self.interval {
            now + self.interval
        } else {
            deadline + self.interval
        });
        delay
    }

    /// Sleep until the current frame's deadline.
    pub fn wait(&mut self) {
        let delay = self.next_delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}
