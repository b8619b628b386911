//! Cross-thread session signals.
//!
//! The video thread and the audio thread share exactly two flags: the stop
//! signal and the one-shot fast-forward request. Both are cloneable handles
//! over atomics and are bundled into a [`SessionContext`] that is passed to
//! each renderer entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct StopFlags {
    /// Set when the current session should end
    session: AtomicBool,
    /// Set once by a process interrupt; never cleared
    interrupt: AtomicBool,
}

/// Tells both renderers to stop.
///
/// `clear` only resets the per-session flag. After `interrupt` the signal
/// stays set for the rest of the process, so a session started after an
/// interrupt stops immediately.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flags: Arc<StopFlags>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the current session to stop.
    pub fn set(&self) {
        self.flags.session.store(true, Ordering::SeqCst);
    }

    /// Reset the per-session flag before a new session starts.
    pub fn clear(&self) {
        self.flags.session.store(false, Ordering::SeqCst);
    }

    /// True if the session or the whole process should stop.
    pub fn is_set(&self) -> bool {
        self.flags.session.load(Ordering::SeqCst) || self.is_interrupted()
    }

    /// Stop the current session and every session after it.
    pub fn interrupt(&self) {
        self.flags.interrupt.store(true, Ordering::SeqCst);
        self.set();
    }

    pub fn is_interrupted(&self) -> bool {
        self.flags.interrupt.load(Ordering::SeqCst)
    }
}

/// One-shot request from the video side for the audio side to jump forward.
#[derive(Debug, Clone, Default)]
pub struct FastForwardSignal {
    pending: Arc<AtomicBool>,
}

impl FastForwardSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a jump. Requests made before the audio side acts are merged.
    pub fn request(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    /// Consume a pending request, returning whether one was pending.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.pending.store(false, Ordering::SeqCst);
    }
}

/// Shared signals passed to both renderers for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub stop: StopSignal,
    pub fast_forward: FastForwardSignal,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context around an existing stop signal (e.g. one shared with
    /// an interrupt handler).
    pub fn with_stop(stop: StopSignal) -> Self {
        Self {
            stop,
            fast_forward: FastForwardSignal::new(),
        }
    }

    /// Reset both signals at the start of a session.
    pub fn reset(&self) {
        self.stop.clear();
        self.fast_forward.clear();
    }
}
