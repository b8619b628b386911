//! Audio renderer.
//!
//! Streams one audio asset to the output device on a dedicated thread. The
//! device runs at the asset's rate multiplied by the session speed, so a 2x
//! session plays the same samples twice as fast.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::media::{AudioBackend, AudioSink, AudioSource, OutputFormat};
use crate::player::signals::{SessionContext, StopSignal};
use crate::player::state::{SessionParameters, TransportState};

/// Tunables for the audio loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    /// Frames read and written per iteration
    pub chunk_frames: usize,
    /// Timeline seconds skipped per fast-forward request
    pub fast_forward_step: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            chunk_frames: 1024,
            fast_forward_step: TransportState::FAST_FORWARD_SECS,
        }
    }
}

/// Why the audio loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEnd {
    /// The stop signal was set
    Stopped,
    /// The asset ran out of samples
    Exhausted,
}

/// Stream `source` into `sink` until stopped or exhausted.
///
/// The read position starts at `params.start_time`. A pending fast-forward
/// request moves it forward by `settings.fast_forward_step` seconds of asset
/// time before the next chunk is read, independent of the speed factor.
pub fn stream_audio(
    source: &mut dyn AudioSource,
    sink: &mut dyn AudioSink,
    ctx: &SessionContext,
    params: &SessionParameters,
    settings: &AudioSettings,
) -> Result<AudioEnd> {
    source.seek(params.start_time)?;

    loop {
        if ctx.stop.is_set() {
            return Ok(AudioEnd::Stopped);
        }

        if ctx.fast_forward.take() {
            let target = source.position() + settings.fast_forward_step;
            debug!("Audio fast-forward to {:.3}s", target);
            source.seek(target)?;
        }

        let Some(chunk) = source.read_chunk(settings.chunk_frames)? else {
            sink.drain(&ctx.stop)?;
            return Ok(AudioEnd::Exhausted);
        };

        // Nothing reaches the device once the session is over
        if ctx.stop.is_set() {
            return Ok(AudioEnd::Stopped);
        }
        sink.write(&chunk)?;
    }
}

fn open_session(
    backend: &dyn AudioBackend,
    path: &Path,
    params: &SessionParameters,
) -> Result<(Box<dyn AudioSource>, Box<dyn AudioSink>)> {
    let source = backend.open_audio(path)?;
    let format = OutputFormat::for_speed(source.spec(), params.speed_factor);
    debug!(
        "Opening output at {} Hz, {} channel(s) for {}",
        format.sample_rate,
        format.channels,
        path.display()
    );
    let sink = backend.open_output(format)?;
    Ok((source, sink))
}

/// Handle to a running audio renderer thread.
///
/// Dropping the handle stops the thread and waits for it.
pub struct AudioTask {
    handle: Option<JoinHandle<Result<AudioEnd>>>,
    stop: StopSignal,
}

impl AudioTask {
    /// Start streaming `path` on a new thread.
    ///
    /// Returns once the asset and the output device are open, so open
    /// failures surface here rather than after video playback has begun.
    pub fn spawn(
        backend: Arc<dyn AudioBackend>,
        path: PathBuf,
        params: SessionParameters,
        ctx: SessionContext,
        settings: AudioSettings,
    ) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<()>();
        let stop = ctx.stop.clone();

        let handle = thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || -> Result<AudioEnd> {
                let (mut source, mut sink) = open_session(backend.as_ref(), &path, &params)?;
                // The receiver only goes away if spawn already gave up
                let _ = ready_tx.send(());

                info!(
                    "Audio started: {} at {:.3}s, speed {}x",
                    path.display(),
                    params.start_time,
                    params.speed_factor
                );
                let end = stream_audio(source.as_mut(), sink.as_mut(), &ctx, &params, &settings)
                    .map_err(|e| {
                        // A failed device ends the whole session, video included
                        ctx.stop.set();
                        e
                    })?;
                debug!("Audio ended ({:?}): {}", end, path.display());
                // Sink drops here: stream first, then device
                Ok(end)
            })?;

        match ready_rx.recv() {
            Ok(()) => Ok(Self {
                handle: Some(handle),
                stop,
            }),
            // Sender dropped without signalling: the open failed
            Err(_) => match handle.join() {
                Ok(Err(e)) => Err(e),
                Ok(Ok(_)) | Err(_) => Err(PlayerError::AudioThread),
            },
        }
    }

    /// Wait for the thread to finish and return how it ended.
    pub fn join(mut self) -> Result<AudioEnd> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| PlayerError::AudioThread)?,
            None => Ok(AudioEnd::Stopped),
        }
    }
}

impl Drop for AudioTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.set();
            if let Ok(Err(e)) = handle.join() {
                warn!("Audio thread failed: {}", e);
            }
        }
    }
}
