//! Integration tests for the playlist driver
//!
//! These run real audio threads and the real video loop against scripted
//! backends and a scripted display.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use syncplay::player::{
    AudioSettings, Outcome, Playlist, PlaylistDriver, PlaylistEnd, RunSummary, StopSignal,
    VideoSettings,
};
use syncplay::{PlayerError, Result};

use crate::helpers::{
    events, Event, FakeAudioBackend, FakeVideoBackend, ScriptedDisplay, Timeline, CTRL_C,
};

fn timeline() -> Timeline {
    Arc::new(Mutex::new(Vec::new()))
}

fn run(
    videos: &[&str],
    video: &FakeVideoBackend,
    audio: Arc<FakeAudioBackend>,
    display: &mut ScriptedDisplay,
    stop: &StopSignal,
) -> Result<RunSummary> {
    let playlist = Playlist::from_videos(videos, "wav");
    PlaylistDriver::new(&playlist, audio, video)
        .with_audio_settings(AudioSettings {
            chunk_frames: 100,
            fast_forward_step: 10.0,
        })
        .with_video_settings(VideoSettings {
            display_size: (16, 12),
            ..VideoSettings::default()
        })
        .run(display, stop)
}

fn indices(summary: &RunSummary) -> Vec<usize> {
    summary.sessions.iter().map(|s| s.index).collect()
}

// ============================================================================
// Outcome Interpretation Tests
// ============================================================================

#[test]
fn two_videos_play_in_order_then_finish() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 10)
        .with_video("b.mp4", 10);
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 0.3));
    let mut display = ScriptedDisplay::new(&[]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();

    assert_eq!(summary.end, PlaylistEnd::AllFinished);
    assert_eq!(indices(&summary), vec![0, 1]);
    assert!(summary
        .sessions
        .iter()
        .all(|s| matches!(s.outcome, Outcome::Finished(_))));
    assert_eq!(display.shown.len(), 20);
}

#[test]
fn next_skips_to_following_video_from_start() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 50)
        .with_video("b.mp4", 5);
    let audio = Arc::new(FakeAudioBackend::new(tl, 0.3));
    let mut display = ScriptedDisplay::new(&[None, Some('d')]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();

    assert_eq!(indices(&summary), vec![0, 1]);
    assert!(matches!(summary.sessions[0].outcome, Outcome::Next(_)));
    assert_eq!(summary.sessions[1].params.start_time, 0.0);
    assert_eq!(display.shown.len(), 2 + 5);
}

#[test]
fn previous_from_first_video_ends_playlist() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 50)
        .with_video("b.mp4", 50);
    let audio = Arc::new(FakeAudioBackend::new(tl, 0.3));
    let mut display = ScriptedDisplay::new(&[Some('a')]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();

    assert_eq!(summary.end, PlaylistEnd::AllFinished);
    assert_eq!(indices(&summary), vec![0]);
    assert!(matches!(summary.sessions[0].outcome, Outcome::Previous(_)));
}

#[test]
fn previous_returns_to_earlier_video() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 3)
        .with_video("b.mp4", 50);
    let audio = Arc::new(FakeAudioBackend::new(tl, 0.3));
    // a plays out (3 polls), then b goes back once
    let mut display = ScriptedDisplay::new(&[None, None, None, Some('a')]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();

    assert_eq!(indices(&summary), vec![0, 1, 0, 1]);
    assert_eq!(summary.end, PlaylistEnd::AllFinished);
}

#[test]
fn quit_stops_playlist() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 50)
        .with_video("b.mp4", 50);
    let audio = Arc::new(FakeAudioBackend::new(tl, 0.3));
    let mut display = ScriptedDisplay::new(&[None, Some('q')]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();

    assert_eq!(summary.end, PlaylistEnd::Stopped);
    assert_eq!(indices(&summary), vec![0]);
}

#[test]
fn speed_change_resumes_same_video_at_current_time() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 20)
        .with_video("b.mp4", 4);
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 0.3));
    let mut display = ScriptedDisplay::new(&[None, None, Some('p')]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();

    assert_eq!(indices(&summary), vec![0, 0, 1]);
    let changed = match summary.sessions[0].outcome {
        Outcome::SpeedChanged(p) => p,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(changed.speed_factor, 2.0);

    let resumed = summary.sessions[1].params;
    assert_eq!(resumed.start_time, changed.current_time);
    assert_eq!(resumed.speed_factor, 2.0);
    assert_eq!(resumed.zoom_factor, 1.0);

    // Speed carries over to the next video
    assert_eq!(summary.sessions[2].params.speed_factor, 2.0);

    // The resumed audio session seeks to the same position
    assert!(events(&tl).contains(&Event::AudioSeek(
        PathBuf::from("a.wav"),
        0.0,
        changed.current_time
    )));
}

// ============================================================================
// Synchronization Tests
// ============================================================================

#[test]
fn audio_sessions_never_overlap() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 30)
        .with_video("b.mp4", 10);
    // Audio outlasts each video, so every session must stop it
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 60.0));
    let mut display = ScriptedDisplay::new(&[None, None, Some('p')]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();
    assert_eq!(summary.sessions.len(), 3);

    let lifecycle: Vec<Event> = events(&tl)
        .into_iter()
        .filter(|e| !matches!(e, Event::AudioSeek(..)))
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            Event::AudioOpened(PathBuf::from("a.wav")),
            Event::AudioClosed(PathBuf::from("a.wav")),
            Event::AudioOpened(PathBuf::from("a.wav")),
            Event::AudioClosed(PathBuf::from("a.wav")),
            Event::AudioOpened(PathBuf::from("b.wav")),
            Event::AudioClosed(PathBuf::from("b.wav")),
        ]
    );
}

#[test]
fn fast_forward_moves_audio_ten_seconds() {
    let tl = timeline();
    let video = FakeVideoBackend::new().with_video("a.mp4", 10_100);
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 60.0));
    let mut display = ScriptedDisplay::new(&[Some('c')]);

    let summary = run(&["a.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap();
    assert!(matches!(summary.sessions[0].outcome, Outcome::Finished(_)));

    let jumps: Vec<(f64, f64)> = events(&tl)
        .into_iter()
        .filter_map(|e| match e {
            Event::AudioSeek(_, from, to) => Some((from, to)),
            _ => None,
        })
        .collect();
    // Initial seek to the start, then exactly one jump
    assert_eq!(jumps.len(), 2);
    let (from, to) = jumps[1];
    assert!((to - from - 10.0).abs() < 1e-9, "jumped {}", to - from);
}

// ============================================================================
// Failure and Interrupt Tests
// ============================================================================

#[test]
fn audio_open_failure_aborts_before_video() {
    let tl = timeline();
    let video = FakeVideoBackend::new().with_video("a.mp4", 10);
    let audio = Arc::new(FakeAudioBackend::new(tl, 0.3).with_missing("a.wav"));
    let mut display = ScriptedDisplay::new(&[]);

    let err = run(&["a.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap_err();

    assert!(matches!(err, PlayerError::AssetOpen { .. }));
    assert!(display.shown.is_empty());
}

#[test]
fn video_open_failure_stops_audio() {
    let tl = timeline();
    let video = FakeVideoBackend::new();
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 60.0));
    let mut display = ScriptedDisplay::new(&[]);

    let err = run(&["a.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap_err();

    assert!(matches!(err, PlayerError::AssetOpen { .. }));
    assert_eq!(
        events(&tl).last(),
        Some(&Event::AudioClosed(PathBuf::from("a.wav")))
    );
}

#[test]
fn device_failure_ends_video_early() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 2000)
        .with_video("b.mp4", 10);
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 60.0).with_device_failure_on_write(2));
    let mut display = ScriptedDisplay::new(&[]);

    let err = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &StopSignal::new()).unwrap_err();

    assert!(matches!(err, PlayerError::Device(_)));
    assert!(
        display.shown.len() < 500,
        "video kept playing for {} frames",
        display.shown.len()
    );
    assert!(display.shown.iter().all(|s| s.index == 0));
    assert_eq!(
        events(&tl).last(),
        Some(&Event::AudioClosed(PathBuf::from("a.wav")))
    );
}

#[test]
fn ctrl_c_key_interrupts_run() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 1000)
        .with_video("b.mp4", 1000);
    let audio = Arc::new(FakeAudioBackend::new(tl, 60.0));
    let stop = StopSignal::new();
    let mut display = ScriptedDisplay::new(&[None, None, Some(CTRL_C)]);

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &stop).unwrap();

    assert_eq!(summary.end, PlaylistEnd::Interrupted);
    assert_eq!(indices(&summary), vec![0]);
    assert!(matches!(summary.sessions[0].outcome, Outcome::Stopped(_)));
    assert_eq!(display.shown.len(), 3);
    assert!(stop.is_interrupted());
}

#[test]
fn interrupt_during_playback_ends_run() {
    let tl = timeline();
    let video = FakeVideoBackend::new()
        .with_video("a.mp4", 1000)
        .with_video("b.mp4", 1000);
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 60.0));
    let stop = StopSignal::new();
    let mut display = ScriptedDisplay::new(&[]).interrupt_after(5, stop.clone());

    let summary = run(&["a.mp4", "b.mp4"], &video, audio, &mut display, &stop).unwrap();

    assert_eq!(summary.end, PlaylistEnd::Interrupted);
    assert_eq!(indices(&summary), vec![0]);
    assert!(matches!(summary.sessions[0].outcome, Outcome::Stopped(_)));
    assert_eq!(display.shown.len(), 5);
    assert_eq!(
        events(&tl).last(),
        Some(&Event::AudioClosed(PathBuf::from("a.wav")))
    );
}

#[test]
fn interrupt_before_start_plays_nothing() {
    let tl = timeline();
    let video = FakeVideoBackend::new().with_video("a.mp4", 10);
    let audio = Arc::new(FakeAudioBackend::new(tl.clone(), 0.3));
    let stop = StopSignal::new();
    stop.interrupt();
    let mut display = ScriptedDisplay::new(&[]);

    let summary = run(&["a.mp4"], &video, audio, &mut display, &stop).unwrap();

    assert_eq!(summary.end, PlaylistEnd::Interrupted);
    assert!(summary.sessions.is_empty());
    assert!(events(&tl).is_empty());
}
