//! Play / fade-out / pause tests on a manual clock.

use crate::helpers::*;
use approx::assert_relative_eq;
use panora::prelude::*;
use std::time::Duration;

#[test]
fn test_new_voice_is_paused_and_silent_media() {
    let (engine, clock) = test_engine();
    let (voice, _sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    assert_eq!(voice.playback_state(), PlaybackState::Paused);
    assert_eq!(media.plays(), 0);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn test_pause_fades_then_pauses_after_grace() {
    let (engine, clock) = test_engine();
    let (mut voice, sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    assert_eq!(media.plays(), 1);

    voice.pause().unwrap();
    assert_eq!(voice.playback_state(), PlaybackState::FadingOut);
    assert_eq!(sink.last_master(), Some((0.0, engine.config().fade_ramp_secs)));
    assert_eq!(voice.effective_volume(), 0.0);

    clock.advance(GRACE - Duration::from_millis(100));
    assert_eq!(media.pauses(), 0);
    assert_eq!(voice.playback_state(), PlaybackState::FadingOut);

    clock.advance(Duration::from_millis(100));
    assert_eq!(media.pauses(), 1);
    assert_eq!(voice.playback_state(), PlaybackState::Paused);
}

#[test]
fn test_play_within_grace_cancels_stop() {
    let (engine, clock) = test_engine();
    let (mut voice, sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    voice.pause().unwrap();
    clock.advance(Duration::from_secs(2));

    voice.play().unwrap();
    assert_eq!(voice.playback_state(), PlaybackState::Playing);
    let (gain, ramp) = sink.last_master().unwrap();
    assert_relative_eq!(gain, 1.0);
    assert_relative_eq!(ramp, engine.config().fade_ramp_secs);

    assert_eq!(clock.advance(Duration::from_secs(10)), 0);
    assert_eq!(media.pauses(), 0);
    assert_eq!(voice.playback_state(), PlaybackState::Playing);
}

#[test]
fn test_stale_stop_does_not_cut_second_pause_short() {
    let (engine, clock) = test_engine();
    let (mut voice, _sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    voice.pause().unwrap();
    clock.advance(Duration::from_secs(3));
    voice.play().unwrap();
    voice.pause().unwrap();

    // First pause's deadline passes.
    clock.advance(Duration::from_secs(3));
    assert_eq!(media.pauses(), 0);
    assert_eq!(voice.playback_state(), PlaybackState::FadingOut);

    clock.advance(Duration::from_secs(2));
    assert_eq!(media.pauses(), 1);
    assert_eq!(voice.playback_state(), PlaybackState::Paused);
}

#[test]
fn test_pause_when_not_playing_is_noop() {
    let (engine, clock) = test_engine();
    let (mut voice, sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));
    sink.clear();

    voice.pause().unwrap();
    assert!(sink.commands().is_empty());
    assert_eq!(clock.pending(), 0);

    voice.play().unwrap();
    voice.pause().unwrap();
    voice.pause().unwrap();
    assert_eq!(clock.pending(), 1);

    clock.advance(GRACE);
    assert_eq!(media.pauses(), 1);
}

#[test]
fn test_volume_set_while_fading_applies_on_play() {
    let (engine, clock) = test_engine();
    let (mut voice, sink, _media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    voice.pause().unwrap();
    voice.set_volume(0.4).unwrap();
    assert_eq!(sink.last_master().map(|(g, _)| g), Some(0.0));
    assert_eq!(voice.volume(), 0.4);

    clock.advance(GRACE);
    voice.set_volume(0.6).unwrap();
    assert_eq!(voice.effective_volume(), 0.0);

    voice.play().unwrap();
    assert_relative_eq!(voice.effective_volume(), 0.6);
    assert_eq!(sink.last_master().map(|(g, _)| g), Some(0.6));
}

#[test]
fn test_panning_continues_while_fading() {
    let (engine, _clock) = test_engine();
    let (mut voice, sink, _media) = test_voice(&engine, 6, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    voice.pause().unwrap();
    voice.set_source(Coordinate::new(0.0, -1.0)).unwrap();

    assert_eq!(sink.channel_gains(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    assert_eq!(sink.last_master().map(|(g, _)| g), Some(0.0));
}

#[test]
fn test_dropping_voice_cancels_pending_stop() {
    let (engine, clock) = test_engine();
    let (mut voice, _sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    voice.pause().unwrap();
    drop(voice);

    assert_eq!(clock.pending(), 0);
    assert_eq!(clock.advance(GRACE * 2), 0);
    assert_eq!(media.pauses(), 0);
}

#[test]
fn test_zero_grace_pauses_on_next_tick() {
    let config = PanoraConfig {
        pause_grace_secs: 0.0,
        ..PanoraConfig::default()
    };
    let (engine, clock) = test_engine_with_config(config);
    let (mut voice, _sink, media) = test_voice(&engine, 2, Coordinate::new(1.0, 0.0));

    voice.play().unwrap();
    voice.pause().unwrap();
    assert_eq!(voice.playback_state(), PlaybackState::FadingOut);

    clock.advance(Duration::ZERO);
    assert_eq!(media.pauses(), 1);
    assert_eq!(voice.playback_state(), PlaybackState::Paused);
}
