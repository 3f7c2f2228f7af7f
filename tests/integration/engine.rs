//! Engine construction, configuration and the wall-clock scheduler.

use crate::helpers::*;
use panora::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn test_engines_are_independent() {
    let (first, first_clock) = test_engine();
    let (second, second_clock) = test_engine();

    let (mut a, _, media_a) = test_voice(&first, 2, Coordinate::new(1.0, 0.0));
    let (mut b, _, media_b) = test_voice(&second, 6, Coordinate::new(0.0, 1.0));

    a.play().unwrap();
    b.play().unwrap();
    a.pause().unwrap();
    b.pause().unwrap();

    first_clock.advance(GRACE);
    assert_eq!(media_a.pauses(), 1);
    assert_eq!(media_b.pauses(), 0);
    assert_eq!(second_clock.pending(), 1);
}

#[test]
fn test_config_from_toml_drives_voice_timing() {
    let config = PanoraConfig::from_toml_str(
        r#"
        pan_ramp_secs = 0.05
        fade_ramp_secs = 0.5
        pause_grace_secs = 2.0
        default_listen_radius = 10.0
        "#,
    )
    .unwrap();
    let (engine, clock) = test_engine_with_config(config);
    let (mut voice, sink, media) = test_voice(&engine, 2, Coordinate::new(20.0, 0.0));

    assert_eq!(voice.effective_volume(), 0.5);
    voice.play().unwrap();
    voice.pause().unwrap();
    assert_eq!(sink.last_master(), Some((0.0, 0.5)));

    clock.advance(Duration::from_secs(2));
    assert_eq!(media.pauses(), 1);
}

#[test]
fn test_invalid_config_rejected_at_build() {
    let config = PanoraConfig {
        default_listen_radius: 0.0,
        ..PanoraConfig::default()
    };
    let result = PanoraEngine::builder().config(config).build();
    assert!(result.is_err());
}

#[test]
fn test_thread_scheduler_pauses_after_grace() {
    init_tracing();
    let config = PanoraConfig {
        pause_grace_secs: 0.05,
        ..PanoraConfig::default()
    };
    let engine = PanoraEngine::builder().config(config).build().unwrap();
    let sink = RecordingSink::new(2);
    let media = MockMedia::new();
    let mut voice = engine
        .voice(media.clone(), sink, ORIGIN, Coordinate::new(1.0, 0.0))
        .unwrap();

    voice.play().unwrap();
    voice.pause().unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while media.pauses() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(media.pauses(), 1);
    assert_eq!(voice.playback_state(), PlaybackState::Paused);
}

#[test]
fn test_thread_scheduler_play_cancels_stop() {
    let config = PanoraConfig {
        pause_grace_secs: 0.1,
        ..PanoraConfig::default()
    };
    let engine = PanoraEngine::builder().config(config).build().unwrap();
    let media = MockMedia::new();
    let mut voice = engine
        .voice(media.clone(), RecordingSink::new(2), ORIGIN, Coordinate::new(1.0, 0.0))
        .unwrap();

    voice.play().unwrap();
    voice.pause().unwrap();
    voice.play().unwrap();

    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(media.pauses(), 0);
    assert_eq!(voice.playback_state(), PlaybackState::Playing);
}

#[test]
fn test_oversized_grace_rejected_at_build() {
    let config = PanoraConfig {
        pause_grace_secs: 1e20,
        ..PanoraConfig::default()
    };
    let err = PanoraEngine::builder()
        .config(config)
        .build()
        .err()
        .expect("grace period should be rejected");
    assert!(matches!(
        err,
        Error::Core(panora::core::Error::InvalidConfig(_))
    ));
}
