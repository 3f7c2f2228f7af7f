//! Test helpers and fixtures for Panora integration tests
//!
//! - [`RecordingSink`]: an [`OutputSink`] that logs every command it receives
//! - [`MockMedia`]: a [`MediaSource`] that counts play/pause calls
//! - [`test_engine`]: an engine on a [`ManualScheduler`] so grace timers are deterministic
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): exact gains
//! - `GAIN_EPSILON` (1e-5): pan law cosines
//! - `PERCEPTUAL_EPSILON` (0.001): rendered signal levels
//! - `SILENCE_THRESHOLD` (0.0001): silence detection

#![allow(dead_code)]


use panora::prelude::*;
use panora::ManualScheduler;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Default pause grace period.
pub const GRACE: Duration = Duration::from_secs(5);

pub const ORIGIN: Coordinate = Coordinate::new(0.0, 0.0);

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkCommand {
    Channel { channel: usize, gain: f32, ramp: f32 },
    Master { gain: f32, ramp: f32 },
}

/// Sink that records commands into a log shared by all clones.
#[derive(Clone)]
pub struct RecordingSink {
    channels: usize,
    log: Arc<Mutex<Vec<SinkCommand>>>,
}

impl RecordingSink {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn commands(&self) -> Vec<SinkCommand> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    /// Most recent master gain command as `(gain, ramp)`.
    pub fn last_master(&self) -> Option<(f32, f32)> {
        self.log.lock().iter().rev().find_map(|c| match *c {
            SinkCommand::Master { gain, ramp } => Some((gain, ramp)),
            _ => None,
        })
    }

    /// Latest gain sent for each channel (0 where none was sent).
    pub fn channel_gains(&self) -> Vec<f32> {
        let mut gains = vec![0.0; self.channels];
        for command in self.log.lock().iter() {
            if let SinkCommand::Channel { channel, gain, .. } = *command {
                if let Some(slot) = gains.get_mut(channel) {
                    *slot = gain;
                }
            }
        }
        gains
    }
}

impl OutputSink for RecordingSink {
    fn channels(&self) -> usize {
        self.channels
    }

    fn set_channel_gain(&mut self, channel: usize, gain: f32, ramp_secs: f32) {
        self.log.lock().push(SinkCommand::Channel {
            channel,
            gain,
            ramp: ramp_secs,
        });
    }

    fn set_master_gain(&mut self, gain: f32, ramp_secs: f32) {
        self.log.lock().push(SinkCommand::Master {
            gain,
            ramp: ramp_secs,
        });
    }
}

/// Media whose play/pause counters are shared by all clones.
#[derive(Clone, Default)]
pub struct MockMedia {
    plays: Arc<AtomicUsize>,
    pauses: Arc<AtomicUsize>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

impl MediaSource for MockMedia {
    fn play(&mut self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }

    fn pause(&mut self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Engine on a manual clock. The returned scheduler shares its queue.
pub fn test_engine() -> (PanoraEngine, ManualScheduler) {
    test_engine_with_config(PanoraConfig::default())
}

pub fn test_engine_with_config(config: PanoraConfig) -> (PanoraEngine, ManualScheduler) {
    init_tracing();
    let scheduler = ManualScheduler::new();
    let engine = PanoraEngine::builder()
        .config(config)
        .scheduler(scheduler.clone())
        .build()
        .expect("Failed to create test engine");
    (engine, scheduler)
}

/// Voice over a fresh recording sink and mock media, plus handles to both.
pub fn test_voice(
    engine: &PanoraEngine,
    channels: usize,
    source: Coordinate,
) -> (Voice<RecordingSink, MockMedia>, RecordingSink, MockMedia) {
    let sink = RecordingSink::new(channels);
    let media = MockMedia::new();
    let voice = engine
        .voice(media.clone(), sink.clone(), ORIGIN, source)
        .expect("Failed to create test voice");
    (voice, sink, media)
}

/// RMS of every `channels`-th sample starting at `channel`.
pub fn channel_rms(interleaved: &[f32], channels: usize, channel: usize) -> f32 {
    let samples: Vec<f32> = interleaved
        .iter()
        .skip(channel)
        .step_by(channels)
        .copied()
        .collect();
    rms(&samples)
}

/// Calculate RMS (root mean square) of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Generate a constant (DC) signal.
pub fn generate_dc(value: f32, num_samples: usize) -> Vec<f32> {
    vec![value; num_samples]
}
