//! Per-voice output bus: smoothed channel gains and master gain over a mono feed.
//!
//! The control side ([`VoiceBus`], [`BusTransport`], [`SampleFeed`]) talks to the
//! audio side ([`BusRenderer`]) only through atomics and a lock-free sample
//! ring, so nothing on the render path blocks.
//!
//! Gain changes are coalesced rather than queued: each channel (and the master)
//! holds only its latest target and ramp time plus a dirty flag. Any number of
//! changes between two renders collapse into the most recent one, so the
//! renderer always converges on the last complete gain vector.

use crate::lockfree::{AtomicFlag, AtomicFloat};
use crate::sink::{MediaSource, OutputSink};
use crate::smooth::SmoothedValue;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use tracing::warn;

/// Latest requested gain for one channel (or the master).
#[derive(Debug)]
struct GainSlot {
    target: AtomicFloat,
    ramp_secs: AtomicFloat,
    dirty: AtomicFlag,
}

impl GainSlot {
    fn new() -> Self {
        Self {
            target: AtomicFloat::new(0.0),
            ramp_secs: AtomicFloat::new(0.0),
            dirty: AtomicFlag::new(false),
        }
    }

    /// Publish a new target. The flag is raised last so a reader that sees it
    /// also sees the values.
    fn publish(&self, gain: f32, ramp_secs: f32) {
        self.target.set(gain);
        self.ramp_secs.set(ramp_secs);
        self.dirty.set(true);
    }

    /// Retarget `smoothed` if a change was published since the last poll.
    fn poll(&self, smoothed: &mut SmoothedValue) {
        if self.dirty.swap(false) {
            smoothed.set_target(self.target.get(), self.ramp_secs.get());
        }
    }
}

/// Gain state shared by both sides of a bus.
#[derive(Debug)]
struct BusTargets {
    master: GainSlot,
    channels: Vec<GainSlot>,
}

/// Control side of a voice bus; the [`OutputSink`] a voice drives.
pub struct VoiceBus {
    targets: Arc<BusTargets>,
    closed: Arc<AtomicFlag>,
}

/// Transport for the bus's sample feed; the [`MediaSource`] a voice drives.
///
/// While paused the renderer neither consumes the feed nor outputs signal.
#[derive(Debug, Clone)]
pub struct BusTransport {
    playing: Arc<AtomicFlag>,
}

/// Producer end of the mono sample feed.
pub struct SampleFeed {
    producer: HeapProd<f32>,
}

/// Audio-thread side of a voice bus.
pub struct BusRenderer {
    targets: Arc<BusTargets>,
    feed: HeapCons<f32>,
    master: SmoothedValue,
    gains: Vec<SmoothedValue>,
    playing: Arc<AtomicFlag>,
    closed: Arc<AtomicFlag>,
}

/// Everything [`voice_bus`] hands out.
pub struct VoiceBusParts {
    pub bus: VoiceBus,
    pub transport: BusTransport,
    pub feed: SampleFeed,
    pub renderer: BusRenderer,
}

/// Create a bus for `channels` outputs. All gains start at silence.
pub fn voice_bus(channels: usize, sample_rate: f32, feed_capacity: usize) -> VoiceBusParts {
    let (feed_tx, feed_rx) = HeapRb::<f32>::new(feed_capacity.max(1)).split();

    let targets = Arc::new(BusTargets {
        master: GainSlot::new(),
        channels: (0..channels).map(|_| GainSlot::new()).collect(),
    });
    let playing = Arc::new(AtomicFlag::new(false));
    let closed = Arc::new(AtomicFlag::new(false));

    VoiceBusParts {
        bus: VoiceBus {
            targets: Arc::clone(&targets),
            closed: Arc::clone(&closed),
        },
        transport: BusTransport {
            playing: Arc::clone(&playing),
        },
        feed: SampleFeed { producer: feed_tx },
        renderer: BusRenderer {
            targets,
            feed: feed_rx,
            master: SmoothedValue::new(0.0, sample_rate),
            gains: (0..channels)
                .map(|_| SmoothedValue::new(0.0, sample_rate))
                .collect(),
            playing,
            closed,
        },
    }
}

impl VoiceBus {
    /// Last requested master gain.
    pub fn target_master(&self) -> f32 {
        self.targets.master.target.get()
    }

    /// Last requested gain per channel.
    pub fn target_gains(&self) -> Vec<f32> {
        self.targets
            .channels
            .iter()
            .map(|slot| slot.target.get())
            .collect()
    }
}

impl OutputSink for VoiceBus {
    fn channels(&self) -> usize {
        self.targets.channels.len()
    }

    fn set_channel_gain(&mut self, channel: usize, gain: f32, ramp_secs: f32) {
        let Some(slot) = self.targets.channels.get(channel) else {
            warn!(channel, channels = self.channels(), "gain for unknown bus channel ignored");
            return;
        };
        slot.publish(gain, ramp_secs);
    }

    fn set_master_gain(&mut self, gain: f32, ramp_secs: f32) {
        self.targets.master.publish(gain, ramp_secs);
    }
}

impl Drop for VoiceBus {
    fn drop(&mut self) {
        self.closed.set(true);
    }
}

impl BusTransport {
    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }
}

impl MediaSource for BusTransport {
    fn play(&mut self) {
        self.playing.set(true);
    }

    fn pause(&mut self) {
        self.playing.set(false);
    }
}

impl SampleFeed {
    /// Queue mono samples; returns how many fit.
    pub fn push(&mut self, samples: &[f32]) -> usize {
        self.producer.push_slice(samples)
    }
}

impl BusRenderer {
    /// True once the control side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Mix this bus into an interleaved buffer of `channels`-wide frames.
    ///
    /// Output channels the bus does not have are left untouched; bus channels
    /// past the buffer width are still ramped so they stay in step.
    pub fn render_add(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        self.apply_targets();

        let playing = self.playing.get();
        for frame in out.chunks_exact_mut(channels) {
            let sample = if playing {
                self.feed.try_pop().unwrap_or(0.0)
            } else {
                0.0
            };
            let master = self.master.next_sample();

            for (ch, gain) in self.gains.iter_mut().enumerate() {
                let g = gain.next_sample();
                if let Some(out) = frame.get_mut(ch) {
                    *out += sample * master * g;
                }
            }
        }
    }

    fn apply_targets(&mut self) {
        for (slot, smoothed) in self.targets.channels.iter().zip(self.gains.iter_mut()) {
            slot.poll(smoothed);
        }
        self.targets.master.poll(&mut self.master);
    }
}
