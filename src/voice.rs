//! Voice controller: one mono source panned from listener/source coordinates.
//!
//! [`VoiceState::update`] is the pure transition (state in, pan parameters
//! out). [`Voice`] is the thin mutable wrapper that applies it on every setter,
//! forwards the result to its [`OutputSink`], and runs the play / fade-out /
//! pause transport.

use crate::{Error, Result};
use panora_core::{MediaSource, OutputSink, PanoraConfig, Scheduler, TaskHandle};
use panora_dsp::{
    attenuation_from_coords, azimuth_from_coords, Coordinate, GainVector, SpatialPanner,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::debug;

/// Everything a voice's pan depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceState {
    pub listener: Coordinate,
    pub source: Coordinate,
    /// User volume, before distance attenuation.
    pub volume: f32,
    pub listen_radius: f64,
    /// Set by a pause fade; forces the effective user volume to 0.
    pub muted: bool,
}

/// Derived pan parameters for one [`VoiceState`].
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    /// Canonical degrees in `[0, 360)`.
    pub azimuth: f64,
    /// One gain per physical output channel.
    pub gains: GainVector,
    pub attenuation: f64,
    /// `userVolume * attenuation`, 0 while muted. This is what the sink's master gain gets.
    pub volume: f32,
}

impl VoiceState {
    pub fn new(listener: Coordinate, source: Coordinate, listen_radius: f64, volume: f32) -> Self {
        Self {
            listener,
            source,
            volume,
            listen_radius,
            muted: false,
        }
    }

    pub fn effective_user_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Recompute azimuth, gains, attenuation and effective volume.
    pub fn update(&self, panner: &SpatialPanner) -> Result<VoiceParams> {
        if !(self.volume.is_finite() && self.volume >= 0.0) {
            return Err(Error::InvalidVolume(self.volume));
        }

        let azimuth = azimuth_from_coords(self.listener, self.source);
        let gains = panner.compute_gains_at(azimuth)?;
        let attenuation = attenuation_from_coords(self.listener, self.source, self.listen_radius)?;

        Ok(VoiceParams {
            azimuth,
            gains,
            attenuation,
            volume: self.effective_user_volume() * attenuation as f32,
        })
    }
}

/// Transport state of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
    /// Paused by the caller; the volume is fading and the media has not been
    /// paused yet.
    FadingOut,
}

/// Ramp and grace timings a voice runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceTiming {
    pub pan_ramp_secs: f32,
    pub fade_ramp_secs: f32,
    pub pause_grace: Duration,
}

impl Default for VoiceTiming {
    fn default() -> Self {
        Self::from(&PanoraConfig::default())
    }
}

impl From<&PanoraConfig> for VoiceTiming {
    fn from(config: &PanoraConfig) -> Self {
        Self {
            pan_ramp_secs: config.pan_ramp_secs,
            fade_ramp_secs: config.fade_ramp_secs,
            pause_grace: config.pause_grace(),
        }
    }
}

/// Point-in-time view of a voice, for UIs and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSnapshot {
    pub state: PlaybackState,
    pub listener: Coordinate,
    pub source: Coordinate,
    pub volume: f32,
    pub listen_radius: f64,
    pub azimuth: f64,
    pub gains: GainVector,
    pub effective_volume: f32,
}

/// Media plus transport state, shared with the pending stop task.
struct Transport<M> {
    media: M,
    state: PlaybackState,
    /// Bumped on every play/pause; a stop task only acts if it still matches.
    generation: u64,
}

/// A playable, spatialized mono source.
pub struct Voice<S: OutputSink, M: MediaSource + 'static> {
    panner: SpatialPanner,
    state: VoiceState,
    params: VoiceParams,
    sink: S,
    transport: Arc<Mutex<Transport<M>>>,
    scheduler: Arc<dyn Scheduler>,
    pending_stop: Option<TaskHandle>,
    timing: VoiceTiming,
}

impl<S: OutputSink, M: MediaSource + 'static> Voice<S, M> {
    /// Build a voice over `sink` and push its initial gains.
    ///
    /// The speaker layout is resolved from `sink.channels()` first, so an
    /// unsupported channel count fails before the sink receives anything.
    /// The voice starts [`PlaybackState::Paused`].
    pub fn new(
        media: M,
        mut sink: S,
        state: VoiceState,
        scheduler: Arc<dyn Scheduler>,
        timing: VoiceTiming,
    ) -> Result<Self> {
        let panner = SpatialPanner::for_output_channels(sink.channels())?;
        let params = state.update(&panner)?;

        push_params(&mut sink, &params, 0.0, 0.0);

        Ok(Self {
            panner,
            state,
            params,
            sink,
            transport: Arc::new(Mutex::new(Transport {
                media,
                state: PlaybackState::Paused,
                generation: 0,
            })),
            scheduler,
            pending_stop: None,
            timing,
        })
    }

    /// Start (or resume) playback.
    ///
    /// During a fade-out the pending stop is cancelled and the volume ramps
    /// back up from wherever the fade currently is.
    pub fn play(&mut self) -> Result<()> {
        if let Some(stop) = self.pending_stop.take() {
            stop.cancel();
            debug!("pending stop cancelled");
        }

        {
            let mut transport = self.transport.lock();
            transport.generation += 1;
            if transport.state != PlaybackState::Playing {
                transport.media.play();
                debug!(from = ?transport.state, "voice playing");
            }
            transport.state = PlaybackState::Playing;
        }

        if self.state.muted {
            let next = VoiceState {
                muted: false,
                ..self.state
            };
            self.apply(next, self.timing.fade_ramp_secs)?;
        }

        Ok(())
    }

    /// Fade the voice out and pause the media once the grace period elapses.
    ///
    /// No-op unless the voice is playing.
    pub fn pause(&mut self) -> Result<()> {
        if self.playback_state() != PlaybackState::Playing {
            return Ok(());
        }

        let next = VoiceState {
            muted: true,
            ..self.state
        };
        self.apply(next, self.timing.fade_ramp_secs)?;

        let generation = {
            let mut transport = self.transport.lock();
            transport.state = PlaybackState::FadingOut;
            transport.generation += 1;
            transport.generation
        };

        let transport = Arc::downgrade(&self.transport);
        let handle = self.scheduler.schedule(
            self.timing.pause_grace,
            Box::new(move || stop_after_fade(transport, generation)),
        );
        self.pending_stop = Some(handle);

        debug!(grace = ?self.timing.pause_grace, "voice fading out");
        Ok(())
    }

    pub fn set_listener(&mut self, listener: Coordinate) -> Result<()> {
        let next = VoiceState {
            listener,
            ..self.state
        };
        self.apply(next, self.timing.pan_ramp_secs)
    }

    pub fn set_source(&mut self, source: Coordinate) -> Result<()> {
        let next = VoiceState {
            source,
            ..self.state
        };
        self.apply(next, self.timing.pan_ramp_secs)
    }

    /// Move both ends at once with a single recompute.
    pub fn set_positions(&mut self, listener: Coordinate, source: Coordinate) -> Result<()> {
        let next = VoiceState {
            listener,
            source,
            ..self.state
        };
        self.apply(next, self.timing.pan_ramp_secs)
    }

    /// Set the user volume. While fading out or paused it is stored and takes
    /// effect on the next `play`.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        let next = VoiceState {
            volume,
            ..self.state
        };
        self.apply(next, self.timing.pan_ramp_secs)
    }

    pub fn set_listen_radius(&mut self, listen_radius: f64) -> Result<()> {
        let next = VoiceState {
            listen_radius,
            ..self.state
        };
        self.apply(next, self.timing.pan_ramp_secs)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.transport.lock().state
    }

    pub fn state(&self) -> &VoiceState {
        &self.state
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn listener(&self) -> Coordinate {
        self.state.listener
    }

    pub fn source(&self) -> Coordinate {
        self.state.source
    }

    pub fn volume(&self) -> f32 {
        self.state.volume
    }

    pub fn listen_radius(&self) -> f64 {
        self.state.listen_radius
    }

    pub fn azimuth(&self) -> f64 {
        self.params.azimuth
    }

    pub fn gains(&self) -> &[f32] {
        &self.params.gains
    }

    /// Volume currently sent to the sink's master gain.
    pub fn effective_volume(&self) -> f32 {
        self.params.volume
    }

    pub fn panner(&self) -> &SpatialPanner {
        &self.panner
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            state: self.playback_state(),
            listener: self.state.listener,
            source: self.state.source,
            volume: self.state.volume,
            listen_radius: self.state.listen_radius,
            azimuth: self.params.azimuth,
            gains: self.params.gains.clone(),
            effective_volume: self.params.volume,
        }
    }

    /// Commit `next` only if it yields valid parameters, then push everything.
    fn apply(&mut self, next: VoiceState, master_ramp_secs: f32) -> Result<()> {
        let params = next.update(&self.panner)?;
        push_params(
            &mut self.sink,
            &params,
            self.timing.pan_ramp_secs,
            master_ramp_secs,
        );
        self.state = next;
        self.params = params;
        Ok(())
    }
}

impl<S: OutputSink, M: MediaSource + 'static> Drop for Voice<S, M> {
    fn drop(&mut self) {
        if let Some(stop) = self.pending_stop.take() {
            stop.cancel();
        }
    }
}

fn push_params<S: OutputSink>(sink: &mut S, params: &VoiceParams, gain_ramp: f32, master_ramp: f32) {
    for (channel, gain) in params.gains.iter().enumerate() {
        sink.set_channel_gain(channel, *gain, gain_ramp);
    }
    sink.set_master_gain(params.volume, master_ramp);
}

fn stop_after_fade<M: MediaSource>(transport: Weak<Mutex<Transport<M>>>, generation: u64) {
    let Some(transport) = transport.upgrade() else {
        return;
    };
    let mut transport = transport.lock();
    if transport.generation != generation || transport.state != PlaybackState::FadingOut {
        debug!("stale stop ignored");
        return;
    }
    transport.media.pause();
    transport.state = PlaybackState::Paused;
    debug!("fade complete, media paused");
}
