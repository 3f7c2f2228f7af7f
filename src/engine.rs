//! PanoraEngine: explicit context object that owns configuration, the
//! scheduler, and (with the `output` feature) the audio device.

use crate::builder::PanoraEngineBuilder;
use crate::voice::{Voice, VoiceState, VoiceTiming};
use crate::Result;
use panora_core::{
    voice_bus, BusRenderer, BusTransport, MediaSource, OutputSink, PanoraConfig, SampleFeed,
    Scheduler, VoiceBus,
};
use panora_dsp::{Coordinate, SpatialPanner};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "output")]
use panora_core::AudioOutput;
#[cfg(feature = "output")]
use parking_lot::Mutex;

/// Voice plus the feed and renderer of its bus.
pub type BusVoice = Voice<VoiceBus, BusTransport>;

/// Creates voices that share one configuration and one scheduler.
///
/// Engines are independent of each other; nothing here is process-global.
///
/// # Example
///
/// ```ignore
/// use panora::prelude::*;
///
/// let engine = PanoraEngine::builder().build()?;
/// let mut voice = engine.voice(media, sink, Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0))?;
/// voice.play()?;
/// voice.set_source(Coordinate::new(0.0, -10.0))?;
/// ```
pub struct PanoraEngine {
    pub(crate) config: PanoraConfig,
    pub(crate) scheduler: Arc<dyn Scheduler>,

    #[cfg(feature = "output")]
    pub(crate) output: Option<Mutex<AudioOutput>>,
}

impl PanoraEngine {
    pub fn builder() -> PanoraEngineBuilder {
        PanoraEngineBuilder::default()
    }

    pub fn config(&self) -> &PanoraConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// Ramp and grace timings handed to every voice this engine creates.
    pub fn timing(&self) -> VoiceTiming {
        VoiceTiming::from(&self.config)
    }

    /// Initial voice state using the configured radius and volume.
    pub fn initial_state(&self, listener: Coordinate, source: Coordinate) -> VoiceState {
        VoiceState::new(
            listener,
            source,
            self.config.default_listen_radius,
            self.config.default_volume,
        )
    }

    /// Create a voice over any sink/media pair.
    pub fn voice<S, M>(
        &self,
        media: M,
        sink: S,
        listener: Coordinate,
        source: Coordinate,
    ) -> Result<Voice<S, M>>
    where
        S: OutputSink,
        M: MediaSource + 'static,
    {
        self.voice_with_state(media, sink, self.initial_state(listener, source))
    }

    pub fn voice_with_state<S, M>(&self, media: M, sink: S, state: VoiceState) -> Result<Voice<S, M>>
    where
        S: OutputSink,
        M: MediaSource + 'static,
    {
        let voice = Voice::new(media, sink, state, Arc::clone(&self.scheduler), self.timing())?;
        debug!(
            channels = voice.panner().num_channels(),
            azimuth = voice.azimuth(),
            "voice created"
        );
        Ok(voice)
    }

    /// Create a voice on a fresh bus with `channels` outputs, without a device.
    ///
    /// The caller owns the renderer and mixes it wherever it likes (offline
    /// rendering, a host's own callback).
    pub fn bus_voice(
        &self,
        channels: usize,
        listener: Coordinate,
        source: Coordinate,
    ) -> Result<(BusVoice, SampleFeed, BusRenderer)> {
        // Reject the layout before any per-channel allocation.
        SpatialPanner::for_output_channels(channels)?;

        let parts = voice_bus(
            channels,
            self.config.sample_rate as f32,
            self.config.feed_capacity,
        );
        let voice = self.voice(parts.transport, parts.bus, listener, source)?;
        Ok((voice, parts.feed, parts.renderer))
    }

    /// Physical channel count of the opened device.
    #[cfg(feature = "output")]
    pub fn output_channels(&self) -> Option<usize> {
        self.output.as_ref().map(|o| o.lock().channels())
    }

    /// Create a voice mixed into the engine's audio device.
    #[cfg(feature = "output")]
    pub fn output_voice(&self, listener: Coordinate, source: Coordinate) -> Result<(BusVoice, SampleFeed)> {
        let Some(output) = self.output.as_ref() else {
            return Err(panora_core::Error::InvalidConfig(
                "engine was built without an output device".to_string(),
            )
            .into());
        };

        let output = output.lock();
        let channels = output.channels();
        SpatialPanner::for_output_channels(channels)?;

        let parts = voice_bus(
            channels,
            output.sample_rate() as f32,
            self.config.feed_capacity,
        );
        let voice = self.voice(parts.transport, parts.bus, listener, source)?;
        output.add_bus(parts.renderer);
        Ok((voice, parts.feed))
    }
}

impl std::fmt::Debug for PanoraEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanoraEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
