//! # Panora - 2-D spatial voice panning
//!
//! Places mono sources around a listener on a flat, y-down plane and pans them
//! across a stereo or 5.1 speaker array.
//!
//! ## Architecture
//!
//! Panora is an umbrella crate over:
//! - **panora-dsp** - speaker layouts, equal-power pair-wise pan law, listener/source geometry
//! - **panora-core** - output sink and media traits, smoothed gains, voice bus, scheduler, config
//!
//! This crate adds the [`Voice`] controller (position setters, play / fade-out /
//! pause transport) and the [`PanoraEngine`] context that creates voices.
//!
//! ## Quick Start
//!
//! ```ignore
//! use panora::prelude::*;
//!
//! let engine = PanoraEngine::builder().build()?;
//! let (mut voice, mut feed, mut renderer) =
//!     engine.bus_voice(2, Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0))?;
//!
//! voice.play()?;
//! feed.push(&samples);
//! renderer.render_add(&mut interleaved, 2);
//!
//! // Pause fades out over one second; the media stops five seconds later
//! // unless `play` is called first.
//! voice.pause()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - panning, voices, offline buses
//! - `output` - CPAL device output (`PanoraEngineBuilder::default_output`)

/// Re-export of panora-core for direct access
pub use panora_core as core;

/// Re-export of panora-dsp for direct access
pub use panora_dsp as dsp;

pub use panora_core::{
    BusRenderer, BusTransport, ManualScheduler, MediaSource, OutputSink, PanoraConfig, SampleFeed,
    Scheduler, TaskHandle, ThreadScheduler, VoiceBus,
};

#[cfg(feature = "output")]
pub use panora_core::AudioOutput;

pub use panora_dsp::{
    attenuation_from_coords, azimuth_from_coords, gains_from_pan, ChannelRole, Coordinate,
    GainVector, Speaker, SpeakerLayout, SpatialPanner,
};

mod error;
pub use error::{Error, Result};

mod builder;
mod engine;
mod voice;

pub use builder::PanoraEngineBuilder;
pub use engine::{BusVoice, PanoraEngine};
pub use voice::{PlaybackState, Voice, VoiceParams, VoiceSnapshot, VoiceState, VoiceTiming};

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Coordinate, Error, MediaSource, OutputSink, PanoraConfig, PanoraEngine,
        PanoraEngineBuilder, PlaybackState, Result, SpatialPanner, Voice, VoiceSnapshot,
    };
}
