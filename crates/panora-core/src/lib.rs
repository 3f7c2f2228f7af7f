//! Runtime kernel for Panora voices.
//!
//! # Primary API
//!
//! - [`OutputSink`] / [`MediaSource`]: the boundary a voice drives
//! - [`Scheduler`]: cancellable fire-once timers ([`ThreadScheduler`], [`ManualScheduler`])
//! - [`voice_bus`]: lock-free per-voice gain bus over a mono sample feed
//! - [`PanoraConfig`]: ramp times, pause grace, defaults
//!
//! # Feature-gated APIs
//!
//! - `"output"`: [`AudioOutput`], a CPAL stream that mixes voice buses

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{PanoraConfig, MAX_PAUSE_GRACE_SECS};

pub(crate) mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat};

pub mod smooth;
pub use smooth::SmoothedValue;

mod sink;
pub use sink::{MediaSource, OutputSink};

pub mod scheduler;
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle, ThreadScheduler};

pub mod bus;
pub use bus::{voice_bus, BusRenderer, BusTransport, SampleFeed, VoiceBus, VoiceBusParts};

#[cfg(feature = "output")]
mod output;
#[cfg(feature = "output")]
pub use output::AudioOutput;
