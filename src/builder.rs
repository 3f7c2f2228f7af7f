//! Builder for configuring and constructing a `PanoraEngine`.

use crate::{PanoraEngine, Result};
use panora_core::{PanoraConfig, Scheduler, ThreadScheduler};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "output")]
use panora_core::AudioOutput;

/// Defaults come from [`PanoraConfig::default`] and a fresh [`ThreadScheduler`].
///
/// With the `output` feature, `.output_device(..)` or `.default_output()`
/// opens and starts a CPAL stream at build time; otherwise the engine is
/// device-less and voices are driven through caller-provided sinks.
///
/// # Example
///
/// ```ignore
/// use panora::prelude::*;
///
/// let engine = PanoraEngine::builder()
///     .config(PanoraConfig::load("panora.toml")?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct PanoraEngineBuilder {
    config: PanoraConfig,
    scheduler: Option<Arc<dyn Scheduler>>,

    #[cfg(feature = "output")]
    output: Option<Option<String>>,
}

impl PanoraEngineBuilder {
    pub fn config(mut self, config: PanoraConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom scheduler for pause grace timers (e.g. `ManualScheduler` in tests).
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// Share an existing scheduler between engines.
    pub fn shared_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Open the named output device at build time.
    #[cfg(feature = "output")]
    pub fn output_device(mut self, name: impl Into<String>) -> Self {
        self.output = Some(Some(name.into()));
        self
    }

    /// Open the host's default output device at build time.
    #[cfg(feature = "output")]
    pub fn default_output(mut self) -> Self {
        self.output = Some(None);
        self
    }

    pub fn build(self) -> Result<PanoraEngine> {
        self.config.validate()?;

        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(ThreadScheduler::new()?),
        };

        #[cfg(feature = "output")]
        let output = match self.output {
            Some(device) => {
                let mut output = AudioOutput::open(device.as_deref())?;
                output.start()?;
                Some(output)
            }
            None => None,
        };

        info!(
            pan_ramp_secs = self.config.pan_ramp_secs,
            fade_ramp_secs = self.config.fade_ramp_secs,
            pause_grace_secs = self.config.pause_grace_secs,
            "panora engine ready"
        );

        Ok(PanoraEngine {
            config: self.config,
            scheduler,
            #[cfg(feature = "output")]
            output: output.map(parking_lot::Mutex::new),
        })
    }
}
