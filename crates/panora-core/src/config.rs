//! Engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted pause grace period (one day).
pub const MAX_PAUSE_GRACE_SECS: f64 = 86_400.0;

/// Configuration for the panning engine and its voices.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// pause_grace_secs = 3.0
/// default_listen_radius = 250.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoraConfig {
    /// Sample rate used by voice buses when no output device dictates one.
    pub sample_rate: f64,
    /// Ramp for movement-driven gain and volume changes.
    pub pan_ramp_secs: f32,
    /// Ramp for the master fade on pause/play.
    pub fade_ramp_secs: f32,
    /// Delay between a pause fade starting and the media actually pausing.
    pub pause_grace_secs: f64,
    pub default_listen_radius: f64,
    pub default_volume: f32,
    /// Mono samples buffered between a sample feed and the audio thread.
    pub feed_capacity: usize,
}

impl Default for PanoraConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            pan_ramp_secs: 0.1,
            fade_ramp_secs: 1.0,
            pause_grace_secs: 5.0,
            default_listen_radius: 100.0,
            default_volume: 1.0,
            feed_capacity: 48000,
        }
    }
}

impl PanoraConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        for (name, secs) in [
            ("pan_ramp_secs", self.pan_ramp_secs as f64),
            ("fade_ramp_secs", self.fade_ramp_secs as f64),
            ("pause_grace_secs", self.pause_grace_secs),
        ] {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number of seconds, got {secs}"
                )));
            }
        }
        if self.pause_grace_secs > MAX_PAUSE_GRACE_SECS {
            return Err(Error::InvalidConfig(format!(
                "pause_grace_secs must be at most {MAX_PAUSE_GRACE_SECS}, got {}",
                self.pause_grace_secs
            )));
        }
        if !(self.default_listen_radius.is_finite() && self.default_listen_radius > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "default_listen_radius must be positive, got {}",
                self.default_listen_radius
            )));
        }
        if !(self.default_volume.is_finite() && self.default_volume >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "default_volume must be non-negative, got {}",
                self.default_volume
            )));
        }
        if self.feed_capacity == 0 {
            return Err(Error::InvalidConfig("feed_capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Grace period as a `Duration`; saturates for values `validate` would reject.
    pub fn pause_grace(&self) -> Duration {
        Duration::try_from_secs_f64(self.pause_grace_secs).unwrap_or(Duration::MAX)
    }
}
