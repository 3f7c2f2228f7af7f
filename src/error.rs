//! Centralized error type for the panora umbrella crate.
//!
//! Wraps both subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] panora_core::Error),

    #[error("DSP: {0}")]
    Dsp(#[from] panora_dsp::Error),

    #[error("Invalid volume {0}: must be finite and non-negative")]
    InvalidVolume(f32),
}

impl Error {
    /// The channel count had no speaker layout.
    pub fn is_unsupported_layout(&self) -> bool {
        matches!(self, Error::Dsp(panora_dsp::Error::UnsupportedChannelLayout(_)))
    }

    /// A radius, position or layout produced no usable pan.
    pub fn is_invalid_geometry(&self) -> bool {
        matches!(self, Error::Dsp(panora_dsp::Error::InvalidGeometry(_)))
    }

    /// The device layer could not find an output.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, Error::Core(panora_core::Error::DeviceNotFound(_)))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
