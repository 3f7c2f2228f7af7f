//! Error types for panora-dsp

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unsupported channel layout: no speaker layout for {0} channels (expected 2 or 6)")]
    UnsupportedChannelLayout(usize),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
