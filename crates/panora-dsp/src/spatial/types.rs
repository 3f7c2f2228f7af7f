//! Common types for spatial panning

use super::utils::MAX_PANNED_CHANNELS;
use crate::{Error, Result};

/// One gain per output channel, index-aligned with a [`SpeakerLayout`].
pub type GainVector = Vec<f32>;

/// A point on the listening plane.
///
/// Origin is top-left: `x` grows rightward and `y` grows downward, so angles
/// measured from +x increase clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// What a channel carries in a discrete layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    Left,
    Right,
    Center,
    Lfe,
    SurroundLeft,
    SurroundRight,
}

/// A single loudspeaker slot.
///
/// `azimuth` is canonical degrees in `[0, 360)`, or `None` for channels that never
/// receive panned signal (the LFE).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speaker {
    pub role: ChannelRole,
    pub azimuth: Option<f64>,
}

impl Speaker {
    pub const fn at(role: ChannelRole, azimuth: f64) -> Self {
        Self {
            role,
            azimuth: Some(azimuth),
        }
    }

    pub const fn non_spatial(role: ChannelRole) -> Self {
        Self {
            role,
            azimuth: None,
        }
    }

    pub fn is_spatial(&self) -> bool {
        self.azimuth.is_some()
    }
}

// Front pair sits at straight ahead (-90) +/- 30, surrounds at -90 +/- 115,
// all stored already wrapped to [0, 360).
static STEREO: [Speaker; 2] = [
    Speaker::at(ChannelRole::Left, 240.0),
    Speaker::at(ChannelRole::Right, 300.0),
];

static SURROUND_5_1: [Speaker; 6] = [
    Speaker::at(ChannelRole::Left, 240.0),
    Speaker::at(ChannelRole::Right, 300.0),
    Speaker::at(ChannelRole::Center, 270.0),
    Speaker::non_spatial(ChannelRole::Lfe),
    Speaker::at(ChannelRole::SurroundLeft, 155.0),
    Speaker::at(ChannelRole::SurroundRight, 25.0),
];

/// Fixed speaker layout for a channel count.
///
/// Layouts are process-wide `'static` tables; copying a `SpeakerLayout` copies
/// a slice reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakerLayout {
    speakers: &'static [Speaker],
}

impl SpeakerLayout {
    /// Stereo (2.0) layout (L, R)
    pub fn stereo() -> Self {
        Self { speakers: &STEREO }
    }

    /// 5.1 Surround layout (L, R, C, LFE, SL, SR)
    pub fn surround_5_1() -> Self {
        Self {
            speakers: &SURROUND_5_1,
        }
    }

    /// Resolve the layout for exactly `channels` channels.
    pub fn for_channel_count(channels: usize) -> Result<Self> {
        match channels {
            2 => Ok(Self::stereo()),
            6 => Ok(Self::surround_5_1()),
            other => Err(Error::UnsupportedChannelLayout(other)),
        }
    }

    /// Resolve the layout for a physical output, capping at 5.1.
    ///
    /// An 8-channel device pans over the 5.1 table and leaves channels 6 and 7
    /// silent; a 4-channel device has no layout.
    pub fn for_output_channels(physical: usize) -> Result<Self> {
        Self::for_channel_count(physical.min(MAX_PANNED_CHANNELS))
    }

    pub fn speakers(&self) -> &'static [Speaker] {
        self.speakers
    }

    /// Get number of channels in this layout
    pub fn num_channels(&self) -> usize {
        self.speakers.len()
    }

    /// Channel index carrying `role`, if the layout has one.
    pub fn channel_of(&self, role: ChannelRole) -> Option<usize> {
        self.speakers.iter().position(|s| s.role == role)
    }

    /// Gains for `azimuth` (degrees) over this layout.
    pub fn gains(&self, azimuth: f64) -> Result<GainVector> {
        super::pan_law::gains_from_pan(azimuth, self.speakers)
    }
}
