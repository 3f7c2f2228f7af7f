use super::pan_law::gains_from_pan;
use super::types::{GainVector, SpeakerLayout};
use crate::Result;

/// Pair-wise panner bound to a physical output.
///
/// Wraps a [`SpeakerLayout`] with the device's real channel count: gains are
/// computed over the layout and padded with silent channels up to the
/// physical width, so callers can index the result by output channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPanner {
    layout: SpeakerLayout,
    output_channels: usize,
}

impl SpatialPanner {
    /// Create a stereo panner
    pub fn stereo() -> Self {
        Self {
            layout: SpeakerLayout::stereo(),
            output_channels: 2,
        }
    }

    /// Create a 5.1 surround panner
    pub fn surround_5_1() -> Self {
        Self {
            layout: SpeakerLayout::surround_5_1(),
            output_channels: 6,
        }
    }

    /// Create a panner for a device reporting `channels` outputs.
    ///
    /// Fails with `UnsupportedChannelLayout` before anything per-channel exists.
    pub fn for_output_channels(channels: usize) -> Result<Self> {
        let layout = SpeakerLayout::for_output_channels(channels)?;
        Ok(Self {
            layout,
            output_channels: channels,
        })
    }

    /// Get the speaker layout
    pub fn layout(&self) -> &SpeakerLayout {
        &self.layout
    }

    /// Physical output channels, including silent ones past the layout.
    pub fn num_channels(&self) -> usize {
        self.output_channels
    }

    /// Channels that can receive panned signal.
    pub fn panned_channels(&self) -> usize {
        self.layout.num_channels()
    }

    /// Gains for `azimuth` degrees, one per physical output channel.
    pub fn compute_gains_at(&self, azimuth: f64) -> Result<GainVector> {
        let mut gains = gains_from_pan(azimuth, self.layout.speakers())?;
        gains.resize(self.output_channels, 0.0);
        Ok(gains)
    }
}
