//! Pair-wise equal-power panning over stereo and 5.1 layouts.

pub mod types;
pub use types::{ChannelRole, Coordinate, GainVector, Speaker, SpeakerLayout};

mod utils;
pub use utils::{wrap_degrees, MAX_PANNED_CHANNELS, STRAIGHT_AHEAD};

mod geometry;
mod pan_law;
mod panner;

pub use geometry::{attenuation_from_coords, azimuth_from_coords};
pub use pan_law::gains_from_pan;
pub use panner::SpatialPanner;
