//! Spatial panning math: fixed speaker layouts (stereo, 5.1), an equal-power
//! pair-wise pan law, and listener/source geometry on a y-down plane.
//!
//! Everything here is pure and allocation-light; the stateful side (voices,
//! ramps, timers) lives in `panora-core` and the `panora` umbrella crate.

mod error;
pub use error::{Error, Result};

pub mod spatial;
pub use spatial::{
    attenuation_from_coords, azimuth_from_coords, gains_from_pan, wrap_degrees, ChannelRole,
    Coordinate, GainVector, Speaker, SpeakerLayout, SpatialPanner, MAX_PANNED_CHANNELS,
    STRAIGHT_AHEAD,
};
