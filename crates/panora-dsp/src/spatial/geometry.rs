//! Listener/source geometry: direction and distance falloff.

use super::types::Coordinate;
use super::utils::{wrap_degrees, STRAIGHT_AHEAD};
use crate::{Error, Result};

/// Direction from `listener` to `source` in canonical degrees.
///
/// `atan2(dy, dx)` on the y-down plane: 0 is due east and angles grow clockwise
/// on screen, so "up the screen" is -90 (270). A source sitting exactly on the
/// listener has no direction; it is placed straight ahead, which centres it.
pub fn azimuth_from_coords(listener: Coordinate, source: Coordinate) -> f64 {
    let dx = source.x - listener.x;
    let dy = source.y - listener.y;
    if dx == 0.0 && dy == 0.0 {
        return wrap_degrees(STRAIGHT_AHEAD);
    }
    wrap_degrees(dy.atan2(dx).to_degrees())
}

/// Distance attenuation: unity inside `radius`, `radius / distance` beyond it.
pub fn attenuation_from_coords(listener: Coordinate, source: Coordinate, radius: f64) -> Result<f64> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(Error::InvalidGeometry(format!(
            "listen radius must be positive and finite, got {radius}"
        )));
    }

    let distance = listener.distance_to(&source);
    if !distance.is_finite() {
        return Err(Error::InvalidGeometry(format!(
            "source distance is not finite ({listener:?} -> {source:?})"
        )));
    }

    if distance < radius {
        Ok(1.0)
    } else {
        Ok(radius / distance)
    }
}
