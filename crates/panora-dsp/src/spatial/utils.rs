//! Angle helpers shared by the layout table, the pan law and the geometry mapper.

/// "Straight ahead" (up the screen on a y-down plane), in degrees.
pub const STRAIGHT_AHEAD: f64 = -90.0;

/// Widest layout the pan law knows about (5.1). Physical channels past this stay silent.
pub const MAX_PANNED_CHANNELS: usize = 6;

/// Canonicalize an angle in degrees to `[0, 360)`.
///
/// True modulo: the result takes the sign of the divisor, so `-120` maps to `240`
/// rather than staying negative the way `%` would leave it.
#[inline]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
