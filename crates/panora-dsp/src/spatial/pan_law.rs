use super::types::{GainVector, Speaker};
use super::utils::wrap_degrees;
use crate::{Error, Result};
use std::f64::consts::FRAC_PI_2;

/// Equal-power gains for a mono source at `azimuth` degrees.
///
/// Only the two spatial speakers bracketing the target get signal: every
/// speaker angle is rotated so the target sits at 0, the smallest rotated
/// angle is the nearest speaker clockwise (the "right" one) and the largest
/// is the nearest counter-clockwise (the "left" one). Each of the pair gets
/// `cos(p * pi/2)` where `p` is its normalized distance to the target along
/// the arc between them, so the two squared gains always sum to 1.
///
/// Non-spatial channels (LFE) are skipped and always get exactly 0.
pub fn gains_from_pan(azimuth: f64, speakers: &[Speaker]) -> Result<GainVector> {
    if !azimuth.is_finite() {
        return Err(Error::InvalidGeometry(format!(
            "pan azimuth must be finite, got {azimuth}"
        )));
    }

    let relative: Vec<Option<f64>> = speakers
        .iter()
        .map(|s| s.azimuth.map(|a| wrap_degrees(a - azimuth)))
        .collect();

    let mut right: Option<(usize, f64)> = None;
    let mut left: Option<(usize, f64)> = None;
    let mut spatial = 0usize;

    for (i, rel) in relative.iter().enumerate() {
        let Some(rel) = *rel else { continue };
        spatial += 1;
        if right.map_or(true, |(_, min)| rel < min) {
            right = Some((i, rel));
        }
        if left.map_or(true, |(_, max)| rel > max) {
            left = Some((i, rel));
        }
    }

    let (Some((right_idx, right_rel)), Some((left_idx, left_rel))) = (right, left) else {
        return Err(Error::InvalidGeometry(format!(
            "need at least two spatial speakers to pan, layout has {spatial}"
        )));
    };

    if spatial < 2 || right_idx == left_idx {
        return Err(Error::InvalidGeometry(format!(
            "need at least two distinct spatial speakers to pan, layout has {spatial}"
        )));
    }

    let span = wrap_degrees(right_rel - left_rel);
    if span <= 0.0 {
        return Err(Error::InvalidGeometry(
            "bracketing speakers share the same angle".into(),
        ));
    }

    let mut gains = vec![0.0f32; speakers.len()];
    gains[left_idx] = pair_gain((360.0 - left_rel) / span);
    gains[right_idx] = pair_gain(right_rel / span);

    Ok(gains)
}

/// `cos(p * pi/2)` for a normalized position `p` in `[0, 1]`.
///
/// `p >= 1` is flushed to an exact 0 so a target sitting on a speaker leaves
/// its partner fully silent instead of at ~6e-17.
#[inline]
fn pair_gain(position: f64) -> f32 {
    if position >= 1.0 {
        0.0
    } else {
        (position.max(0.0) * FRAC_PI_2).cos() as f32
    }
}
