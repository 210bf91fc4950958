// Centralized tolerances and helpers for editor geometry

use std::f64::consts::TAU;

pub const EPS_POS: f64 = 1e-6;            // point coincidence threshold (px)
pub const EPS_LEN: f64 = 1e-9;            // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // determinant guard
pub const EPS_ANG: f64 = 1e-9;            // angle compare slack (radians)

#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }
#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    if r >= TAU { 0.0 } else { r }
}

/// True when `angle` sits on a multiple of 90°.
#[inline]
pub fn is_right_angle(angle: f64) -> bool {
    let q = std::f64::consts::FRAC_PI_2;
    let r = angle.rem_euclid(q);
    r <= EPS_ANG * 1e3 || (q - r) <= EPS_ANG * 1e3
}

/// Snap `angle` to the nearest multiple of `step`. A non-positive step disables snapping.
#[inline]
pub fn snap_angle(angle: f64, step: f64) -> f64 {
    if step <= EPS_ANG { return angle; }
    (angle / step).round() * step
}
