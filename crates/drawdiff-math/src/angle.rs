//! Angle helpers for unconstrained radian values.

use std::f64::consts::{PI, TAU};

/// Normalize an angle into `[0, 2π)`.
pub fn normalize(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Smallest absolute difference between two angles, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize(a - b);
    d.min(TAU - d)
}

/// Signed rotation taking `from` onto `to`, in `(-π, π]`.
pub fn signed_difference(from: f64, to: f64) -> f64 {
    let d = normalize(to - from);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Counter-clockwise sweep from `start` to `end`, in `(0, 2π]`.
///
/// Equal angles describe a full turn.
pub fn ccw_sweep(start: f64, end: f64) -> f64 {
    let s = normalize(end - start);
    if s == 0.0 {
        TAU
    } else {
        s
    }
}
