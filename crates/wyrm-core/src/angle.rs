//! Angle helpers shared by the chain, the wander steering and the heart curve.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Remap an angle difference into `(-PI, PI]`.
pub fn normalize_delta(delta: f32) -> f32 {
    if !delta.is_finite() {
        return 0.0;
    }
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Unit vector pointing along `angle` (radians, screen coordinates).
pub fn unit(angle: f32) -> Vec2 {
    Vec2::from_angle(angle)
}

/// Bearing from `from` to `to`, `atan2` convention.
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Classic parametric heart, not yet scaled. `theta = 0` is the dip between
/// the lobes and `theta = PI` is the bottom point.
pub fn heart_curve(theta: f32) -> Vec2 {
    let x = 16.0 * theta.sin().powi(3);
    let y = -13.0 * theta.cos()
        + 5.0 * (2.0 * theta).cos()
        + 2.0 * (3.0 * theta).cos()
        + (4.0 * theta).cos();
    Vec2::new(x, y)
}
