//! Vector and rotation kernel shared by every effect.
//!
//! All geometry is `f32` world units on [`glam::Vec3`]. Rotations are Euler
//! angles in radians applied about X, then Y, then Z, so the composed
//! transform is `Rz * Ry * Rx`.
//!
//! # Scalar helpers
//!
//! | Function | Shape |
//! |----------|-------|
//! | [`clamp01`] | clamp into `[0, 1]` |
//! | [`mix`] | linear interpolation |
//! | [`smoothstep`] | Hermite step between two edges |
//! | [`smooth01`] | `t*t*(3-2t)` on a pre-clamped parameter |
//! | [`ease_cos`] | `0.5 - 0.5*cos(pi*u)` |
//! | [`alpha_envelope`] | `sin(pi*u)`, zero at both ends |

use glam::{Mat3, Vec3};
use std::f32::consts::PI;

/// Clamp a value into `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Linear interpolation from `a` to `b`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep between `edge0` and `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = clamp01((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep on an already normalized parameter.
#[inline]
pub fn smooth01(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}

/// Cosine ease-in-out, monotone on `[0, 1]` with `0 -> 0` and `1 -> 1`.
#[inline]
pub fn ease_cos(u: f32) -> f32 {
    0.5 - 0.5 * (PI * clamp01(u)).cos()
}

/// Bell envelope `sin(pi*u)`: 0 at birth and completion, 1 at the midpoint.
#[inline]
pub fn alpha_envelope(u: f32) -> f32 {
    (PI * clamp01(u)).sin().max(0.0)
}

/// Degrees to radians.
#[inline]
pub fn deg(d: f32) -> f32 {
    d.to_radians()
}

/// Normalize, treating a zero-length vector as length 1.
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len == 0.0 {
        v
    } else {
        v / len
    }
}

/// Rotation about +X.
#[inline]
pub fn rotate_x(v: Vec3, angle: f32) -> Vec3 {
    Mat3::from_rotation_x(angle) * v
}

/// Rotation about +Y.
#[inline]
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    Mat3::from_rotation_y(angle) * v
}

/// Rotation about +Z.
#[inline]
pub fn rotate_z(v: Vec3, angle: f32) -> Vec3 {
    Mat3::from_rotation_z(angle) * v
}

/// Matrix for Euler angles applied X, then Y, then Z.
#[inline]
pub fn euler_matrix(angles: Vec3) -> Mat3 {
    Mat3::from_rotation_z(angles.z)
        * Mat3::from_rotation_y(angles.y)
        * Mat3::from_rotation_x(angles.x)
}

/// Rotate `v` by Euler angles (radians) in X, Y, Z order.
#[inline]
pub fn apply_euler(v: Vec3, angles: Vec3) -> Vec3 {
    euler_matrix(angles) * v
}

/// Plane normal for an Euler pose: `+Y` rotated and normalized.
#[inline]
pub fn normal_from_euler(angles: Vec3) -> Vec3 {
    safe_normalize(apply_euler(Vec3::Y, angles))
}

/// Orthonormal tangent basis `(u, v)` spanning the plane with normal `n`.
///
/// The reference axis is the world axis least aligned with `n`, so the basis
/// stays well conditioned for any orientation.
pub fn plane_basis(n: Vec3) -> (Vec3, Vec3) {
    let a = n.abs();
    let reference = if a.x < a.y && a.x < a.z {
        Vec3::X
    } else if a.y < a.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let u = safe_normalize(reference.cross(n));
    let v = n.cross(u);
    (u, v)
}

/// Polar angle of `p` around `center` inside the plane basis `(u, v)`.
#[inline]
pub fn angle_in_plane(p: Vec3, center: Vec3, u: Vec3, v: Vec3) -> f32 {
    let r = p - center;
    r.dot(v).atan2(r.dot(u))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_rotation_axes() {
        let v = rotate_x(Vec3::Y, PI / 2.0);
        assert!(v.abs_diff_eq(Vec3::Z, 1e-6));
        let v = rotate_y(Vec3::Z, PI / 2.0);
        assert!(v.abs_diff_eq(Vec3::X, 1e-6));
        let v = rotate_z(Vec3::X, PI / 2.0);
        assert!(v.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_apply_euler_order() {
        let angles = Vec3::new(0.3, -1.1, 2.0);
        let v = Vec3::new(1.0, 2.0, -0.5);
        let manual = rotate_z(rotate_y(rotate_x(v, angles.x), angles.y), angles.z);
        assert!(apply_euler(v, angles).abs_diff_eq(manual, 1e-5));
    }

    #[test]
    fn test_apply_euler_preserves_norm() {
        for i in 0..32 {
            let f = i as f32;
            let v = Vec3::new(f.sin() * 40.0, f.cos() * 13.0, 7.0 - f);
            let angles = Vec3::new(f * 0.37, f * -1.3, f * 2.9);
            assert!(approx(apply_euler(v, angles).length() / v.length(), 1.0));
        }
    }

    #[test]
    fn test_normal_from_euler() {
        assert!(normal_from_euler(Vec3::ZERO).abs_diff_eq(Vec3::Y, 1e-6));
        let n = normal_from_euler(Vec3::new(0.4, 1.2, -0.7));
        assert!(approx(n.length(), 1.0));
    }

    #[test]
    fn test_safe_normalize_zero() {
        assert_eq!(safe_normalize(Vec3::ZERO), Vec3::ZERO);
        let n = safe_normalize(Vec3::new(0.0, 3.0, 4.0));
        assert!(n.abs_diff_eq(Vec3::new(0.0, 0.6, 0.8), 1e-6));
    }

    #[test]
    fn test_plane_basis_orthonormal() {
        for n in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 1.0, 1.0).normalize()] {
            let (u, v) = plane_basis(n);
            assert!(approx(u.length(), 1.0));
            assert!(approx(v.length(), 1.0));
            assert!(approx(u.dot(n), 0.0));
            assert!(approx(v.dot(n), 0.0));
            assert!(approx(u.dot(v), 0.0));
        }
    }

    #[test]
    fn test_alpha_envelope() {
        assert!(approx(alpha_envelope(0.0), 0.0));
        assert!(approx(alpha_envelope(1.0), 0.0));
        assert!(approx(alpha_envelope(0.5), 1.0));
    }

    #[test]
    fn test_ease_cos_monotone() {
        assert!(approx(ease_cos(0.0), 0.0));
        assert!(approx(ease_cos(1.0), 1.0));
        let mut prev = 0.0;
        for i in 0..=100 {
            let e = ease_cos(i as f32 / 100.0);
            assert!(e >= prev);
            prev = e;
        }
        assert_eq!(ease_cos(-3.0), 0.0);
        assert_eq!(ease_cos(7.0), 1.0);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(-1.0, 1.0, -2.0), 0.0);
        assert_eq!(smoothstep(-1.0, 1.0, 2.0), 1.0);
        assert!(approx(smoothstep(-1.0, 1.0, 0.0), 0.5));
        assert!(approx(smooth01(0.5), 0.5));
    }
}
