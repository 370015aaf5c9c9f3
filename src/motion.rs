//! Keyframe-free pose driver for the moving plane effects.
//!
//! A [`PlaneMotion`] composes up to four independent motions into one plane
//! pose, all measured in milliseconds:
//!
//! | Motion | Drives | Shape |
//! |--------|--------|-------|
//! | tilt | fixed Euler pose | constant |
//! | spin | Y rotation | `2pi * (spin_ms % period) / period` |
//! | sweep | plane point X and Y offsets | linear over `ms`, then held |
//! | tumble | Z rotation | `deg * clamp(elapsed / ms)` |
//!
//! The normal is `+Y` rotated by `tilt + (0, spin, tumble)` in X, Y, Z order.
//!
//! ```ignore
//! let motion = PlaneMotion::tilted_x(25.0).spinning(2000.0).tumbling(90.0, 2500.0);
//! let plane = motion.pose(dome.center, elapsed_ms, spin_ms);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::collision::Plane;
use crate::math::{clamp01, deg, mix, normal_from_euler};

/// Linear move of one offset from `from` to `to` over `ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub from: f32,
    pub to: f32,
    pub ms: f32,
}

impl Sweep {
    pub const fn new(from: f32, to: f32, ms: f32) -> Self {
        Self { from, to, ms }
    }

    #[inline]
    pub fn at(&self, elapsed_ms: f32) -> f32 {
        mix(self.from, self.to, ramp(elapsed_ms, self.ms))
    }
}

/// Z rotation growing from 0 to `deg` over `ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tumble {
    pub deg: f32,
    pub ms: f32,
}

/// Zero-length ramps complete immediately.
#[inline]
fn ramp(elapsed_ms: f32, ms: f32) -> f32 {
    if ms > 0.0 {
        clamp01(elapsed_ms / ms)
    } else {
        1.0
    }
}

/// Combined tilt, spin, sweep and tumble of a plane around the dome center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneMotion {
    /// Fixed Euler pose in degrees.
    pub tilt_deg: Vec3,
    /// Full Y revolution period; `None` disables the spin.
    pub spin_period_ms: Option<f32>,
    /// Plane point offset from the center at rest. Swept axes override it.
    pub rest_offset: Vec3,
    pub sweep_x: Option<Sweep>,
    pub sweep_y: Option<Sweep>,
    pub tumble: Option<Tumble>,
}

impl Default for PlaneMotion {
    fn default() -> Self {
        Self {
            tilt_deg: Vec3::ZERO,
            spin_period_ms: None,
            rest_offset: Vec3::ZERO,
            sweep_x: None,
            sweep_y: None,
            tumble: None,
        }
    }
}

impl PlaneMotion {
    /// Static plane through the center with an Euler pose in degrees.
    pub fn tilted(tilt_deg: Vec3) -> Self {
        Self {
            tilt_deg,
            ..Default::default()
        }
    }

    pub fn tilted_x(deg: f32) -> Self {
        Self::tilted(Vec3::new(deg, 0.0, 0.0))
    }

    pub fn spinning(mut self, period_ms: f32) -> Self {
        self.spin_period_ms = Some(period_ms);
        self
    }

    pub fn resting_at(mut self, offset: Vec3) -> Self {
        self.rest_offset = offset;
        self
    }

    pub fn sweeping(mut self, x: Sweep, y: Sweep) -> Self {
        self.sweep_x = Some(x);
        self.sweep_y = Some(y);
        self
    }

    pub fn tumbling(mut self, deg: f32, ms: f32) -> Self {
        self.tumble = Some(Tumble { deg, ms });
        self
    }

    /// True when the pose never changes.
    pub fn is_static(&self) -> bool {
        self.spin_period_ms.is_none()
            && self.sweep_x.is_none()
            && self.sweep_y.is_none()
            && self.tumble.is_none()
    }

    /// Y rotation after `spin_ms` of spinning.
    #[inline]
    pub fn spin_angle(&self, spin_ms: f32) -> f32 {
        match self.spin_period_ms {
            Some(period) if period > 0.0 => TAU * spin_ms.rem_euclid(period) / period,
            _ => 0.0,
        }
    }

    /// Rest pose: plane at `center + rest_offset` with only the tilt applied.
    pub fn rest(&self, center: Vec3) -> Plane {
        Plane::new(center + self.rest_offset, normal_from_euler(self.tilt_radians()))
    }

    fn tilt_radians(&self) -> Vec3 {
        Vec3::new(deg(self.tilt_deg.x), deg(self.tilt_deg.y), deg(self.tilt_deg.z))
    }

    /// Pose after `elapsed_ms` of sweep and tumble and `spin_ms` of spin.
    pub fn pose(&self, center: Vec3, elapsed_ms: f32, spin_ms: f32) -> Plane {
        let x = self.sweep_x.map_or(self.rest_offset.x, |s| s.at(elapsed_ms));
        let y = self.sweep_y.map_or(self.rest_offset.y, |s| s.at(elapsed_ms));
        let rz = self
            .tumble
            .map_or(0.0, |t| deg(t.deg * ramp(elapsed_ms, t.ms)));
        let angles = self.tilt_radians() + Vec3::new(0.0, self.spin_angle(spin_ms), rz);
        Plane::new(center + Vec3::new(x, y, self.rest_offset.z), normal_from_euler(angles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_holds_at_end() {
        let s = Sweep::new(70.0, -70.0, 3000.0);
        assert_eq!(s.at(0.0), 70.0);
        assert_eq!(s.at(1500.0), 0.0);
        assert_eq!(s.at(9000.0), -70.0);
        assert_eq!(Sweep::new(1.0, 2.0, 0.0).at(0.0), 2.0);
    }

    #[test]
    fn test_rest_pose_uses_tilt_only() {
        let motion = PlaneMotion::tilted_x(25.0)
            .spinning(2000.0)
            .resting_at(Vec3::new(70.0, -57.0, 0.0))
            .tumbling(90.0, 3000.0);
        let plane = motion.rest(Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(plane.point, Vec3::new(70.0, -47.0, 0.0));
        assert!(plane.normal.x.abs() < 1e-6);
        assert!((plane.normal.y - deg(25.0).cos()).abs() < 1e-5);
    }

    #[test]
    fn test_spin_wraps() {
        let motion = PlaneMotion::tilted_x(15.0).spinning(3000.0);
        assert!(motion.spin_angle(0.0).abs() < 1e-6);
        assert!((motion.spin_angle(750.0) - TAU / 4.0).abs() < 1e-5);
        assert!((motion.spin_angle(3750.0) - TAU / 4.0).abs() < 1e-4);
        assert_eq!(PlaneMotion::tilted_x(15.0).spin_angle(500.0), 0.0);
    }

    #[test]
    fn test_pose_normal_is_unit() {
        let motion = PlaneMotion::tilted_x(20.0)
            .spinning(2000.0)
            .sweeping(Sweep::new(70.0, -70.0, 2700.0), Sweep::new(-57.0, 57.0, 2900.0))
            .tumbling(90.0, 3000.0);
        for i in 0..40 {
            let ms = i as f32 * 123.0;
            let p = motion.pose(Vec3::ZERO, ms, ms);
            assert!((p.normal.length() - 1.0).abs() < 1e-5);
        }
        let end = motion.pose(Vec3::ZERO, 10_000.0, 0.0);
        assert_eq!(end.point, Vec3::new(-70.0, 57.0, 0.0));
        // tilt then a full 90 degree Z tumble tips +Y onto -X
        assert!(end.normal.x < -0.9);
    }
}
