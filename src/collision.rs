//! Geometric hit tests between moving primitives and panel positions.
//!
//! # Primitives
//!
//! | Type | Test |
//! |------|------|
//! | [`Plane::in_band`] | `|d| <= half_thickness`, boundary inclusive |
//! | [`Sphere::contains`] | `hypot(dx/h, dy, dz/h) <= r` |
//! | [`SoftEdge::profile`] | signed distance with optional ripple and feather |
//!
//! Side-of-plane painting reads an [`EdgeProfile`] through
//! [`EdgeProfile::blend`] (0 on the negative side, 1 on the positive side),
//! and [`is_monochrome`] tells when every sample has crossed to one side.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::math::{plane_basis, safe_normalize, smoothstep};

/// Oriented plane through `point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    /// Unit normal.
    pub normal: Vec3,
}

impl Plane {
    /// Plane with a normalized copy of `normal`.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: safe_normalize(normal),
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }

    /// True when `p` lies inside the slab of half-width `half_thickness`.
    #[inline]
    pub fn in_band(&self, p: Vec3, half_thickness: f32) -> bool {
        self.signed_distance(p).abs() <= half_thickness
    }
}

/// Sphere, optionally squashed horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    /// Divides the X and Z offsets; `1.0` is a round sphere, below 1 narrows it.
    pub horizontal_scale: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            horizontal_scale: 1.0,
        }
    }

    pub fn squashed(mut self, horizontal_scale: f32) -> Self {
        self.horizontal_scale = if horizontal_scale > 0.0 { horizontal_scale } else { 1.0 };
        self
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        let d = p - self.center;
        let h = self.horizontal_scale;
        Vec3::new(d.x / h, d.y, d.z / h).length() <= self.radius
    }
}

/// Angular undulation of a plane edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ripple {
    /// Peak offset along the normal, world units.
    pub amplitude: f32,
    /// Extra feather per unit of `|ripple|`.
    pub feather_gain: f32,
    /// Crests per revolution in the plane's tangent basis.
    pub cycles: f32,
    /// Phase speed in Hz.
    pub speed_hz: f32,
}

/// Edge treatment for side-of-plane painting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftEdge {
    /// Half-width of the blend band; `0` paints a hard split.
    pub feather: f32,
    #[serde(default)]
    pub ripple: Option<Ripple>,
}

/// Effective distance and local feather for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProfile {
    pub distance: f32,
    pub feather: f32,
}

impl EdgeProfile {
    /// 0 on the negative side, 1 on the positive side.
    ///
    /// A hard edge puts `distance == 0` on the positive side.
    #[inline]
    pub fn blend(&self) -> f32 {
        if self.feather > 0.0 {
            smoothstep(-self.feather, self.feather, self.distance)
        } else if self.distance >= 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

impl SoftEdge {
    pub const HARD: SoftEdge = SoftEdge {
        feather: 0.0,
        ripple: None,
    };

    pub fn feathered(feather: f32) -> Self {
        Self {
            feather,
            ripple: None,
        }
    }

    pub fn with_ripple(mut self, ripple: Ripple) -> Self {
        self.ripple = Some(ripple);
        self
    }

    /// Profile of `p` against `plane` at `time_sec`.
    pub fn profile(&self, plane: &Plane, p: Vec3, time_sec: f32) -> EdgeProfile {
        let r = p - plane.point;
        let raw = r.dot(plane.normal);
        match self.ripple {
            None => EdgeProfile {
                distance: raw,
                feather: self.feather,
            },
            Some(rp) => {
                let (u, v) = plane_basis(plane.normal);
                let theta = r.dot(v).atan2(r.dot(u));
                let phase = TAU * rp.speed_hz * time_sec;
                let ripple = rp.amplitude * (theta * rp.cycles + phase).sin();
                EdgeProfile {
                    distance: raw - ripple,
                    feather: self.feather + rp.feather_gain * ripple.abs(),
                }
            }
        }
    }
}

/// How points inside the blend band count toward monochrome detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BandRule {
    /// Points within the feather band are ignored.
    Ignore,
    /// Points within `feather + epsilon` block monochrome.
    Block { epsilon: f32 },
}

/// True when every counted profile lies on the same side of the edge.
pub fn is_monochrome(profiles: impl IntoIterator<Item = EdgeProfile>, rule: BandRule) -> bool {
    let (mut pos, mut neg) = (false, false);
    for p in profiles {
        let band = match rule {
            BandRule::Ignore => p.feather.max(0.0),
            BandRule::Block { epsilon } => p.feather + epsilon,
        };
        if p.distance > band {
            pos = true;
        } else if p.distance < -band {
            neg = true;
        } else if matches!(rule, BandRule::Block { .. }) {
            return false;
        }
        if pos && neg {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundary_inclusive() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y);
        assert!(plane.in_band(Vec3::new(3.0, 2.5, -1.0), 2.5));
        assert!(plane.in_band(Vec3::new(0.0, -2.5, 0.0), 2.5));
        assert!(!plane.in_band(Vec3::new(0.0, 2.50001, 0.0), 2.5));
    }

    #[test]
    fn test_plane_normalizes() {
        let plane = Plane::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(plane.signed_distance(Vec3::new(9.0, 9.0, -2.0)), -2.0);
    }

    #[test]
    fn test_sphere_squash() {
        let round = Sphere::new(Vec3::ZERO, 10.0);
        assert!(round.contains(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!round.contains(Vec3::new(12.0, 0.0, 0.0)));
        let wide = round.squashed(0.7);
        assert!(wide.contains(Vec3::new(6.9, 0.0, 0.0)));
        assert!(wide.contains(Vec3::new(0.0, 10.0, 0.0)));
        assert!(!wide.contains(Vec3::new(7.1, 0.0, 0.0)));
    }

    #[test]
    fn test_hard_edge_blend() {
        let p = SoftEdge::HARD.profile(&Plane::new(Vec3::ZERO, Vec3::Y), Vec3::ZERO, 0.0);
        assert_eq!(p.blend(), 1.0);
        let p = SoftEdge::HARD.profile(&Plane::new(Vec3::ZERO, Vec3::Y), -Vec3::Y, 0.0);
        assert_eq!(p.blend(), 0.0);
    }

    #[test]
    fn test_feather_blend_midpoint() {
        let edge = SoftEdge::feathered(2.5);
        let plane = Plane::new(Vec3::ZERO, Vec3::Y);
        assert!((edge.profile(&plane, Vec3::ZERO, 0.0).blend() - 0.5).abs() < 1e-6);
        assert_eq!(edge.profile(&plane, Vec3::Y * 3.0, 0.0).blend(), 1.0);
        assert_eq!(edge.profile(&plane, Vec3::Y * -3.0, 0.0).blend(), 0.0);
    }

    #[test]
    fn test_ripple_bounds() {
        let ripple = Ripple {
            amplitude: 3.0,
            feather_gain: 0.75,
            cycles: 4.2,
            speed_hz: 0.06,
        };
        let edge = SoftEdge::feathered(2.5).with_ripple(ripple);
        let plane = Plane::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.2, 1.0, 0.1));
        for i in 0..64 {
            let a = i as f32 * 0.3;
            let p = plane.point + Vec3::new(a.cos() * 40.0, 5.0, a.sin() * 40.0);
            let prof = edge.profile(&plane, p, i as f32 * 0.1);
            let raw = plane.signed_distance(p);
            let ripple = raw - prof.distance;
            assert!(ripple.abs() <= 3.0 + 1e-4);
            assert!((prof.feather - (2.5 + 0.75 * ripple.abs())).abs() < 1e-4);
        }
    }

    #[test]
    fn test_monochrome_rules() {
        let prof = |d: f32, f: f32| EdgeProfile { distance: d, feather: f };
        assert!(is_monochrome([prof(1.0, 0.0), prof(0.0, 0.0), prof(4.0, 0.0)], BandRule::Ignore));
        assert!(!is_monochrome([prof(1.0, 0.0), prof(-1.0, 0.0)], BandRule::Ignore));
        assert!(is_monochrome([prof(5.0, 2.5), prof(2.0, 2.5)], BandRule::Ignore));
        let block = BandRule::Block { epsilon: 0.25 };
        assert!(!is_monochrome([prof(5.0, 2.5), prof(2.6, 2.5)], block));
        assert!(is_monochrome([prof(5.0, 2.5), prof(2.8, 2.5)], block));
        assert!(is_monochrome(std::iter::empty::<EdgeProfile>(), block));
    }
}
