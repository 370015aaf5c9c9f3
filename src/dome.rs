//! Dome-relative geometry: meridians, guide segments and object paths.
//!
//! Every path here is parametrised by a normalized `t` in `[0, 1]`; values
//! outside are clamped.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::host::DomeInfo;
use crate::math::{apply_euler, clamp01, deg, safe_normalize};

/// Point on the dome surface along a meridian.
///
/// `s = 0` is the crown (`+Y`), `s = 1` the bottom (`-Y`). `azimuth` picks the
/// meridian, measured from `+Z` toward `+X`.
pub fn meridian_point(dome: &DomeInfo, s: f32, azimuth: f32) -> Vec3 {
    let theta = PI / 2.0 - PI * s;
    let r_hor = dome.radius * theta.cos();
    Vec3::new(
        dome.center.x + r_hor * azimuth.sin(),
        dome.center.y + dome.radius * theta.sin(),
        dome.center.z + r_hor * azimuth.cos(),
    )
}

/// Centroid and median distance of a point cloud.
///
/// Returns `None` when there are no finite points.
pub fn estimate_dome(points: impl IntoIterator<Item = Vec3>) -> Option<DomeInfo> {
    let points: Vec<Vec3> = points.into_iter().filter(|p| p.is_finite()).collect();
    if points.is_empty() {
        return None;
    }
    let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
    let mut dist: Vec<f32> = points.iter().map(|p| (*p - center).length()).collect();
    dist.sort_by(|a, b| a.total_cmp(b));
    let mid = dist.len() / 2;
    let median = if dist.len() % 2 == 1 {
        dist[mid]
    } else {
        0.5 * (dist[mid - 1] + dist[mid])
    };
    let radius = if median > 0.0 { median } else { 1.0 };
    Some(DomeInfo::new(center, radius))
}

/// Straight segment through the dome center that rotates with an Euler pose.
///
/// The rest pose lies along X, spans `0.8 * radius` on each side and is
/// extended at both ends by `extend`.
#[derive(Debug, Clone, Copy)]
pub struct GuideSegment {
    center: Vec3,
    start: Vec3,
    end: Vec3,
}

/// A [`GuideSegment`] evaluated at one pose.
#[derive(Debug, Clone, Copy)]
pub struct PosedSegment {
    pub start: Vec3,
    /// Unit direction from start to end.
    pub dir: Vec3,
    pub length: f32,
}

impl PosedSegment {
    /// Point at fraction `u` of the way from start to end.
    #[inline]
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.start + self.dir * (u * self.length)
    }
}

impl GuideSegment {
    pub fn new(dome: &DomeInfo, extend: f32) -> Self {
        let half = 0.8 * dome.radius + extend;
        Self {
            center: dome.center,
            start: Vec3::new(-half, 0.0, 0.0),
            end: Vec3::new(half, 0.0, 0.0),
        }
    }

    pub fn posed(&self, angles: Vec3) -> PosedSegment {
        let s = self.center + apply_euler(self.start, angles);
        let e = self.center + apply_euler(self.end, angles);
        let seg = e - s;
        PosedSegment {
            start: s,
            dir: safe_normalize(seg),
            length: seg.length(),
        }
    }
}

/// Path an object can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GuidePath {
    /// Circular arc around `center` in the plane with normal `normal`.
    Orbit {
        center: Vec3,
        normal: Vec3,
        radius: f32,
        start_deg: f32,
        end_deg: f32,
    },
    Line { start: Vec3, end: Vec3 },
    /// Quadratic Bezier.
    Curve { start: Vec3, control: Vec3, end: Vec3 },
}

impl GuidePath {
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t = clamp01(t);
        match *self {
            GuidePath::Orbit {
                center,
                normal,
                radius,
                start_deg,
                end_deg,
            } => {
                let n = safe_normalize(normal);
                let helper = if n.dot(Vec3::Y).abs() > 0.999 { Vec3::X } else { Vec3::Y };
                let u = safe_normalize(n.cross(helper));
                let v = safe_normalize(n.cross(u));
                let ang = deg(start_deg + (end_deg - start_deg) * t);
                center + u * (ang.cos() * radius) + v * (ang.sin() * radius)
            }
            GuidePath::Line { start, end } => start + (end - start) * t,
            GuidePath::Curve {
                start,
                control,
                end,
            } => {
                let u = 1.0 - t;
                start * (u * u) + control * (2.0 * u * t) + end * (t * t)
            }
        }
    }
}
