//! Slowly drifting two-color gradient painted under travelling bands.
//!
//! Two [`ColorLane`]s each ease between palette colors on long random
//! schedules. A sample's base color mixes lane A and lane B along an axis
//! that itself rotates slowly, so the field never pops and never washes out
//! to grey.
//!
//! ```ignore
//! let mut underlay = GradientUnderlay::new(palette, GradientConfig::default(), &mut ctx);
//! underlay.advance(t, &mut ctx);
//! let base = underlay.color_at(sample.position, &dome);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::{Grade, Rgba};
use crate::host::DomeInfo;
use crate::math::{apply_euler, ease_cos, safe_normalize};
use crate::palette::Palette;
use crate::spawn::SpawnContext;

/// Retarget tries before accepting a color close to the current one.
const RETARGET_TRIES: usize = 8;
/// Manhattan RGB distance a new target should exceed.
const RETARGET_MIN_DISTANCE: f32 = 0.15;
/// Per-axis multipliers on the axis rotation rate.
const AXIS_RATES: Vec3 = Vec3::new(0.15, 0.11, 0.09);

/// Tunables for a [`GradientUnderlay`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Retarget interval range of lane A, seconds.
    pub lane_a: (f32, f32),
    /// Retarget interval range of lane B, seconds.
    pub lane_b: (f32, f32),
    pub axis_rate: f32,
    /// Spatial frequency, scaled by `1 / radius`.
    pub space_freq: f32,
    /// Optional darken/gamma/clamp applied to the mixed color.
    pub grade: Option<Grade>,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            lane_a: (14.0, 28.0),
            lane_b: (18.0, 36.0),
            axis_rate: 0.05,
            space_freq: 1.35,
            grade: None,
        }
    }
}

/// One color easing toward a target.
///
/// Before its first retarget the lane simply holds `current`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLane {
    pub current: Rgba,
    pub from: Option<Rgba>,
    pub to: Option<Rgba>,
    pub blend_start: f32,
    pub duration: f32,
    pub next_retarget: f32,
    interval: (f32, f32),
}

impl ColorLane {
    pub fn new(current: Rgba, initial_duration: f32, interval: (f32, f32)) -> Self {
        Self {
            current,
            from: None,
            to: None,
            blend_start: 0.0,
            duration: initial_duration,
            next_retarget: 0.0,
            interval,
        }
    }

    /// Retarget when due, then recompute `current` for time `t`.
    pub fn advance(&mut self, t: f32, palette: &Palette, ctx: &mut SpawnContext) {
        if t >= self.next_retarget {
            self.from = Some(self.current);
            self.to = Some(pick_distinct(self.current, palette, ctx));
            self.blend_start = t;
            self.duration = ctx.random_range(self.interval.0, self.interval.1);
            self.next_retarget = self.blend_start + self.duration;
        }
        let u = if self.duration > 0.0 {
            ease_cos((t - self.blend_start) / self.duration)
        } else {
            1.0
        };
        let from = self.from.unwrap_or(self.current);
        let to = self.to.unwrap_or(self.current);
        self.current = from.lerp_opaque(to, u);
    }
}

/// Draw from `palette`, re-rolling a bounded number of times while the pick
/// is within [`RETARGET_MIN_DISTANCE`] of `current`.
fn pick_distinct(current: Rgba, palette: &Palette, ctx: &mut SpawnContext) -> Rgba {
    let mut c = palette.pick(ctx);
    for _ in 0..RETARGET_TRIES {
        if c.rgb_distance(current) > RETARGET_MIN_DISTANCE {
            break;
        }
        c = palette.pick(ctx);
    }
    c
}

/// Two lanes blended across space.
#[derive(Debug, Clone)]
pub struct GradientUnderlay {
    palette: Palette,
    config: GradientConfig,
    a: ColorLane,
    b: ColorLane,
    axis_phase: Vec3,
    axis: Vec3,
}

impl GradientUnderlay {
    pub fn new(palette: Palette, config: GradientConfig, ctx: &mut SpawnContext) -> Self {
        let a = ColorLane::new(palette.pick(ctx), 12.0, config.lane_a);
        let b = ColorLane::new(palette.pick(ctx), 16.0, config.lane_b);
        let axis_phase = Vec3::new(
            ctx.random_range(0.0, 6.283),
            ctx.random_range(0.0, 6.283),
            ctx.random_range(0.0, 6.283),
        );
        Self {
            palette,
            config,
            a,
            b,
            axis_phase,
            axis: safe_normalize(apply_euler(Vec3::X, axis_phase)),
        }
    }

    /// Advance both lanes and the axis to time `t`. Call once per frame.
    pub fn advance(&mut self, t: f32, ctx: &mut SpawnContext) {
        self.a.advance(t, &self.palette, ctx);
        self.b.advance(t, &self.palette, ctx);
        let angles = self.axis_phase + AXIS_RATES * (t * self.config.axis_rate);
        self.axis = safe_normalize(apply_euler(Vec3::X, angles));
    }

    /// Opaque base color at `p` for the current frame.
    pub fn color_at(&self, p: Vec3, dome: &DomeInfo) -> Rgba {
        let radius = if dome.radius > 0.0 { dome.radius } else { 1.0 };
        let k = self.config.space_freq / radius;
        let u = 0.5 + 0.5 * ((p - dome.center).dot(self.axis) * k).sin();
        let c = self.a.current.lerp_opaque(self.b.current, u);
        match self.config.grade {
            Some(grade) => grade.apply(c),
            None => c,
        }
    }

    pub fn lanes(&self) -> (&ColorLane, &ColorLane) {
        (&self.a, &self.b)
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }
}
