//! Slab-around-a-plane hit test, painted as hit or base on every panel.
//!
//! The diagnostic variant holds a static pose; the animated variants tilt,
//! spin, sweep and tumble the plane through a [`PlaneMotion`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collision::Plane;
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame};
use crate::effect::{Effect, EffectMeta};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::Host;
use crate::motion::{PlaneMotion, Sweep};

use super::{now_ms, Stage, PLANE_FALLBACK_RADIUS};

/// Settings for a [`PlaneProbe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneProbeConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    /// Half-width of the hit slab in world units. The boundary counts as a hit.
    pub half_thickness: f32,
    pub hit: Rgba,
    pub base: Rgba,
    pub motion: PlaneMotion,
}

impl Default for PlaneProbeConfig {
    fn default() -> Self {
        Self::plane_base()
    }
}

impl PlaneProbeConfig {
    // ===== PRESETS =====

    /// Static mid-dome plane, red on hit.
    pub fn plane_base() -> Self {
        Self {
            name: "Planewave diagnostic (mid-plane, red on hit)".into(),
            fps: 60,
            duration: 120.0,
            half_thickness: 2.5,
            hit: Rgba::RED,
            base: Rgba::WHITE,
            motion: PlaneMotion::tilted(Vec3::ZERO),
        }
    }

    /// 15 degree tilt spinning once every 3 s.
    pub fn wave_5() -> Self {
        Self {
            name: "Planewave tilt 15, spin 3s (red on hit)".into(),
            fps: 30,
            motion: PlaneMotion::tilted_x(15.0).spinning(3000.0),
            ..Self::plane_base()
        }
    }

    /// 25 degree tilt, 2 s spin, diagonal sweep and a quarter-turn tumble.
    pub fn wave_6() -> Self {
        Self {
            name: "Planewave tilt 25, spin 2s, XY sweep + Z tumble (red on hit)".into(),
            fps: 30,
            motion: PlaneMotion::tilted_x(25.0)
                .spinning(2000.0)
                .resting_at(Vec3::new(-70.0, -57.0, 0.0))
                .sweeping(Sweep::new(70.0, -70.0, 3000.0), Sweep::new(-57.0, 57.0, 3000.0))
                .tumbling(90.0, 3000.0),
            ..Self::plane_base()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.half_thickness.is_finite() && self.half_thickness >= 0.0) {
            return Err(RippError::invalid(
                "plane_probe",
                format!("`half_thickness` must be non-negative, got {}", self.half_thickness),
            ));
        }
        if let Some(period) = self.motion.spin_period_ms {
            ensure_positive("plane_probe", "spin_period_ms", period)?;
        }
        Ok(())
    }
}

/// Paints `hit` inside the slab and `base` everywhere else.
#[derive(Debug)]
pub struct PlaneProbe {
    config: PlaneProbeConfig,
    stage: Stage,
    plane: Plane,
    started: Option<f32>,
}

impl PlaneProbe {
    pub fn new(config: PlaneProbeConfig) -> Self {
        Self {
            config,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            plane: Plane::new(Vec3::ZERO, Vec3::Y),
            started: None,
        }
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    fn paint(&self, host: &mut dyn Host) {
        let mut frame = Frame::with_capacity(self.stage.samples.len());
        let mut hits = 0usize;
        for s in &self.stage.samples {
            if self.plane.in_band(s.position, self.config.half_thickness) {
                hits += 1;
                frame.set(s.id, self.config.hit);
            } else {
                frame.set(s.id, self.config.base);
            }
        }
        trace!(hits, "plane probe frame");
        frame.commit(host);
    }
}

impl Effect for PlaneProbe {
    fn meta(&self) -> EffectMeta {
        EffectMeta::new(
            &self.config.name,
            self.config.fps,
            self.config.duration,
            BlendPolicy::Override,
        )
    }

    fn init(&mut self, host: &mut dyn Host) {
        host.reset_colors_to(self.config.base);
        self.stage.capture(host);
        self.plane = self.config.motion.rest(self.stage.center());
        self.started = None;
        debug!(panels = self.stage.samples.len(), "plane probe ready");
        self.paint(host);
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, _dt: f32) {
        if self.config.motion.is_static() {
            return;
        }
        let now = now_ms(t);
        let t0 = *self.started.get_or_insert(now);
        self.plane = self.config.motion.pose(self.stage.center(), now - t0, now);
        self.paint(host);
    }
}
