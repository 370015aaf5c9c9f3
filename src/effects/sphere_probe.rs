//! A single collision sphere, painted once.
//!
//! Useful for checking host positions: every panel inside the sphere takes
//! `hit`, everything else `base`. The sphere sits at `center` or, when a
//! [`GuidePath`] is attached, at `path_t` along that path.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::Sphere;
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame};
use crate::dome::GuidePath;
use crate::effect::{Effect, EffectMeta};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::Host;

use super::{Stage, PLANE_FALLBACK_RADIUS};

/// Settings for [`SphereProbe`]. Positions are in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereProbeConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub center: Vec3,
    pub radius: f32,
    pub path: Option<GuidePath>,
    /// Progress along `path`, 0 to 1.
    pub path_t: f32,
    pub hit: Rgba,
    pub base: Rgba,
}

impl Default for SphereProbeConfig {
    fn default() -> Self {
        Self::collision_test()
    }
}

impl SphereProbeConfig {
    // ===== PRESETS =====

    pub fn collision_test() -> Self {
        Self {
            name: "Collision test".into(),
            fps: 60,
            duration: 0.01,
            center: Vec3::new(68.36, 0.0, 0.0),
            radius: 35.0,
            path: None,
            path_t: 0.0,
            hit: Rgba::GREEN,
            base: Rgba::WHITE,
        }
    }

    /// Where the sphere sits.
    pub fn position(&self) -> Vec3 {
        match &self.path {
            Some(path) => path.point_at(self.path_t),
            None => self.center,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("sphere_probe", "radius", self.radius)?;
        if !self.position().is_finite() {
            return Err(RippError::invalid("sphere_probe", "sphere position is not finite"));
        }
        Ok(())
    }
}

/// Static sphere hit test.
#[derive(Debug)]
pub struct SphereProbe {
    config: SphereProbeConfig,
    stage: Stage,
    hits: usize,
}

impl SphereProbe {
    pub fn new(config: SphereProbeConfig) -> Self {
        Self {
            config,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            hits: 0,
        }
    }

    /// Panels inside the sphere at the last `init`.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

impl Effect for SphereProbe {
    fn meta(&self) -> EffectMeta {
        EffectMeta::new(
            &self.config.name,
            self.config.fps,
            self.config.duration,
            BlendPolicy::Override,
        )
    }

    fn init(&mut self, host: &mut dyn Host) {
        self.stage.capture(host);
        host.reset_colors_to(self.config.base);

        let sphere = Sphere::new(self.config.position(), self.config.radius);
        let mut frame = Frame::default();
        for s in self.stage.samples.iter().filter(|s| sphere.contains(s.position)) {
            frame.set(s.id, self.config.hit);
        }
        self.hits = frame.len();
        debug!(hits = self.hits, at = ?sphere.center, "sphere probe painted");
        frame.commit(host);
    }

    fn update(&mut self, _host: &mut dyn Host, _t: f32, _dt: f32) {}
}
