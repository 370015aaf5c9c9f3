//! A horizontal slab that drops through the dome once per loop.
//!
//! For the first `drop_secs` of every `loop_secs` the slab eases from above
//! the crown to below the bottom pole, tinting panels it passes. A
//! translucent overlay plane follows it when the host has an overlay; the
//! plane is hidden and parked at the top between drops.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame};
use crate::effect::{Effect, EffectMeta};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::{Host, OverlayHandle, OverlayPlane};
use crate::math::{mix, smooth01};

use super::{Stage, PLANE_FALLBACK_RADIUS};

/// Settings for [`Cascade`]. Heights and widths are fractions of the dome
/// radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub loop_secs: f32,
    pub drop_secs: f32,
    /// Slab start height above the center.
    pub start: f32,
    /// Slab end height; negative is below the center.
    pub end: f32,
    /// Slab half-thickness.
    pub slab: f32,
    /// Overlay plane edge length.
    pub plane_side: f32,
    pub plane_color: Rgba,
    pub tint: Rgba,
    pub base: Rgba,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self::cascade()
    }
}

impl CascadeConfig {
    // ===== PRESETS =====

    pub fn cascade() -> Self {
        Self {
            name: "Cascade (plane drop every 10s)".into(),
            fps: 60,
            duration: 10.0,
            loop_secs: 10.0,
            drop_secs: 0.5,
            start: 1.2,
            end: -1.2,
            slab: 0.015,
            plane_side: 2.2,
            plane_color: Rgba::new(0.0, 1.0, 1.0, 0.15),
            tint: Rgba::rgb(0.1, 0.9, 0.9),
            base: Rgba::WHITE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("cascade", "loop_secs", self.loop_secs)?;
        ensure_positive("cascade", "drop_secs", self.drop_secs)?;
        ensure_positive("cascade", "slab", self.slab)?;
        ensure_positive("cascade", "plane_side", self.plane_side)?;
        if self.drop_secs > self.loop_secs {
            return Err(RippError::invalid("cascade", "`drop_secs` must not exceed `loop_secs`"));
        }
        Ok(())
    }

    /// Slab height relative to the center at loop time `t`, or `None`
    /// between drops.
    pub fn slab_height(&self, t: f32, radius: f32) -> Option<f32> {
        let tt = t.rem_euclid(self.loop_secs);
        (tt <= self.drop_secs)
            .then(|| mix(self.start, self.end, smooth01(tt / self.drop_secs)) * radius)
    }
}

/// Periodic falling slab.
#[derive(Debug)]
pub struct Cascade {
    config: CascadeConfig,
    stage: Stage,
    plane: Option<OverlayHandle>,
}

impl Cascade {
    pub fn new(config: CascadeConfig) -> Self {
        Self {
            config,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            plane: None,
        }
    }

    fn parked(&self) -> Vec3 {
        self.stage.center() + Vec3::Y * (self.config.start * self.stage.radius())
    }
}

impl Effect for Cascade {
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

        let plane = OverlayPlane {
            side: self.config.plane_side * self.stage.radius(),
            color: self.config.plane_color,
            position: self.parked(),
            rotation: Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            visible: true,
        };
        self.plane = host.overlay().map(|overlay| {
            overlay.clear();
            overlay.add_plane(plane)
        });
        debug!(overlay = self.plane.is_some(), "cascade ready");
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, _dt: f32) {
        let radius = self.stage.radius();
        let height = self.config.slab_height(t, radius);
        let position = match height {
            Some(h) => self.stage.center() + Vec3::Y * h,
            None => self.parked(),
        };
        if let (Some(handle), Some(overlay)) = (self.plane, host.overlay()) {
            overlay.update_plane(handle, position, height.is_some());
        }

        if height.is_none() {
            return;
        }
        let half = self.config.slab * radius;
        let mut frame = Frame::default();
        for s in &self.stage.samples {
            if (s.position.y - position.y).abs() <= half {
                frame.set(s.id, self.config.tint);
            }
        }
        trace!(y = position.y, hits = frame.len(), "cascade frame");
        frame.commit(host);
    }

    fn dispose(&mut self, host: &mut dyn Host) {
        if let Some(overlay) = host.overlay() {
            if let Some(handle) = self.plane.take() {
                overlay.remove(handle);
            }
            overlay.clear();
        }
        self.plane = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::dome;
    use crate::host::collect_samples;
    use crate::scene::SceneHost;

    #[test]
    fn test_slab_only_during_drop() {
        let config = CascadeConfig::cascade();
        assert!((config.slab_height(0.0, 100.0).unwrap() - 120.0).abs() < 1e-3);
        assert!((config.slab_height(0.5, 100.0).unwrap() + 120.0).abs() < 1e-3);
        assert!(config.slab_height(0.25, 100.0).unwrap().abs() < 1e-3);
        assert_eq!(config.slab_height(3.0, 100.0), None);
        let wrapped = config.slab_height(10.1, 100.0).unwrap();
        assert!((wrapped - config.slab_height(0.1, 100.0).unwrap()).abs() < 0.1);
    }

    #[test]
    fn test_overlay_plane_lifecycle() {
        let mut host = SceneHost::dome(Vec3::ZERO, 100.0, 8, 16).with_overlay();
        let mut effect = Cascade::new(CascadeConfig::cascade());
        effect.init(&mut host);
        let handle = effect.plane.unwrap();
        let plane = host.recorded_overlay().unwrap().plane(handle).unwrap();
        assert!((plane.side - 220.0).abs() < 1e-3);
        assert!(plane.position.abs_diff_eq(Vec3::new(0.0, 120.0, 0.0), 1e-3));

        effect.update(&mut host, 0.25, 0.25);
        let plane = host.recorded_overlay().unwrap().plane(handle).unwrap();
        assert!(plane.visible);
        assert!(plane.position.y.abs() < 1e-3);

        effect.update(&mut host, 5.0, 0.25);
        let plane = host.recorded_overlay().unwrap().plane(handle).unwrap();
        assert!(!plane.visible);
        assert!((plane.position.y - 120.0).abs() < 1e-3);

        effect.dispose(&mut host);
        assert!(host.recorded_overlay().unwrap().is_empty());
    }

    #[test]
    fn test_slab_tints_passing_panels() {
        let mut host = dome();
        let mut effect = Cascade::new(CascadeConfig::cascade());
        effect.init(&mut host);
        // The slab passes y = 0 at the midpoint; no ring sits exactly there.
        effect.update(&mut host, 0.25, 0.25);
        assert_eq!(host.frames_committed(), 0);

        // The crown pole at y = 100 is hit when the slab passes it.
        let mut hit = false;
        for i in 0..=500 {
            let t = i as f32 * 0.001;
            effect.update(&mut host, t, 0.001);
            hit |= host.color_of(0) == Some(CascadeConfig::cascade().tint);
        }
        assert!(hit);
        let tinted = collect_samples(&host)
            .iter()
            .filter(|s| host.color_of(s.id) != Some(Rgba::WHITE))
            .count();
        assert!(tinted > 0);
    }

    #[test]
    fn test_runs_without_overlay_or_info() {
        let mut host = dome();
        host.set_info(None);
        let mut effect = Cascade::new(CascadeConfig::cascade());
        effect.init(&mut host);
        assert!(effect.plane.is_none());
        effect.update(&mut host, 0.1, 0.1);
        effect.dispose(&mut host);
    }
}
