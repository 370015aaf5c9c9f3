//! A slab turning about Z under the dome, like a page being turned.
//!
//! The plane is anchored below the dome bottom. One cycle runs a forward
//! turn that wipes panels to `wipe`, a hold, a reverse turn that wipes them
//! back to `base`, and another hold. A panel crossed by the slab does not
//! switch at once: it ramps from its current color over `ramp_ms`.
//!
//! | Segment | Angle | Target |
//! |---------|-------|--------|
//! | forward | `phase0 + 2pi * a` | `wipe` |
//! | hold | `phase0 + 2pi` | none |
//! | reverse | `phase0 + 2pi * (1 - a)` | `base` |
//! | hold | `phase0` | none |

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};
use tracing::{debug, trace};

use crate::collision::Plane;
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame};
use crate::effect::{Effect, EffectMeta};
use crate::error::{ensure_positive, Result};
use crate::host::{Host, PanelId};

use super::{now_ms, Stage, PLANE_FALLBACK_RADIUS};

/// Minimum channel change that counts as a visible step of a ramp.
const RAMP_EPSILON: f32 = 1e-3;

/// Settings for a [`PlaneWipe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneWipeConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub half_thickness: f32,
    /// How far below the dome bottom the pivot sits.
    pub drop_below: f32,
    pub forward_ms: f32,
    pub hold_top_ms: f32,
    pub back_ms: f32,
    pub hold_bottom_ms: f32,
    pub ramp_ms: f32,
    /// Starting angle of the normal in the XY plane, radians.
    pub phase0: f32,
    pub base: Rgba,
    pub wipe: Rgba,
}

impl Default for PlaneWipeConfig {
    fn default() -> Self {
        Self::page_turn()
    }
}

impl PlaneWipeConfig {
    // ===== PRESETS =====

    pub fn page_turn() -> Self {
        Self {
            name: "Planewave Z wipe (5s + pause + reverse, soft ramp)".into(),
            fps: 30,
            duration: 120.0,
            half_thickness: 2.5,
            drop_below: 5.0,
            forward_ms: 5000.0,
            hold_top_ms: 1000.0,
            back_ms: 5000.0,
            hold_bottom_ms: 1000.0,
            ramp_ms: 40.0,
            phase0: FRAC_PI_2,
            base: Rgba::WHITE,
            wipe: Rgba::BLACK,
        }
    }

    pub fn cycle_ms(&self) -> f32 {
        self.forward_ms + self.hold_top_ms + self.back_ms + self.hold_bottom_ms
    }

    /// Normal angle and wipe target at `now_ms`.
    pub fn segment(&self, now_ms: f32) -> (f32, Option<Rgba>) {
        let u = now_ms.rem_euclid(self.cycle_ms());
        if u < self.forward_ms {
            (self.phase0 + TAU * (u / self.forward_ms), Some(self.wipe))
        } else if u < self.forward_ms + self.hold_top_ms {
            (self.phase0 + TAU, None)
        } else if u < self.forward_ms + self.hold_top_ms + self.back_ms {
            let a = (u - self.forward_ms - self.hold_top_ms) / self.back_ms;
            (self.phase0 + TAU * (1.0 - a), Some(self.base))
        } else {
            (self.phase0, None)
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("plane_wipe", "forward_ms", self.forward_ms)?;
        ensure_positive("plane_wipe", "back_ms", self.back_ms)?;
        ensure_positive("plane_wipe", "ramp_ms", self.ramp_ms)?;
        ensure_positive("plane_wipe", "half_thickness", self.half_thickness)?;
        Ok(())
    }
}

/// One panel's ramp from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    color: Rgba,
    started: Option<f32>,
    from: Rgba,
    to: Rgba,
}

impl Ramp {
    fn settled(color: Rgba) -> Self {
        Self {
            color,
            started: None,
            from: color,
            to: color,
        }
    }

    /// Begin ramping toward `target` unless already there or headed there.
    fn kick(&mut self, target: Rgba, now: f32) {
        if self.to != target && self.color != target {
            self.started = Some(now);
            self.from = self.color;
            self.to = target;
        }
    }

    /// Advance and return the color to write, if any.
    fn step(&mut self, now: f32, ramp_ms: f32) -> Option<Rgba> {
        let t0 = self.started?;
        let a = ((now - t0) / ramp_ms).min(1.0);
        let col = self.from.lerp(self.to, a);
        let c = self.color;
        let changed = (col.r - c.r).abs() > RAMP_EPSILON
            || (col.g - c.g).abs() > RAMP_EPSILON
            || (col.b - c.b).abs() > RAMP_EPSILON
            || (col.a - c.a).abs() > RAMP_EPSILON;
        if changed {
            self.color = col;
            Some(col)
        } else if a >= 1.0 {
            self.color = self.to;
            self.started = None;
            Some(self.color)
        } else {
            None
        }
    }
}

/// Page-turn wipe with per-panel ramps.
#[derive(Debug)]
pub struct PlaneWipe {
    config: PlaneWipeConfig,
    stage: Stage,
    ramps: HashMap<PanelId, Ramp>,
    plane: Plane,
}

impl PlaneWipe {
    pub fn new(config: PlaneWipeConfig) -> Self {
        Self {
            config,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            ramps: HashMap::new(),
            plane: Plane::new(Vec3::ZERO, Vec3::Y),
        }
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Panels currently ramping.
    pub fn active_ramps(&self) -> usize {
        self.ramps.values().filter(|r| r.started.is_some()).count()
    }
}

impl Effect for PlaneWipe {
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
        let base = self.config.base;
        self.ramps = self
            .stage
            .samples
            .iter()
            .map(|s| (s.id, Ramp::settled(base)))
            .collect();
        let mut frame = Frame::with_capacity(self.stage.samples.len());
        for s in &self.stage.samples {
            frame.set(s.id, base);
        }
        frame.commit(host);
        debug!(panels = self.ramps.len(), "plane wipe ready");
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, _dt: f32) {
        let now = now_ms(t);
        let (theta, target) = self.config.segment(now);
        let pivot = self.stage.center() - Vec3::Y * (self.stage.radius() + self.config.drop_below);
        self.plane = Plane::new(pivot, Vec3::new(theta.cos(), theta.sin(), 0.0));

        if let Some(target) = target {
            for s in &self.stage.samples {
                if self.plane.in_band(s.position, self.config.half_thickness) {
                    self.ramps
                        .entry(s.id)
                        .or_insert_with(|| Ramp::settled(self.config.base))
                        .kick(target, now);
                }
            }
        }

        let ramp_ms = self.config.ramp_ms;
        let mut frame = Frame::default();
        for s in &self.stage.samples {
            if let Some(c) = self.ramps.get_mut(&s.id).and_then(|r| r.step(now, ramp_ms)) {
                frame.set(s.id, c);
            }
        }
        trace!(writes = frame.len(), "plane wipe frame");
        frame.commit(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::dome;
    use crate::host::collect_samples;

    #[test]
    fn test_segments() {
        let c = PlaneWipeConfig::page_turn();
        assert_eq!(c.cycle_ms(), 12_000.0);
        assert_eq!(c.segment(0.0), (FRAC_PI_2, Some(Rgba::BLACK)));
        assert_eq!(c.segment(5500.0), (FRAC_PI_2 + TAU, None));
        let (theta, target) = c.segment(8500.0);
        assert!((theta - (FRAC_PI_2 + TAU * 0.5)).abs() < 1e-5);
        assert_eq!(target, Some(Rgba::WHITE));
        assert_eq!(c.segment(11_500.0), (FRAC_PI_2, None));
        assert_eq!(c.segment(12_000.0), (FRAC_PI_2, Some(Rgba::BLACK)));
    }

    #[test]
    fn test_ramp_reaches_target_and_settles() {
        let mut ramp = Ramp::settled(Rgba::WHITE);
        ramp.kick(Rgba::BLACK, 100.0);
        let half = ramp.step(120.0, 40.0).unwrap();
        assert!((half.r - 0.5).abs() < 1e-5);
        assert_eq!(ramp.step(140.0, 40.0), Some(Rgba::BLACK));
        assert_eq!(ramp.step(150.0, 40.0), Some(Rgba::BLACK));
        assert!(ramp.started.is_none());
        assert_eq!(ramp.step(160.0, 40.0), None);

        // Already black: no new ramp.
        ramp.kick(Rgba::BLACK, 200.0);
        assert!(ramp.started.is_none());
    }

    #[test]
    fn test_forward_then_back() {
        let mut host = dome();
        let mut wipe = PlaneWipe::new(PlaneWipeConfig::page_turn());
        wipe.init(&mut host);
        let ids: Vec<_> = collect_samples(&host).iter().map(|s| s.id).collect();
        assert!(ids.iter().all(|id| host.color_of(*id) == Some(Rgba::WHITE)));

        let dt = 1.0 / 30.0;
        let mut t = 0.0;
        let mut saw_black = false;
        while t < 6.0 {
            t += dt;
            wipe.update(&mut host, t, dt);
            saw_black |= ids.iter().any(|id| host.color_of(*id) == Some(Rgba::BLACK));
        }
        assert!(saw_black);

        while t < 12.0 {
            t += dt;
            wipe.update(&mut host, t, dt);
        }
        for id in &ids {
            let c = host.color_of(*id).unwrap();
            assert!(c == Rgba::WHITE || c == Rgba::BLACK, "{c:?}");
        }
        assert_eq!(wipe.active_ramps(), 0);
    }
}
