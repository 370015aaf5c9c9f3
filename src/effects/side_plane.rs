//! Side-of-plane painting with an optional pause, invert and restart loop.
//!
//! Each panel takes the color of the side of the moving plane it is on. A
//! soft edge blends across the plane, and a ripple makes that edge
//! undulate. With a [`Restart`] configured the effect watches for the whole
//! dome turning one color; it then freezes for `pause_ms`, swaps the two
//! colors and runs the motion again from its rest pose.
//!
//! # Loop
//!
//! ```text
//! Running --(monochrome after paint)--> Paused --(pause_ms elapsed)--> Running (inverted)
//! ```
//!
//! Entering the pause resets the motion at once, and leaving it resets it
//! again; the frozen frame is the one painted just before the pause.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collision::{is_monochrome, BandRule, EdgeProfile, Plane, Ripple, SoftEdge};
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame};
use crate::effect::{Effect, EffectMeta};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::Host;
use crate::motion::{PlaneMotion, Sweep};

use super::{now_ms, Stage, PLANE_FALLBACK_RADIUS};

/// Pause-on-monochrome settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Restart {
    pub pause_ms: f32,
    pub rule: BandRule,
}

/// Settings for a [`SidePlane`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidePlaneConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    /// Color of the side the normal points away from.
    pub negative: Rgba,
    /// Color of the side the normal points into.
    pub positive: Rgba,
    pub motion: PlaneMotion,
    pub edge: SoftEdge,
    pub restart: Option<Restart>,
}

impl Default for SidePlaneConfig {
    fn default() -> Self {
        Self::wave_7()
    }
}

impl SidePlaneConfig {
    // ===== PRESETS =====

    /// Blue and white halves, fast Y sweep, no restart.
    pub fn wave_7() -> Self {
        Self {
            name: "Planewave tilt 25, spin 2s, X/Y sweep + Z tumble (side paint)".into(),
            fps: 60,
            duration: 120.0,
            negative: Rgba::BLUE,
            positive: Rgba::WHITE,
            motion: PlaneMotion::tilted_x(25.0)
                .spinning(2000.0)
                .resting_at(Vec3::new(-70.0, -57.0, 0.0))
                .sweeping(Sweep::new(70.0, -70.0, 2600.0), Sweep::new(-57.0, 57.0, 1100.0))
                .tumbling(90.0, 2500.0),
            edge: SoftEdge::HARD,
            restart: None,
        }
    }

    /// Blue and white, one second pause, colors swap every loop.
    pub fn wave_8() -> Self {
        Self {
            name: "Planewave tilt 25, spin 2s, sweep + tumble (pause on monochrome, invert, restart)".into(),
            fps: 30,
            motion: PlaneMotion::tilted_x(25.0)
                .spinning(2000.0)
                .resting_at(Vec3::new(70.0, -57.0, 0.0))
                .sweeping(Sweep::new(70.0, -70.0, 3000.0), Sweep::new(-57.0, 57.0, 3000.0))
                .tumbling(90.0, 3000.0),
            restart: Some(Restart {
                pause_ms: 1000.0,
                rule: BandRule::Ignore,
            }),
            ..Self::wave_7()
        }
    }

    /// White and black with a feathered, rippled edge and a near-instant restart.
    pub fn wave_9() -> Self {
        Self {
            name: "Planewave tilt 20, rippled edge (pause on monochrome, invert, restart)".into(),
            fps: 30,
            negative: Rgba::WHITE,
            positive: Rgba::BLACK,
            motion: PlaneMotion::tilted_x(20.0)
                .spinning(2000.0)
                .resting_at(Vec3::new(70.0, -57.0, 0.0))
                .sweeping(Sweep::new(70.0, -70.0, 2700.0), Sweep::new(-57.0, 57.0, 2900.0))
                .tumbling(90.0, 3000.0),
            edge: SoftEdge::feathered(2.5).with_ripple(Ripple {
                amplitude: 3.0,
                feather_gain: 0.75,
                cycles: 4.2,
                speed_hz: 0.06,
            }),
            restart: Some(Restart {
                pause_ms: 10.0,
                rule: BandRule::Block { epsilon: 0.25 },
            }),
            ..Self::wave_7()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.edge.feather.is_finite() && self.edge.feather >= 0.0) {
            return Err(RippError::invalid("side_plane", "`edge.feather` must be non-negative"));
        }
        if let Some(period) = self.motion.spin_period_ms {
            ensure_positive("side_plane", "spin_period_ms", period)?;
        }
        if let Some(r) = self.restart {
            if !(r.pause_ms.is_finite() && r.pause_ms >= 0.0) {
                return Err(RippError::invalid(
                    "side_plane",
                    "`restart.pause_ms` must be non-negative",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LoopState {
    Running,
    Paused { since_ms: f32 },
}

/// Two-color split along a moving plane.
#[derive(Debug)]
pub struct SidePlane {
    config: SidePlaneConfig,
    stage: Stage,
    plane: Plane,
    state: LoopState,
    /// Sweep and tumble clock origin, latched on the first running frame.
    started: Option<f32>,
    /// Spin origin, latched with `started` when restarts are enabled.
    spin_anchor: Option<f32>,
    inverted: bool,
    profiles: Vec<EdgeProfile>,
}

impl SidePlane {
    pub fn new(config: SidePlaneConfig) -> Self {
        Self {
            config,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            plane: Plane::new(Vec3::ZERO, Vec3::Y),
            state: LoopState::Running,
            started: None,
            spin_anchor: None,
            inverted: false,
            profiles: Vec::new(),
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, LoopState::Paused { .. })
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    fn reset_motion(&mut self) {
        self.plane = self.config.motion.rest(self.stage.center());
        self.started = None;
        self.spin_anchor = None;
        self.state = LoopState::Running;
    }

    fn measure(&mut self, time_sec: f32) {
        let edge = self.config.edge;
        let plane = self.plane;
        self.profiles.clear();
        self.profiles.extend(
            self.stage
                .samples
                .iter()
                .map(|s| edge.profile(&plane, s.position, time_sec)),
        );
    }

    fn paint(&self, host: &mut dyn Host) {
        let (pos, neg) = if self.inverted {
            (self.config.negative, self.config.positive)
        } else {
            (self.config.positive, self.config.negative)
        };
        let mut frame = Frame::with_capacity(self.stage.samples.len());
        for (s, p) in self.stage.samples.iter().zip(&self.profiles) {
            frame.set(s.id, neg.lerp(pos, p.blend()));
        }
        frame.commit(host);
    }
}

impl Effect for SidePlane {
    fn meta(&self) -> EffectMeta {
        EffectMeta::new(
            &self.config.name,
            self.config.fps,
            self.config.duration,
            BlendPolicy::Override,
        )
    }

    fn init(&mut self, host: &mut dyn Host) {
        host.reset_colors_to(self.config.negative);
        self.stage.capture(host);
        self.inverted = false;
        self.reset_motion();
        self.measure(0.0);
        self.paint(host);
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, _dt: f32) {
        let now = now_ms(t);

        if let LoopState::Paused { since_ms } = self.state {
            let pause = self.config.restart.map_or(0.0, |r| r.pause_ms);
            if now - since_ms >= pause {
                self.inverted = !self.inverted;
                self.reset_motion();
                debug!(inverted = self.inverted, "side plane restarting");
            }
            return;
        }

        let t0 = *self.started.get_or_insert(now);
        let spin_ms = match self.config.restart {
            Some(_) => now - *self.spin_anchor.get_or_insert(now),
            None => now,
        };
        self.plane = self.config.motion.pose(self.stage.center(), now - t0, spin_ms);
        self.measure(t);

        let mono = match self.config.restart {
            Some(r) if !self.profiles.is_empty() => {
                is_monochrome(self.profiles.iter().copied(), r.rule)
            }
            _ => false,
        };
        self.paint(host);
        trace!(mono, "side plane frame");

        if mono {
            self.reset_motion();
            self.state = LoopState::Paused { since_ms: now };
            debug!(at_ms = now, "side plane monochrome, pausing");
        }
    }
}
