//! A wavy waterline wrapped around the dome.
//!
//! The waterline height at azimuth `theta` is a sum of integer harmonics in
//! both `theta` and the loop phase, so the animation tiles seamlessly every
//! `loop_secs`. Panels above the line take the sky color, panels below it the
//! water color, with a smoothstep feather of `band` on both sides.
//!
//! Two styles ship in the catalog:
//!
//! - [`SeaStyle::Mono`]: flat water and sky colors, translucent right at the crest.
//! - [`SeaStyle::Skybox`]: a fixed four-stop sky gradient over water that darkens
//!   with depth and picks up an aqua tint near high crests.
//!
//! The dome is measured from the panels themselves: center is the centroid,
//! radius the median distance to it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tracing::{debug, trace, warn};

use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame};
use crate::dome::estimate_dome;
use crate::effect::{Effect, EffectMeta};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::{samples_for, DomeInfo, Host, Sample};
use crate::math::{clamp01, mix, smoothstep};

use super::now_ms;

// ========== Skybox palette ==========

const SKY_ORANGE: Rgba = Rgba::rgb(1.0, 0.55, 0.0);
const SKY_BEIGE: Rgba = Rgba::rgb(0.98, 0.78, 0.55);
const SKY_GREY: Rgba = Rgba::rgb(0.86, 0.90, 0.96);
const SKY_BLUE: Rgba = Rgba::rgb(0.44, 0.60, 0.84);
const SKY_STOPS: [f32; 3] = [0.58, 0.80, 0.97];
const DEEP_WATER: Rgba = Rgba::rgb(0.05, 0.15, 0.22);
const AQUA: Rgba = Rgba::rgb(0.35, 0.90, 0.95);

/// Normalized waterline shape in roughly `[-1, 1]`.
///
/// Integer spatial and temporal frequencies keep it periodic in both
/// `theta` and `phase`.
pub fn wave_shape(theta: f32, phase: f32) -> f32 {
    let mut w = (theta - 3.0 * phase).sin()
        + 0.55 * (2.0 * theta + phase + 1.2).sin()
        + 0.30 * (3.0 * theta - phase - 0.6).sin();
    let noise = 0.35 * (2.0 * theta + 5.0 * phase + 1.0).sin()
        + 0.25 * (5.0 * theta + 7.0 * phase - 2.0).sin()
        + 0.15 * (3.0 * theta + 4.0 * phase + 0.5).sin();
    w += 0.8 * noise;
    let shaped = w + 0.15 * w * w * w;
    shaped / 1.85
}

/// Mean water level over time, as fractions of the dome radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Horizon {
    /// Constant level relative to the center.
    Fixed { offset: f32 },
    /// Rise from below the bottom to above the top, hold, fall back, hold.
    Lift {
        pad_bottom: f32,
        pad_top: f32,
        rise_ms: f32,
        hold_ms: f32,
    },
}

impl Horizon {
    /// Level in world units relative to the center at `now_ms`.
    pub fn level(&self, now_ms: f32, radius: f32) -> f32 {
        match *self {
            Horizon::Fixed { offset } => offset * radius,
            Horizon::Lift {
                pad_bottom,
                pad_top,
                rise_ms,
                hold_ms,
            } => {
                let y0 = -radius * (1.0 + pad_bottom);
                let y1 = radius * (1.0 + pad_top);
                let u = now_ms.rem_euclid(2.0 * (rise_ms + hold_ms));
                if u < rise_ms {
                    mix(y0, y1, u / rise_ms)
                } else if u < rise_ms + hold_ms {
                    y1
                } else if u < 2.0 * rise_ms + hold_ms {
                    mix(y1, y0, (u - rise_ms - hold_ms) / rise_ms)
                } else {
                    y0
                }
            }
        }
    }

    /// Level used to place the skybox; a lifting horizon counts as the equator.
    fn resting(&self, radius: f32) -> f32 {
        match *self {
            Horizon::Fixed { offset } => offset * radius,
            Horizon::Lift { .. } => 0.0,
        }
    }
}

/// How water and sky are colored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeaStyle {
    Mono {
        water: Rgba,
        sky: Rgba,
        /// Alpha right on the waterline; full opacity away from it.
        crest_alpha: f32,
    },
    Skybox,
}

/// Settings for [`SeaHorizon`]. Lengths are fractions of the dome radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaHorizonConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub amplitude: f32,
    /// Feather half-width around the waterline.
    pub band: f32,
    pub loop_secs: f32,
    pub horizon: Horizon,
    pub style: SeaStyle,
}

impl Default for SeaHorizonConfig {
    fn default() -> Self {
        Self::black_and_white()
    }
}

impl SeaHorizonConfig {
    // ===== PRESETS =====

    /// Black water rising and falling against a white sky.
    pub fn black_and_white() -> Self {
        Self {
            name: "Sea horizon, black and white (soft crest alpha)".into(),
            fps: 30,
            duration: 120.0,
            amplitude: 0.22,
            band: 0.08,
            loop_secs: 10.0,
            horizon: Horizon::Lift {
                pad_bottom: 0.10,
                pad_top: 0.10,
                rise_ms: 10_000.0,
                hold_ms: 2000.0,
            },
            style: SeaStyle::Mono {
                water: Rgba::BLACK,
                sky: Rgba::WHITE,
                crest_alpha: 0.6,
            },
        }
    }

    /// Equatorial waves under a saturated sunset gradient.
    pub fn skybox() -> Self {
        Self {
            name: "Skybox, reference gradient".into(),
            duration: 10.0,
            amplitude: 0.2145,
            horizon: Horizon::Fixed { offset: -0.10 },
            style: SeaStyle::Skybox,
            ..Self::black_and_white()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("sea_horizon", "band", self.band)?;
        ensure_positive("sea_horizon", "loop_secs", self.loop_secs)?;
        ensure_positive("sea_horizon", "amplitude", self.amplitude)?;
        if let Horizon::Lift { rise_ms, hold_ms, .. } = self.horizon {
            ensure_positive("sea_horizon", "rise_ms", rise_ms)?;
            if !(hold_ms.is_finite() && hold_ms >= 0.0) {
                return Err(RippError::invalid("sea_horizon", "`hold_ms` must be non-negative"));
            }
        }
        Ok(())
    }
}

/// World-unit parameters resolved against the measured dome.
#[derive(Debug, Clone, Copy)]
struct Scaled {
    radius: f32,
    amplitude: f32,
    band: f32,
    rest: f32,
    sky_min: f32,
    sky_max: f32,
}

impl Scaled {
    fn new(config: &SeaHorizonConfig, radius: f32) -> Self {
        let amplitude = config.amplitude * radius;
        let rest = config.horizon.resting(radius);
        let trough = rest - amplitude;
        Self {
            radius,
            amplitude,
            band: config.band * radius,
            rest,
            sky_min: (trough - 0.2 * radius).min(-1.6 * amplitude - 0.2 * radius),
            sky_max: 0.95 * radius,
        }
    }

    /// Fixed sky gradient at height `y`.
    fn sky(&self, y: f32) -> Rgba {
        let t = clamp01((y - self.sky_min) / (self.sky_max - self.sky_min)).powf(0.75);
        let [s1, s2, s3] = SKY_STOPS;
        if t <= s1 {
            SKY_ORANGE.lerp_opaque(SKY_BEIGE, t / s1)
        } else if t <= s2 {
            SKY_BEIGE.lerp_opaque(SKY_GREY, (t - s1) / (s2 - s1))
        } else if t <= s3 {
            SKY_GREY.lerp_opaque(SKY_BLUE, (t - s2) / (s3 - s2))
        } else {
            SKY_BLUE
        }
    }

    /// Water grading to black at the bottom and with depth below `surface`.
    fn under(&self, y: f32, surface: f32) -> Rgba {
        let depth = clamp01((y + self.radius) / (1.6 * self.radius));
        let vert = Rgba::BLACK.lerp_opaque(DEEP_WATER, depth);
        let depth = clamp01((surface - y) / (0.9 * self.amplitude));
        vert.lerp_opaque(Rgba::BLACK, 0.5 * depth)
    }
}

/// Periodic waterline around the equator.
#[derive(Debug)]
pub struct SeaHorizon {
    config: SeaHorizonConfig,
    dome: DomeInfo,
    samples: Vec<Sample>,
    scaled: Scaled,
}

impl SeaHorizon {
    pub fn new(config: SeaHorizonConfig) -> Self {
        let scaled = Scaled::new(&config, 1.0);
        Self {
            config,
            dome: DomeInfo::new(Vec3::ZERO, 1.0),
            samples: Vec::new(),
            scaled,
        }
    }

    /// Measured dome.
    pub fn dome(&self) -> DomeInfo {
        self.dome
    }

    /// Waterline height relative to the center at azimuth `theta`.
    pub fn waterline(&self, theta: f32, phase: f32, level: f32) -> f32 {
        level + self.scaled.amplitude * wave_shape(theta, phase)
    }

    fn color(&self, rel: Vec3, surface: f32) -> Rgba {
        let s = &self.scaled;
        let d = rel.y - surface;
        let f = smoothstep(-s.band, s.band, d);
        match self.config.style {
            SeaStyle::Mono {
                water,
                sky,
                crest_alpha,
            } => {
                let near = 1.0 - smoothstep(0.0, s.band, d.abs());
                water.lerp_opaque(sky, f).with_alpha(mix(1.0, crest_alpha, near))
            }
            SeaStyle::Skybox => {
                let mut under = s.under(rel.y, surface);
                let near_crest = smoothstep(-0.8 * s.band, -0.05 * s.band, d);
                let peak = clamp01((surface - s.rest) / s.amplitude);
                let crest = near_crest.powf(1.2) * peak.powf(1.5) * 0.55;
                if crest > 1e-4 {
                    let aqua = s.sky(surface).lerp_opaque(AQUA, 0.6);
                    under = under.lerp_opaque(aqua, crest);
                }
                under.lerp_opaque(s.sky(rel.y), f)
            }
        }
    }
}

impl Effect for SeaHorizon {
    fn meta(&self) -> EffectMeta {
        EffectMeta::new(
            &self.config.name,
            self.config.fps,
            self.config.duration,
            BlendPolicy::Override,
        )
    }

    fn init(&mut self, host: &mut dyn Host) {
        let mut ids = host.painted_ids();
        if ids.is_empty() {
            ids = host.ids().union();
        }
        self.samples = samples_for(host, &ids);
        self.dome = match estimate_dome(self.samples.iter().map(|s| s.position)) {
            Some(dome) => dome,
            None => {
                warn!("no panel positions, sea horizon has nothing to paint");
                DomeInfo::new(Vec3::ZERO, 1.0)
            }
        };
        self.scaled = Scaled::new(&self.config, self.dome.radius);
        debug!(
            panels = self.samples.len(),
            radius = self.dome.radius,
            "sea horizon measured dome"
        );
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, _dt: f32) {
        let phase = TAU * t.rem_euclid(self.config.loop_secs) / self.config.loop_secs;
        let level = self.config.horizon.level(now_ms(t), self.scaled.radius);

        let mut frame = Frame::with_capacity(self.samples.len());
        for s in &self.samples {
            let rel = s.position - self.dome.center;
            let theta = rel.z.atan2(rel.x).rem_euclid(TAU);
            let surface = self.waterline(theta, phase, level);
            frame.set(s.id, self.color(rel, surface));
        }
        trace!(level, "sea horizon frame");
        frame.commit(host);
    }
}
