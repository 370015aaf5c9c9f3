//! Bands that cross a slowly tumbling guide segment once, over a drifting
//! gradient.
//!
//! Every wave starts at one end of the segment and reaches the other after
//! `travel` seconds, fading in and out with `sin(pi * u)`. Overlapping bands
//! accumulate with Porter-Duff "over" and the result is laid on top of a
//! [`GradientUnderlay`], so the whole dome is written every frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collision::Plane;
use crate::color::{Grade, Rgba};
use crate::composite::{BlendPolicy, Compositor, Frame};
use crate::dome::GuideSegment;
use crate::effect::{Effect, EffectMeta};
use crate::emitter::{Cadence, Emitter};
use crate::error::{ensure_positive, ensure_range, Result, RippError};
use crate::gradient::{GradientConfig, GradientUnderlay};
use crate::host::Host;
use crate::lifecycle::{spin_angle, TimedTravel};
use crate::palette::{Palette, Swatch};
use crate::pool::{CapPolicy, Pool};
use crate::spawn::SpawnContext;

use super::{Stage, BAND_FALLBACK_RADIUS};

/// Settings for [`TravelingBands`]. Lengths are in dome units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelingBandsConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub dm_to_wu: f32,
    pub extend_dm: f32,
    /// Seconds per guide revolution about X, Y and Z.
    pub rot_periods: Vec3,
    /// Random spawn delay range, seconds.
    pub spawn_interval: (f32, f32),
    pub max_active: usize,
    /// Random band half-thickness range.
    pub band_dm: (f32, f32),
    /// Seconds from one end of the segment to the other.
    pub travel: f32,
    pub palette: Palette,
    pub underlay: GradientConfig,
    pub base: Rgba,
}

impl Default for TravelingBandsConfig {
    fn default() -> Self {
        Self::seven_up()
    }
}

impl TravelingBandsConfig {
    // ===== PRESETS =====

    pub fn seven_up() -> Self {
        Self {
            name: "Traveling bands over drifting gradient (Dusk)".into(),
            fps: 60,
            duration: 120.0,
            dm_to_wu: 14.0,
            extend_dm: 0.8,
            rot_periods: Vec3::splat(10.0),
            spawn_interval: (0.05, 0.5),
            max_active: 40,
            band_dm: (0.01, 2.0),
            travel: 4.0,
            palette: Swatch::Dusk.palette(),
            underlay: GradientConfig::default(),
            base: Rgba::BLACK,
        }
    }

    pub fn seven_up_lime() -> Self {
        Self {
            name: "Traveling bands over drifting gradient (Lime)".into(),
            palette: Swatch::Lime.palette(),
            ..Self::seven_up()
        }
    }

    /// Slower, thinner bands over a heavily darkened underlay.
    pub fn temari() -> Self {
        Self {
            name: "Traveling bands over deep gradient (Temari)".into(),
            rot_periods: Vec3::new(5.0, 5.0, 100.0),
            spawn_interval: (0.25, 1.0),
            max_active: 50,
            band_dm: (0.03, 1.8),
            travel: 6.0,
            palette: Swatch::Temari.palette(),
            underlay: GradientConfig {
                grade: Some(Grade::deep()),
                ..GradientConfig::default()
            },
            ..Self::seven_up()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("traveling_bands", "dm_to_wu", self.dm_to_wu)?;
        ensure_positive("traveling_bands", "travel", self.travel)?;
        let (lo, hi) = self.spawn_interval;
        ensure_range("traveling_bands", "spawn_interval", lo, hi)?;
        ensure_range("traveling_bands", "band_dm", self.band_dm.0, self.band_dm.1)?;
        if hi <= 0.0 {
            return Err(RippError::invalid(
                "traveling_bands",
                "`spawn_interval` must allow a positive delay",
            ));
        }
        for p in self.rot_periods.to_array() {
            ensure_positive("traveling_bands", "rot_periods", p)?;
        }
        if self.max_active == 0 {
            return Err(RippError::invalid("traveling_bands", "`max_active` must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Band {
    travel: TimedTravel,
    color: Rgba,
    half_width: f32,
    rot_phase: Vec3,
    done: bool,
}

/// Fading bands travelling along a rotating segment.
#[derive(Debug)]
pub struct TravelingBands {
    config: TravelingBandsConfig,
    ctx: SpawnContext,
    stage: Stage,
    guide: GuideSegment,
    emitter: Emitter,
    bands: Pool<Band>,
    compositor: Compositor,
    underlay: GradientUnderlay,
}

impl TravelingBands {
    pub fn new(config: TravelingBandsConfig, mut ctx: SpawnContext) -> Self {
        let stage = Stage::new(BAND_FALLBACK_RADIUS);
        let guide = GuideSegment::new(&stage.dome, config.extend_dm * config.dm_to_wu);
        let (min, max) = config.spawn_interval;
        let emitter = Emitter::new(Cadence::Jittered { min, max }, &mut ctx);
        let underlay = GradientUnderlay::new(config.palette.clone(), config.underlay, &mut ctx);
        Self {
            bands: Pool::new(config.max_active, CapPolicy::RejectNew),
            compositor: Compositor::new(BlendPolicy::AccumulateAlpha, 0, config.base),
            config,
            ctx,
            stage,
            guide,
            emitter,
            underlay,
        }
    }

    pub fn live_bands(&self) -> usize {
        self.bands.len()
    }

    fn spawn(&mut self, t: f32) {
        let (lo, hi) = self.config.band_dm;
        let band = Band {
            travel: TimedTravel::new(t, self.config.travel),
            color: self.config.palette.pick(&mut self.ctx),
            half_width: self.ctx.random_range(lo, hi) * self.config.dm_to_wu,
            rot_phase: self.ctx.random_euler(),
            done: false,
        };
        self.bands.push(band);
    }
}

impl Effect for TravelingBands {
    fn meta(&self) -> EffectMeta {
        EffectMeta::new(
            &self.config.name,
            self.config.fps,
            self.config.duration,
            BlendPolicy::AccumulateAlpha,
        )
    }

    fn init(&mut self, host: &mut dyn Host) {
        self.stage.capture(host);
        let extend = self.config.extend_dm * self.config.dm_to_wu;
        self.guide = GuideSegment::new(&self.stage.dome, extend);
        self.compositor = Compositor::new(
            BlendPolicy::AccumulateAlpha,
            self.stage.samples.len(),
            self.config.base,
        );
        host.reset_colors_to(self.config.base);
        self.bands.clear();
        self.emitter.reset(&mut self.ctx);
        debug!(panels = self.stage.samples.len(), "traveling bands ready");
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, dt: f32) {
        // A full pool leaves the emitter unpolled, so due spawns wait for room.
        if !self.bands.is_full() {
            for _ in 0..self.emitter.poll(t, dt, &mut self.ctx) {
                if self.bands.is_full() {
                    break;
                }
                self.spawn(t);
            }
        }

        self.compositor.begin_frame();
        let periods = self.config.rot_periods;
        for band in self.bands.iter_mut() {
            let u = band.travel.progress(t);
            let a = band.travel.envelope(t);
            if a <= 0.0 {
                band.done |= u >= 1.0;
                continue;
            }
            let angles = Vec3::new(
                spin_angle(t, periods.x, band.rot_phase.x),
                spin_angle(t, periods.y, band.rot_phase.y),
                spin_angle(t, periods.z, band.rot_phase.z),
            );
            let seg = self.guide.posed(angles);
            let plane = Plane::new(seg.point_at(u), seg.dir);
            for (i, s) in self.stage.samples.iter().enumerate() {
                if plane.in_band(s.position, band.half_width) {
                    self.compositor.paint(i, band.color, a);
                }
            }
            band.done |= u >= 1.0;
        }

        self.underlay.advance(t, &mut self.ctx);
        let mut frame = Frame::with_capacity(self.stage.samples.len());
        for (i, s) in self.stage.samples.iter().enumerate() {
            let base = self.underlay.color_at(s.position, &self.stage.dome);
            frame.set(s.id, self.compositor.resolve(i, base));
        }

        let purged = self.bands.retain(|b| !b.done);
        trace!(bands = self.bands.len(), purged, "traveling bands frame");
        frame.commit(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{dome, run};
    use crate::host::collect_samples;

    #[test]
    fn test_band_count_bounded() {
        let mut host = dome();
        let mut effect =
            TravelingBands::new(TravelingBandsConfig::seven_up(), SpawnContext::seeded(11));
        effect.init(&mut host);
        let dt = 1.0 / 60.0;
        for i in 1..=600 {
            effect.update(&mut host, i as f32 * dt, dt);
            assert!(effect.live_bands() <= 40);
        }
        assert!(effect.live_bands() > 0);
    }

    #[test]
    fn test_bands_retire_after_travel() {
        let mut host = dome();
        let mut effect =
            TravelingBands::new(TravelingBandsConfig::seven_up_lime(), SpawnContext::seeded(12));
        run(&mut effect, &mut host, 60.0, 60);
        assert!(effect.live_bands() > 0);
        // Nothing spawns during one long frame past every travel end.
        effect.emitter = Emitter::new(Cadence::Once, &mut SpawnContext::seeded(0));
        effect.emitter.mark_fired(0.0);
        effect.update(&mut host, 10.0, 1.0 / 60.0);
        assert_eq!(effect.live_bands(), 0);
    }

    #[test]
    fn test_full_pool_keeps_due_spawn() {
        let config = TravelingBandsConfig {
            max_active: 1,
            travel: 0.5,
            ..TravelingBandsConfig::seven_up()
        };
        let mut host = dome();
        let mut effect = TravelingBands::new(config, SpawnContext::seeded(14));
        effect.init(&mut host);
        let dt = 1.0 / 60.0;
        let mut frame = 0;
        while effect.live_bands() == 0 {
            frame += 1;
            assert!(frame < 120, "no band spawned");
            effect.update(&mut host, frame as f32 * dt, dt);
        }

        // Due on the next poll, which must wait until the band leaves.
        effect.emitter = Emitter::new(Cadence::Once, &mut SpawnContext::seeded(0));
        while effect.live_bands() == 1 {
            frame += 1;
            assert!(frame < 240, "band never retired");
            effect.update(&mut host, frame as f32 * dt, dt);
        }
        assert_eq!(effect.live_bands(), 0);

        frame += 1;
        effect.update(&mut host, frame as f32 * dt, dt);
        assert_eq!(effect.live_bands(), 1);
    }

    #[test]
    fn test_every_panel_written_opaque() {
        let mut host = dome();
        let mut effect =
            TravelingBands::new(TravelingBandsConfig::temari(), SpawnContext::seeded(13));
        run(&mut effect, &mut host, 60.0, 120);
        let samples = collect_samples(&host);
        assert_eq!(host.last_batch(), samples.len());
        for s in samples {
            let c = host.color_of(s.id).unwrap();
            assert_eq!(c.a, 1.0);
            assert!(c.is_finite());
        }
    }

    #[test]
    fn test_validate() {
        assert!(TravelingBandsConfig::temari().validate().is_ok());
        let bad = TravelingBandsConfig {
            band_dm: (2.0, 1.0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
