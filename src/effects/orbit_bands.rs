//! Oscillating bands riding a tumbling guide segment.
//!
//! Each wave owns random rotation phases. Its guide segment (a diameter of
//! the dome, slightly extended) tumbles around all three axes, and the band
//! plane slides back and forth along it. A panel within `band` of the plane
//! takes the wave's color; later waves paint over earlier ones.
//!
//! Waves live for `max_live * spawn_every` seconds, so the pool naturally
//! holds about `max_live` of them.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collision::Plane;
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Compositor, Frame};
use crate::dome::GuideSegment;
use crate::effect::{Effect, EffectMeta};
use crate::emitter::{Cadence, Emitter};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::Host;
use crate::lifecycle::{spin_angle, Oscillation};
use crate::palette::{Palette, Swatch};
use crate::pool::{CapPolicy, Pool};
use crate::spawn::SpawnContext;

use super::{Stage, BAND_FALLBACK_RADIUS};

/// Where a new wave gets its color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BandColor {
    Palette(Palette),
    /// Random hue at fixed saturation and lightness.
    Hsl { saturation: f32, lightness: f32 },
}

impl BandColor {
    fn draw(&self, ctx: &mut SpawnContext) -> Rgba {
        match self {
            BandColor::Palette(p) => p.pick(ctx),
            BandColor::Hsl {
                saturation,
                lightness,
            } => ctx.random_hsl(*saturation, *lightness),
        }
    }
}

/// Whole-frame RGB inversion during the first `duty` of every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strobe {
    pub hz: f32,
    pub duty: f32,
}

impl Strobe {
    #[inline]
    pub fn is_on(&self, t: f32) -> bool {
        (t * self.hz).rem_euclid(1.0) < self.duty
    }
}

/// Settings for [`OrbitBands`]. Lengths are in dome units (`dm`), converted
/// with `dm_to_wu`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitBandsConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub dm_to_wu: f32,
    /// Band half-thickness.
    pub band_dm: f32,
    /// Extra length at both ends of the guide segment.
    pub extend_dm: f32,
    /// Seconds per back-and-forth slide.
    pub osc_period: f32,
    /// Seconds per revolution about X, Y and Z.
    pub rot_periods: Vec3,
    pub spawn_every: f32,
    pub max_live: usize,
    pub color: BandColor,
    pub base: Rgba,
    pub strobe: Option<Strobe>,
}

impl Default for OrbitBandsConfig {
    fn default() -> Self {
        Self::jawbreaker()
    }
}

impl OrbitBandsConfig {
    // ===== PRESETS =====

    pub fn jawbreaker() -> Self {
        Self {
            name: "Plane osc spawner (0.5s, 10 max, 1.0dm band)".into(),
            fps: 60,
            duration: 120.0,
            dm_to_wu: 14.0,
            band_dm: 1.0,
            extend_dm: 0.8,
            osc_period: 1.0,
            rot_periods: Vec3::new(1.0, 1.5, 1.2),
            spawn_every: 0.5,
            max_live: 10,
            color: BandColor::Hsl {
                saturation: 0.8,
                lightness: 0.55,
            },
            base: Rgba::WHITE,
            strobe: None,
        }
    }

    pub fn candyorb() -> Self {
        Self {
            name: "Plane osc spawner (0.2s, 14 max, strobe 10Hz)".into(),
            band_dm: 2.0,
            osc_period: 1.2,
            spawn_every: 0.2,
            max_live: 14,
            color: BandColor::Palette(Swatch::Candy.palette()),
            base: Rgba::BLACK,
            strobe: Some(Strobe { hz: 10.0, duty: 0.5 }),
            ..Self::jawbreaker()
        }
    }

    /// Seconds a wave stays alive.
    pub fn ttl(&self) -> f32 {
        self.max_live as f32 * self.spawn_every
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("orbit_bands", "dm_to_wu", self.dm_to_wu)?;
        ensure_positive("orbit_bands", "band_dm", self.band_dm)?;
        ensure_positive("orbit_bands", "osc_period", self.osc_period)?;
        ensure_positive("orbit_bands", "spawn_every", self.spawn_every)?;
        for p in self.rot_periods.to_array() {
            ensure_positive("orbit_bands", "rot_periods", p)?;
        }
        if self.max_live == 0 {
            return Err(RippError::invalid("orbit_bands", "max_live must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct OrbitWave {
    born: f32,
    color: Rgba,
    rot_phase: Vec3,
    osc: Oscillation,
}

/// Spawner of oscillating bands on a rotating guide segment.
#[derive(Debug)]
pub struct OrbitBands {
    config: OrbitBandsConfig,
    ctx: SpawnContext,
    stage: Stage,
    guide: GuideSegment,
    emitter: Emitter,
    waves: Pool<OrbitWave>,
    compositor: Compositor,
}

impl OrbitBands {
    pub fn new(config: OrbitBandsConfig, mut ctx: SpawnContext) -> Self {
        let stage = Stage::new(BAND_FALLBACK_RADIUS);
        let guide = GuideSegment::new(&stage.dome, config.extend_dm * config.dm_to_wu);
        let emitter = Emitter::new(Cadence::Scheduled { every: config.spawn_every }, &mut ctx);
        let waves = Pool::new(config.max_live, CapPolicy::DropNewest);
        Self {
            config,
            ctx,
            stage,
            guide,
            emitter,
            waves,
            compositor: Compositor::new(BlendPolicy::Override, 0, Rgba::BLACK),
        }
    }

    pub fn live_waves(&self) -> usize {
        self.waves.len()
    }

    fn spawn(&mut self, t: f32) {
        let wave = OrbitWave {
            born: t,
            color: self.config.color.draw(&mut self.ctx),
            rot_phase: self.ctx.random_euler(),
            osc: Oscillation::new(self.config.osc_period, self.ctx.random_angle()),
        };
        if !self.waves.push(wave) {
            debug!("orbit band pool full, newest dropped");
        }
    }

    /// Band plane of `wave` at time `t`.
    fn band_plane(&self, wave: &OrbitWave, t: f32) -> Plane {
        let periods = self.config.rot_periods;
        let angles = Vec3::new(
            spin_angle(t, periods.x, wave.rot_phase.x),
            spin_angle(t, periods.y, wave.rot_phase.y),
            spin_angle(t, periods.z, wave.rot_phase.z),
        );
        let seg = self.guide.posed(angles);
        Plane::new(seg.point_at(wave.osc.value(t)), seg.dir)
    }
}

impl Effect for OrbitBands {
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
        let extend = self.config.extend_dm * self.config.dm_to_wu;
        self.guide = GuideSegment::new(&self.stage.dome, extend);
        self.compositor = Compositor::new(
            BlendPolicy::Override,
            self.stage.samples.len(),
            self.config.base,
        );
        self.waves.clear();
        self.emitter.reset(&mut self.ctx);
        host.reset_colors_to(self.config.base);
        self.spawn(0.0);
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, dt: f32) {
        let ttl = self.config.ttl();
        let expired = self.waves.trim_front_while(|w| t - w.born > ttl);
        if expired > 0 {
            debug!(expired, "orbit bands expired");
        }
        for _ in 0..self.emitter.poll(t, dt, &mut self.ctx) {
            self.spawn(t);
        }

        let band = self.config.band_dm * self.config.dm_to_wu;
        let planes: Vec<(Plane, Rgba)> = self
            .waves
            .iter()
            .map(|w| (self.band_plane(w, t), w.color))
            .collect();

        self.compositor.begin_frame();
        for (i, s) in self.stage.samples.iter().enumerate() {
            for (plane, color) in &planes {
                if plane.in_band(s.position, band) {
                    self.compositor.paint(i, *color, 1.0);
                }
            }
        }

        let strobe = self.config.strobe.is_some_and(|s| s.is_on(t));
        let mut frame = Frame::with_capacity(self.stage.samples.len());
        for (i, s) in self.stage.samples.iter().enumerate() {
            let c = self.compositor.resolve(i, self.config.base);
            frame.set(s.id, if strobe { c.inverted() } else { c });
        }
        trace!(waves = planes.len(), strobe, "orbit bands frame");
        frame.commit(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{dome, run};
    use crate::host::collect_samples;

    #[test]
    fn test_pool_bounded_by_ttl() {
        let mut host = dome();
        let config = OrbitBandsConfig::jawbreaker();
        let mut effect = OrbitBands::new(config, SpawnContext::seeded(1));
        run(&mut effect, &mut host, 60.0, 60 * 12);
        assert!(effect.live_waves() <= 10);
        assert!(effect.live_waves() >= 9);
    }

    #[test]
    fn test_unhit_panels_show_base() {
        let mut host = dome();
        let mut effect = OrbitBands::new(OrbitBandsConfig::jawbreaker(), SpawnContext::seeded(2));
        run(&mut effect, &mut host, 60.0, 30);
        let samples = collect_samples(&host);
        assert!(samples.iter().any(|s| host.color_of(s.id) == Some(Rgba::WHITE)));
        assert_eq!(host.last_batch(), samples.len());
    }

    #[test]
    fn test_strobe_duty() {
        let strobe = Strobe { hz: 10.0, duty: 0.5 };
        assert!(strobe.is_on(0.01));
        assert!(!strobe.is_on(0.07));
        assert!(strobe.is_on(0.12));
    }

    #[test]
    fn test_strobe_inverts_base() {
        let mut host = dome();
        let mut config = OrbitBandsConfig::candyorb();
        config.band_dm = 0.0001;
        let mut effect = OrbitBands::new(config, SpawnContext::seeded(3));
        effect.init(&mut host);
        effect.update(&mut host, 0.01, 0.01);
        let white = collect_samples(&host)
            .iter()
            .filter(|s| host.color_of(s.id) == Some(Rgba::WHITE))
            .count();
        assert!(white > 0);
    }
}
