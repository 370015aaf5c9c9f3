//! Spheres falling from the crown to the bottom of the dome along meridians.
//!
//! One engine covers every drop variant in the catalog. A config picks four
//! independent behaviours:
//!
//! | Axis | Choices |
//! |------|---------|
//! | [`DropMotion`] | timed travel through a [`MotionProfile`], or a per-frame [`GeometricStep`] |
//! | [`DropSize`] | fixed, scaled by a random spread, or drawn from a range |
//! | [`DropColor`] | solid, palette with jitter, HSV every N drops, or a no-repeat bag |
//! | [`DropPaint`] | hit diff over a base, fading tracers, or persistent trails |
//!
//! Timed drops seed one drop at init and paint immediately; geometric drops
//! seed on the first update, before the emitter runs.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f32::consts::FRAC_PI_2;
use tracing::{debug, trace};

use crate::collision::Sphere;
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Frame, HitDiff, PaintCache};
use crate::dome::meridian_point;
use crate::effect::{Effect, EffectMeta};
use crate::emitter::{Cadence, Emitter};
use crate::error::{ensure_positive, ensure_range, Result, RippError};
use crate::host::{Host, PanelId};
use crate::lifecycle::{GeometricStep, MotionProfile, TimedTravel};
use crate::math::smooth01;
use crate::palette::{NoRepeatBag, Palette, Swatch};
use crate::pool::{CapPolicy, Pool};
use crate::spawn::SpawnContext;

use super::{now_ms, Stage, PLANE_FALLBACK_RADIUS};

/// Ghost alpha below which a tracer is forgotten.
const GHOST_CUTOFF: f32 = 0.001;

/// How a drop moves down its meridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DropMotion {
    /// Crown to bottom in `lifetime_ms`, reshaped by `profile`.
    Timed {
        lifetime_ms: f32,
        profile: MotionProfile,
    },
    /// Frame-driven accelerating step from a random start fraction.
    Geometric {
        start: (f32, f32),
        step: f32,
        accel: f32,
        max_step: f32,
    },
}

/// Collision radius of a new drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DropSize {
    Fixed { radius: f32 },
    /// `radius * (1 + r)` with `r` drawn from `[-spread, spread)`.
    Scaled { radius: f32, spread: f32 },
    Range { min: f32, max: f32 },
}

impl DropSize {
    fn draw(&self, ctx: &mut SpawnContext) -> f32 {
        match *self {
            DropSize::Fixed { radius } => radius,
            DropSize::Scaled { radius, spread } => {
                radius * (1.0 + ctx.random_range(-spread, spread))
            }
            DropSize::Range { min, max } => ctx.random_range(min, max),
        }
    }
}

/// Color source for new drops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropColor {
    Solid(Rgba),
    /// Random palette pick with every RGB channel jittered by `amount`.
    Jittered { palette: Palette, amount: f32 },
    /// A fresh bright HSV color for every `every` drops.
    HsvEvery {
        every: u32,
        saturation: (f32, f32),
        value: f32,
    },
    /// Palette drawn without replacement.
    Bag(Palette),
}

/// How hits reach the panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DropPaint {
    /// Write `Solid` color on panels entering a drop, `base` on panels leaving.
    HitDiff { base: Rgba },
    /// Hits opaque, recently hit panels fade out over `ghost_ms`. Starts transparent.
    Tracers { ghost_ms: f32, ghost_alpha: f32 },
    /// Hit panels keep the drop color until another drop covers them.
    Trails { base: Rgba },
}

impl DropPaint {
    fn base(&self) -> Rgba {
        match *self {
            DropPaint::HitDiff { base } | DropPaint::Trails { base } => base,
            DropPaint::Tracers { .. } => Rgba::TRANSPARENT,
        }
    }
}

/// Settings for [`MeridianDrops`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeridianDropsConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    /// Spawn cadence in milliseconds.
    pub cadence: Cadence,
    pub motion: DropMotion,
    pub size: DropSize,
    /// Horizontal squash of the collision sphere; `1.0` is round.
    pub squash: f32,
    /// Fixed meridian in radians; `None` draws one per drop.
    pub azimuth: Option<f32>,
    pub color: DropColor,
    pub paint: DropPaint,
    pub max_live: usize,
}

impl Default for MeridianDropsConfig {
    fn default() -> Self {
        Self::orange_rain()
    }
}

impl MeridianDropsConfig {
    // ===== PRESETS =====

    /// Orange spheres down one meridian every half second.
    pub fn orange_rain() -> Self {
        Self {
            name: "Emitter: top to bottom spheres (orange)".into(),
            fps: 60,
            duration: 120.0,
            cadence: Cadence::Fixed { period: 500.0 },
            motion: DropMotion::Timed {
                lifetime_ms: 2000.0,
                profile: MotionProfile::Linear,
            },
            size: DropSize::Fixed { radius: 12.5 },
            squash: 1.0,
            azimuth: Some(FRAC_PI_2),
            color: DropColor::Solid(Rgba::ORANGE),
            paint: DropPaint::HitDiff { base: Rgba::WHITE },
            max_live: 600,
        }
    }

    /// Tall black drops at a fast random cadence, easing in.
    pub fn ink_rain() -> Self {
        Self {
            name: "Drops: top to bottom (black, ease-in, random spawn)".into(),
            cadence: Cadence::Jittered { min: 1.0, max: 58.0 },
            motion: DropMotion::Timed {
                lifetime_ms: 1333.0,
                profile: MotionProfile::CircularEaseIn,
            },
            size: DropSize::Scaled {
                radius: 12.5,
                spread: 0.35,
            },
            squash: 0.8,
            azimuth: None,
            color: DropColor::Solid(Rgba::BLACK),
            ..Self::orange_rain()
        }
    }

    /// Autumn drops leaving fading tracers on a transparent dome.
    pub fn lava_tracers() -> Self {
        Self {
            name: "Raindrops: autumn tracers".into(),
            cadence: Cadence::Jittered { min: 20.0, max: 80.0 },
            motion: DropMotion::Timed {
                lifetime_ms: 800.0,
                profile: MotionProfile::CubicBell,
            },
            size: DropSize::Range { min: 8.0, max: 12.0 },
            squash: 0.7,
            azimuth: None,
            color: DropColor::Jittered {
                palette: Swatch::Autumn.palette(),
                amount: 0.06,
            },
            paint: DropPaint::Tracers {
                ghost_ms: 700.0,
                ghost_alpha: 0.6,
            },
            ..Self::orange_rain()
        }
    }

    /// Accelerating orange spheres from random start points.
    ///
    /// Every frame is diffed and committed even with no live sphere, so the
    /// last hits go back to the base color instead of lingering.
    pub fn orange_emitter() -> Self {
        Self {
            name: "Emitter: top to bottom (orange, geometric accel, random start)".into(),
            cadence: Cadence::Fixed { period: 100.0 },
            motion: DropMotion::Geometric {
                start: (0.07, 0.15),
                step: 0.005,
                accel: 1.05,
                max_step: 0.06,
            },
            size: DropSize::Fixed { radius: 15.0 },
            azimuth: None,
            ..Self::orange_rain()
        }
    }

    /// Bright HSV trails on black, a new hue every 20 drops.
    pub fn volcano() -> Self {
        Self {
            name: "Emitter: top to bottom (HSV trails on black)".into(),
            fps: 30,
            cadence: Cadence::Fixed { period: 45.0 },
            motion: DropMotion::Geometric {
                start: (0.07, 0.15),
                step: 0.007,
                accel: 1.55,
                max_step: 0.09,
            },
            size: DropSize::Fixed { radius: 12.0 },
            azimuth: None,
            color: DropColor::HsvEvery {
                every: 20,
                saturation: (0.85, 1.0),
                value: 0.9,
            },
            paint: DropPaint::Trails { base: Rgba::BLACK },
            ..Self::orange_rain()
        }
    }

    /// Large trails from a no-repeat ember palette on white.
    pub fn vapor_paint() -> Self {
        Self {
            name: "Emitter: top to bottom (trails, no-repeat palette)".into(),
            cadence: Cadence::Fixed { period: 45.0 },
            motion: DropMotion::Geometric {
                start: (0.07, 0.15),
                step: 0.01,
                accel: 1.55,
                max_step: 0.06,
            },
            size: DropSize::Range { min: 5.0, max: 32.5 },
            azimuth: None,
            color: DropColor::Bag(Swatch::Ember.palette()),
            paint: DropPaint::Trails { base: Rgba::WHITE },
            ..Self::orange_rain()
        }
    }

    pub fn validate(&self) -> Result<()> {
        const KIND: &str = "meridian_drops";
        match self.cadence {
            Cadence::Fixed { period } => ensure_positive(KIND, "cadence.period", period)?,
            Cadence::Jittered { min, max } => {
                ensure_range(KIND, "cadence", min, max)?;
                ensure_positive(KIND, "cadence.max", max)?;
            }
            Cadence::Scheduled { every } => ensure_positive(KIND, "cadence.every", every)?,
            Cadence::Once => {}
        }
        match self.motion {
            DropMotion::Timed { lifetime_ms, .. } => {
                ensure_positive(KIND, "lifetime_ms", lifetime_ms)?
            }
            DropMotion::Geometric {
                start,
                step,
                accel,
                max_step,
            } => {
                ensure_range(KIND, "start", start.0, start.1)?;
                ensure_positive(KIND, "step", step)?;
                ensure_positive(KIND, "accel", accel)?;
                ensure_positive(KIND, "max_step", max_step)?;
            }
        }
        match self.size {
            DropSize::Fixed { radius } | DropSize::Scaled { radius, .. } => {
                ensure_positive(KIND, "radius", radius)?
            }
            DropSize::Range { min, max } => ensure_range(KIND, "size", min, max)?,
        }
        ensure_positive(KIND, "squash", self.squash)?;
        if let DropColor::HsvEvery { every: 0, .. } = self.color {
            return Err(RippError::invalid(KIND, "`color.every` must be at least 1"));
        }
        if let DropPaint::Tracers { ghost_ms, .. } = self.paint {
            ensure_positive(KIND, "ghost_ms", ghost_ms)?;
        }
        if matches!(self.paint, DropPaint::HitDiff { .. })
            && !matches!(self.color, DropColor::Solid(_))
        {
            return Err(RippError::invalid(KIND, "hit diff painting needs a solid drop color"));
        }
        if self.max_live == 0 {
            return Err(RippError::invalid(KIND, "`max_live` must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Raindrop {
    born_ms: f32,
    azimuth: f32,
    radius: f32,
    color: Rgba,
    step: Option<GeometricStep>,
}

#[derive(Debug, Clone, Copy)]
struct Ghost {
    color: Rgba,
    since_ms: f32,
    alpha: f32,
}

/// Runtime color source.
#[derive(Debug, Clone)]
enum ColorSource {
    Solid(Rgba),
    Jittered { palette: Palette, amount: f32 },
    HsvEvery {
        every: u32,
        saturation: (f32, f32),
        value: f32,
        current: Rgba,
    },
    Bag(NoRepeatBag),
}

impl ColorSource {
    fn new(color: &DropColor) -> Self {
        match color {
            DropColor::Solid(c) => ColorSource::Solid(*c),
            DropColor::Jittered { palette, amount } => ColorSource::Jittered {
                palette: palette.clone(),
                amount: *amount,
            },
            DropColor::HsvEvery {
                every,
                saturation,
                value,
            } => ColorSource::HsvEvery {
                every: *every,
                saturation: *saturation,
                value: *value,
                current: Rgba::ORANGE,
            },
            DropColor::Bag(palette) => ColorSource::Bag(NoRepeatBag::new(palette.clone())),
        }
    }

    /// Color of drop number `spawned`, counting from zero.
    fn next(&mut self, spawned: u64, ctx: &mut SpawnContext) -> Rgba {
        match self {
            ColorSource::Solid(c) => *c,
            ColorSource::Jittered { palette, amount } => {
                let c = palette.pick(ctx);
                ctx.jitter(c, *amount)
            }
            ColorSource::HsvEvery {
                every,
                saturation,
                value,
                current,
            } => {
                if spawned % u64::from(*every) == 0 {
                    *current = ctx.random_hsv(*saturation, *value);
                }
                *current
            }
            ColorSource::Bag(bag) => bag.draw(ctx),
        }
    }
}

/// Meridian drop emitter.
#[derive(Debug)]
pub struct MeridianDrops {
    config: MeridianDropsConfig,
    ctx: SpawnContext,
    stage: Stage,
    id_count: usize,
    emitter: Emitter,
    drops: Pool<Raindrop>,
    colors: ColorSource,
    spawned: u64,
    seed_pending: bool,
    diff: HitDiff,
    ghosts: HashMap<PanelId, Ghost>,
    cache: PaintCache,
}

impl MeridianDrops {
    pub fn new(config: MeridianDropsConfig, mut ctx: SpawnContext) -> Self {
        let emitter = Emitter::new(config.cadence, &mut ctx);
        let colors = ColorSource::new(&config.color);
        Self {
            drops: Pool::new(config.max_live, CapPolicy::RejectNew),
            config,
            ctx,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            id_count: 0,
            emitter,
            colors,
            spawned: 0,
            seed_pending: false,
            diff: HitDiff::default(),
            ghosts: HashMap::new(),
            cache: PaintCache::default(),
        }
    }

    pub fn live_drops(&self) -> usize {
        self.drops.len()
    }

    /// Drops spawned so far, including any the pool rejected.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    fn spawn(&mut self, now: f32) {
        let color = self.colors.next(self.spawned, &mut self.ctx);
        self.spawned += 1;
        if self.drops.is_full() {
            return;
        }
        let step = match self.config.motion {
            DropMotion::Timed { .. } => None,
            DropMotion::Geometric {
                start,
                step,
                accel,
                max_step,
            } => Some(GeometricStep::new(
                self.ctx.random_range(start.0, start.1),
                step,
                accel,
                max_step,
            )),
        };
        let azimuth = match self.config.azimuth {
            Some(a) => a,
            None => self.ctx.random_angle(),
        };
        let drop = Raindrop {
            born_ms: now,
            azimuth,
            radius: self.config.size.draw(&mut self.ctx),
            color,
            step,
        };
        self.drops.push(drop);
    }

    /// Path fraction of `drop` at `now`.
    fn progress(&self, drop: &Raindrop, now: f32) -> f32 {
        match (drop.step, self.config.motion) {
            (Some(step), _) => step.position(),
            (None, DropMotion::Timed { lifetime_ms, profile }) => {
                profile.apply(TimedTravel::new(drop.born_ms, lifetime_ms).progress(now))
            }
            (None, DropMotion::Geometric { .. }) => 0.0,
        }
    }

    fn sphere(&self, drop: &Raindrop, now: f32) -> Sphere {
        let center = meridian_point(&self.stage.dome, self.progress(drop, now), drop.azimuth);
        Sphere::new(center, drop.radius).squashed(self.config.squash)
    }

    /// Advance drops and drop the ones that left the path or ran out of time.
    fn age(&mut self, now: f32) {
        let culled = match self.config.motion {
            DropMotion::Timed { lifetime_ms, .. } => {
                self.drops.retain(|d| now - d.born_ms < lifetime_ms)
            }
            DropMotion::Geometric { .. } => self.drops.retain_mut(|d| {
                d.radius.is_finite() && d.step.as_mut().is_some_and(|s| s.advance().is_alive())
            }),
        };
        let over = self.drops.truncate_oldest(self.config.max_live);
        if culled + over > 0 {
            trace!(culled, over, live = self.drops.len(), "drops culled");
        }
    }

    fn paint(&mut self, host: &mut dyn Host, now: f32) {
        let spheres: Vec<(Sphere, Rgba)> = self
            .drops
            .iter()
            .map(|d| (self.sphere(d, now), d.color))
            .collect();
        let mut frame = Frame::default();

        match self.config.paint {
            DropPaint::HitDiff { base } => {
                let on = match self.config.color {
                    DropColor::Solid(c) => c,
                    _ => Rgba::ORANGE,
                };
                let hit: HashSet<PanelId> = self
                    .stage
                    .samples
                    .iter()
                    .filter(|s| spheres.iter().any(|(sphere, _)| sphere.contains(s.position)))
                    .map(|s| s.id)
                    .collect();
                self.diff.apply(hit, on, base, &mut frame);
            }
            DropPaint::Tracers { ghost_ms, ghost_alpha } => {
                let mut hits: HashMap<PanelId, Rgba> = HashMap::new();
                for (sphere, color) in &spheres {
                    for s in &self.stage.samples {
                        if sphere.contains(s.position) {
                            hits.insert(s.id, *color);
                        }
                    }
                }

                self.ghosts.retain(|_, g| {
                    g.alpha = ghost_alpha * (1.0 - smooth01((now - g.since_ms) / ghost_ms));
                    g.alpha > GHOST_CUTOFF
                });
                for (&id, &color) in &hits {
                    self.ghosts.insert(
                        id,
                        Ghost {
                            color,
                            since_ms: now,
                            alpha: ghost_alpha,
                        },
                    );
                }

                for s in &self.stage.samples {
                    if let Some(c) = hits.get(&s.id) {
                        frame.set(s.id, c.with_alpha(1.0));
                    } else if let Some(g) = self.ghosts.get(&s.id) {
                        frame.set(s.id, g.color.with_alpha(g.alpha));
                    }
                }
            }
            DropPaint::Trails { .. } => {
                for (sphere, color) in &spheres {
                    for s in &self.stage.samples {
                        if sphere.contains(s.position) {
                            self.cache.paint(s.id, color.with_alpha(1.0), &mut frame);
                        }
                    }
                }
            }
        }

        trace!(drops = spheres.len(), writes = frame.len(), "meridian drops frame");
        frame.commit(host);
    }

    /// Pick up panels added or removed since init and forget stale cache entries.
    fn refresh_ids(&mut self, host: &dyn Host) {
        let count = host.ids().len();
        if count != self.id_count {
            self.stage.capture(host);
            self.id_count = count;
            let ids: HashSet<PanelId> = self.stage.samples.iter().map(|s| s.id).collect();
            self.cache.retain_ids(&ids);
            self.ghosts.retain(|id, _| ids.contains(id));
            debug!(panels = ids.len(), "drop panel set changed");
        }
    }
}

impl Effect for MeridianDrops {
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
        self.id_count = host.ids().len();
        host.reset_colors_to(self.config.paint.base());

        self.drops.clear();
        self.diff.clear();
        self.ghosts.clear();
        self.cache.clear();
        self.colors = ColorSource::new(&self.config.color);
        self.spawned = 0;
        self.emitter.reset(&mut self.ctx);

        match self.config.motion {
            DropMotion::Timed { .. } => {
                self.seed_pending = false;
                self.spawn(0.0);
                self.paint(host, 0.0);
            }
            DropMotion::Geometric { .. } => self.seed_pending = true,
        }
        debug!(panels = self.stage.samples.len(), "meridian drops ready");
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, dt: f32) {
        let now = now_ms(t);
        self.refresh_ids(host);

        if std::mem::take(&mut self.seed_pending) {
            self.spawn(now);
        }
        for _ in 0..self.emitter.poll(now, dt * 1000.0, &mut self.ctx) {
            self.spawn(now);
        }

        self.age(now);
        self.paint(host, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::{dome, run};
    use crate::host::collect_samples;

    #[test]
    fn test_orange_rain_cadence() {
        let mut host = dome();
        let mut effect =
            MeridianDrops::new(MeridianDropsConfig::orange_rain(), SpawnContext::seeded(1));
        effect.init(&mut host);
        assert_eq!(effect.live_drops(), 1);
        let dt = 1.0 / 60.0;
        for i in 1..=(60 * 3) {
            effect.update(&mut host, i as f32 * dt, dt);
        }
        // Lifetime 2 s at one drop per 0.5 s.
        assert!((3..=5).contains(&effect.live_drops()), "{}", effect.live_drops());
    }

    #[test]
    fn test_hit_diff_only_orange_or_white() {
        let mut host = dome();
        let mut effect =
            MeridianDrops::new(MeridianDropsConfig::orange_rain(), SpawnContext::seeded(2));
        effect.init(&mut host);
        let samples = collect_samples(&host);
        let dt = 1.0 / 60.0;
        let mut saw_orange = false;
        for i in 1..=180 {
            effect.update(&mut host, i as f32 * dt, dt);
            for s in &samples {
                let c = host.color_of(s.id).unwrap();
                assert!(c == Rgba::WHITE || c == Rgba::ORANGE);
                saw_orange |= c == Rgba::ORANGE;
            }
        }
        assert!(saw_orange);
    }

    #[test]
    fn test_tracers_fade() {
        let mut host = dome();
        let mut effect =
            MeridianDrops::new(MeridianDropsConfig::lava_tracers(), SpawnContext::seeded(3));
        effect.init(&mut host);
        let samples = collect_samples(&host);
        let dt = 1.0 / 60.0;
        let (mut saw_hit, mut saw_ghost) = (false, false);
        for i in 1..=240 {
            effect.update(&mut host, i as f32 * dt, dt);
            for c in samples.iter().filter_map(|s| host.color_of(s.id)) {
                assert!((0.0..=1.0).contains(&c.a));
                saw_hit |= c.a == 1.0;
                saw_ghost |= c.a > 0.0 && c.a < 0.6;
            }
        }
        assert!(saw_hit);
        assert!(saw_ghost);
    }

    #[test]
    fn test_geometric_seed_on_first_update() {
        let mut host = dome();
        let mut effect =
            MeridianDrops::new(MeridianDropsConfig::orange_emitter(), SpawnContext::seeded(4));
        effect.init(&mut host);
        assert_eq!(effect.live_drops(), 0);
        effect.update(&mut host, 1.0 / 60.0, 1.0 / 60.0);
        assert_eq!(effect.spawned(), 1);
        assert_eq!(effect.live_drops(), 1);
    }

    #[test]
    fn test_hits_clear_once_no_drop_is_live() {
        let config = MeridianDropsConfig {
            cadence: Cadence::Once,
            size: DropSize::Fixed { radius: 40.0 },
            ..MeridianDropsConfig::orange_emitter()
        };
        let mut host = dome();
        let mut effect = MeridianDrops::new(config, SpawnContext::seeded(8));
        effect.init(&mut host);
        let samples = collect_samples(&host);
        let dt = 1.0 / 60.0;

        let mut saw_orange = false;
        let mut frame = 0;
        while frame < 600 {
            frame += 1;
            effect.update(&mut host, frame as f32 * dt, dt);
            saw_orange |= samples
                .iter()
                .any(|s| host.color_of(s.id) == Some(Rgba::ORANGE));
            if effect.spawned() > 0 && effect.live_drops() == 0 {
                break;
            }
        }
        assert!(saw_orange);
        assert_eq!(effect.live_drops(), 0);

        for later in frame..frame + 10 {
            for s in &samples {
                assert_eq!(host.color_of(s.id), Some(Rgba::WHITE), "panel {} kept a hit", s.id);
            }
            effect.update(&mut host, (later + 1) as f32 * dt, dt);
        }
    }

    #[test]
    fn test_geometric_drops_finish() {
        let mut host = dome();
        let mut effect =
            MeridianDrops::new(MeridianDropsConfig::vapor_paint(), SpawnContext::seeded(5));
        run(&mut effect, &mut host, 60.0, 60);
        // Steps cap at 0.06 per frame, so nothing outlives about 20 frames.
        assert!(effect.live_drops() <= 25, "{}", effect.live_drops());
        assert!(effect.live_drops() <= effect.spawned() as usize);
    }

    #[test]
    fn test_hsv_color_changes_every_twenty() {
        let mut ctx = SpawnContext::seeded(6);
        let mut colors = ColorSource::new(&MeridianDropsConfig::volcano().color);
        let first = colors.next(0, &mut ctx);
        for n in 1..20 {
            assert_eq!(colors.next(n, &mut ctx), first);
        }
        assert_ne!(colors.next(20, &mut ctx), first);
    }

    #[test]
    fn test_trails_write_only_changes() {
        let mut host = dome();
        let mut effect =
            MeridianDrops::new(MeridianDropsConfig::volcano(), SpawnContext::seeded(7));
        run(&mut effect, &mut host, 30.0, 90);
        let panels = host.panel_count() as u64;
        assert!(host.writes_total() < panels * 90);
        for s in collect_samples(&host) {
            assert_eq!(host.color_of(s.id).unwrap().a, 1.0);
        }
    }

    #[test]
    fn test_validate_presets() {
        for cfg in [
            MeridianDropsConfig::orange_rain(),
            MeridianDropsConfig::ink_rain(),
            MeridianDropsConfig::lava_tracers(),
            MeridianDropsConfig::orange_emitter(),
            MeridianDropsConfig::volcano(),
            MeridianDropsConfig::vapor_paint(),
        ] {
            assert!(cfg.validate().is_ok(), "{}", cfg.name);
        }
        let bad = MeridianDropsConfig {
            color: DropColor::Bag(Swatch::Ember.palette()),
            ..MeridianDropsConfig::orange_rain()
        };
        assert!(bad.validate().is_err());
    }
}
