//! Rippled planes spawned on a schedule and stacked on a persistent canvas.
//!
//! Every wave is a moving [`SoftEdge`] plane with its own color. Where its
//! feather band passes a panel, the panel blends from the color it had when
//! the wave first reached it (its "under" color) toward the wave color.
//! Behind the band the panel holds the wave color; in front of it the under
//! color shows again. Once a wave has no panel left in its band or in front
//! of it, it is retired and the panels it touched keep its color for good.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::collision::{Ripple, SoftEdge};
use crate::color::Rgba;
use crate::composite::{BlendPolicy, Compositor, Frame};
use crate::effect::{Effect, EffectMeta};
use crate::emitter::{Cadence, Emitter};
use crate::error::{ensure_positive, Result, RippError};
use crate::host::Host;
use crate::math::smooth01;
use crate::motion::{PlaneMotion, Sweep};
use crate::palette::{NonRepeatingPicker, Palette, Swatch};
use crate::pool::{CapPolicy, Pool};
use crate::spawn::SpawnContext;

use super::{now_ms, Stage, PLANE_FALLBACK_RADIUS};

/// Settings for [`LayeredWaves`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredWavesConfig {
    pub name: String,
    pub fps: u32,
    pub duration: f32,
    pub palette: Palette,
    /// Per-wave motion; the spin and sweeps restart at each wave's birth.
    pub motion: PlaneMotion,
    pub spawn_ms: f32,
    pub edge: SoftEdge,
    pub background: Rgba,
    pub max_waves: usize,
}

impl Default for LayeredWavesConfig {
    fn default() -> Self {
        Self::wave_11()
    }
}

impl LayeredWavesConfig {
    // ===== PRESETS =====

    pub fn wave_11() -> Self {
        Self {
            name: "Planewave spawned waves, rolling band blend".into(),
            fps: 60,
            duration: 120.0,
            palette: Swatch::Harbor.palette(),
            motion: PlaneMotion::tilted_x(20.0)
                .spinning(3000.0)
                .sweeping(Sweep::new(70.0, -70.0, 2700.0), Sweep::new(-57.0, 75.0, 2000.0))
                .tumbling(90.0, 14_000.0),
            spawn_ms: 1800.0,
            edge: SoftEdge::feathered(1.8).with_ripple(Ripple {
                amplitude: 3.0,
                feather_gain: 0.75,
                cycles: 4.2,
                speed_hz: 0.06,
            }),
            background: Rgba::WHITE,
            max_waves: 24,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("layered_waves", "spawn_ms", self.spawn_ms)?;
        if self.max_waves == 0 {
            return Err(RippError::invalid("layered_waves", "`max_waves` must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Wave {
    born_ms: f32,
    color: Rgba,
    /// Canvas color of each touched sample when the band first reached it.
    under: HashMap<usize, Rgba>,
    in_band: bool,
    front_seen: bool,
}

impl Wave {
    fn new(born_ms: f32, color: Rgba) -> Self {
        Self {
            born_ms,
            color,
            under: HashMap::new(),
            in_band: false,
            front_seen: false,
        }
    }

    /// Touched panels, none left in the band and none in front of it.
    fn is_settled(&self) -> bool {
        !self.under.is_empty() && !self.in_band && !self.front_seen
    }
}

/// Spawned rippled planes over a persistent framebuffer.
#[derive(Debug)]
pub struct LayeredWaves {
    config: LayeredWavesConfig,
    ctx: SpawnContext,
    stage: Stage,
    picker: NonRepeatingPicker,
    emitter: Emitter,
    waves: Pool<Wave>,
    canvas: Compositor,
}

impl LayeredWaves {
    pub fn new(config: LayeredWavesConfig, mut ctx: SpawnContext) -> Self {
        let emitter = Emitter::new(Cadence::Scheduled { every: config.spawn_ms }, &mut ctx);
        let waves = Pool::new(config.max_waves, CapPolicy::TrimOldest);
        let canvas = Compositor::new(BlendPolicy::PersistentBase, 0, config.background);
        Self {
            config,
            ctx,
            stage: Stage::new(PLANE_FALLBACK_RADIUS),
            picker: NonRepeatingPicker::new(),
            emitter,
            waves,
            canvas,
        }
    }

    pub fn live_waves(&self) -> usize {
        self.waves.len()
    }

    fn spawn(&mut self, now: f32) {
        let color = self.picker.pick(&self.config.palette, &mut self.ctx);
        self.waves.push(Wave::new(now, color));
        debug!(at_ms = now, live = self.waves.len(), "wave spawned");
    }
}

impl Effect for LayeredWaves {
    fn meta(&self) -> EffectMeta {
        EffectMeta::new(
            &self.config.name,
            self.config.fps,
            self.config.duration,
            BlendPolicy::PersistentBase,
        )
    }

    fn init(&mut self, host: &mut dyn Host) {
        self.stage.capture(host);
        let bg = self.config.background;
        self.canvas = Compositor::new(BlendPolicy::PersistentBase, self.stage.samples.len(), bg);
        let mut frame = Frame::with_capacity(self.stage.samples.len());
        for s in &self.stage.samples {
            frame.set(s.id, bg);
        }
        frame.commit(host);

        self.waves.clear();
        self.emitter.reset(&mut self.ctx);
        self.emitter.mark_fired(0.0);
        self.spawn(0.0);
    }

    fn update(&mut self, host: &mut dyn Host, t: f32, dt: f32) {
        let now = now_ms(t);
        for _ in 0..self.emitter.poll(now, dt * 1000.0, &mut self.ctx) {
            self.spawn(now);
        }

        let center = self.stage.center();
        let motion = self.config.motion;
        let edge = self.config.edge;
        let planes: Vec<_> = self
            .waves
            .iter()
            .map(|w| motion.pose(center, now - w.born_ms, now - w.born_ms))
            .collect();
        for w in self.waves.iter_mut() {
            w.in_band = false;
            w.front_seen = false;
        }

        for (i, s) in self.stage.samples.iter().enumerate() {
            let mut col = self.canvas.canvas(i);
            for (wave, plane) in self.waves.iter_mut().zip(&planes) {
                let p = edge.profile(plane, s.position, t);
                let d = p.distance.abs();
                let bell = if p.feather > 0.0 && d < p.feather {
                    smooth01(1.0 - d / p.feather)
                } else {
                    0.0
                };
                if bell > 0.0 {
                    wave.in_band = true;
                    let under = *wave.under.entry(i).or_insert(col);
                    col = under.lerp(wave.color, bell);
                } else if let Some(&under) = wave.under.get(&i) {
                    // The solid side is behind the normal.
                    if -p.distance >= p.feather {
                        col = wave.color;
                    } else {
                        wave.front_seen = true;
                        col = under;
                    }
                }
            }
            self.canvas.set_canvas(i, col);
        }

        let canvas = &mut self.canvas;
        let retired = self.waves.retain(|w| {
            if w.is_settled() {
                for &i in w.under.keys() {
                    canvas.set_canvas(i, w.color);
                }
                false
            } else {
                true
            }
        });
        if retired > 0 {
            debug!(retired, "waves settled");
        }

        let mut frame = Frame::with_capacity(self.stage.samples.len());
        for (i, s) in self.stage.samples.iter().enumerate() {
            frame.set(s.id, self.canvas.canvas(i));
        }
        trace!(waves = self.waves.len(), "layered waves frame");
        frame.commit(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::dome;
    use crate::host::collect_samples;
    use crate::scene::SceneHost;

    #[test]
    fn test_spawns_on_schedule() {
        let mut host = dome();
        let mut effect = LayeredWaves::new(LayeredWavesConfig::wave_11(), SpawnContext::seeded(5));
        effect.init(&mut host);
        assert_eq!(effect.live_waves(), 1);
        effect.update(&mut host, 1.0, 1.0);
        assert!(effect.live_waves() <= 1);
        effect.update(&mut host, 1.8, 0.8);
        assert!(effect.live_waves() >= 1);
    }

    #[test]
    fn test_colors_stay_in_palette_hull() {
        let mut host = SceneHost::dome(Vec3::ZERO, 60.0, 8, 16);
        let mut effect = LayeredWaves::new(LayeredWavesConfig::wave_11(), SpawnContext::seeded(9));
        effect.init(&mut host);
        let dt = 1.0 / 60.0;
        for i in 1..=600 {
            effect.update(&mut host, i as f32 * dt, dt);
            assert!(effect.live_waves() <= 24);
        }
        for s in collect_samples(&host) {
            let c = host.color_of(s.id).unwrap();
            assert!(c.is_finite());
            assert_eq!(c.a, 1.0);
        }
    }

    #[test]
    fn test_wave_retires_once_every_touched_panel_is_solid() {
        let config = LayeredWavesConfig {
            motion: PlaneMotion::tilted(Vec3::ZERO)
                .sweeping(Sweep::new(0.0, 0.0, 0.0), Sweep::new(5.0, 140.0, 600.0)),
            spawn_ms: 60_000.0,
            edge: SoftEdge::feathered(30.0),
            ..LayeredWavesConfig::wave_11()
        };
        let mut host = dome();
        let mut effect = LayeredWaves::new(config, SpawnContext::seeded(3));
        effect.init(&mut host);
        let color = effect.waves.iter().next().unwrap().color;
        let motion = effect.config.motion;
        let edge = effect.config.edge;
        let center = effect.stage.center();
        let dt = 1.0 / 60.0;

        let mut touched: Vec<usize> = Vec::new();
        let mut retired_at = None;
        for frame in 1..=120 {
            let t = frame as f32 * dt;
            effect.update(&mut host, t, dt);
            let plane = motion.pose(center, now_ms(t), now_ms(t));
            let solid = |i: usize| {
                let p = edge.profile(&plane, effect.stage.samples[i].position, t);
                -p.distance >= p.feather
            };
            if effect.live_waves() == 1 {
                let wave = effect.waves.iter().next().unwrap();
                touched = wave.under.keys().copied().collect();
                assert!(!touched.is_empty());
                assert!(
                    touched.iter().any(|&i| !solid(i)),
                    "frame {frame}: wave outlived its last soft panel"
                );
            } else {
                // Nothing entered the band this frame, so the last snapshot is complete.
                assert!(touched.iter().all(|&i| solid(i)), "frame {frame}: retired early");
                retired_at = Some(frame);
                break;
            }
        }

        let retired_at = retired_at.expect("wave never retired");
        let ids: Vec<_> = touched
            .iter()
            .map(|&i| effect.stage.samples[i].id)
            .collect();
        for frame in retired_at + 1..=retired_at + 60 {
            effect.update(&mut host, frame as f32 * dt, dt);
            assert_eq!(effect.live_waves(), 0);
            for &id in &ids {
                assert_eq!(host.color_of(id), Some(color), "panel {id} lost the wave color");
            }
        }
    }

    #[test]
    fn test_settled_wave_commits_its_color() {
        let mut wave = Wave::new(0.0, Rgba::RED);
        assert!(!wave.is_settled());
        wave.under.insert(3, Rgba::WHITE);
        assert!(wave.is_settled());
        wave.front_seen = true;
        assert!(!wave.is_settled());
    }
}
