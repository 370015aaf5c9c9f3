//! Blending contributions into per-sample colors and emitting frames.
//!
//! # Blend policies
//!
//! | Policy | Per-sample result |
//! |--------|-------------------|
//! | [`BlendPolicy::Override`] | last contribution wins, else the base |
//! | [`BlendPolicy::AccumulateAlpha`] | Porter-Duff "over" of all contributions onto the base |
//! | [`BlendPolicy::PersistentBase`] | previous committed color, blended toward each contribution |
//!
//! ```ignore
//! let mut comp = Compositor::new(BlendPolicy::AccumulateAlpha, samples.len(), Rgba::BLACK);
//! comp.begin_frame();
//! comp.paint(i, band_color, envelope);
//! frame.set(id, comp.resolve(i, underlay));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::color::Rgba;
use crate::host::{ColorWrite, Host, PanelId};
use crate::math::clamp01;

/// How overlapping contributions combine on one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendPolicy {
    /// The most recent contribution replaces earlier ones (default).
    ///
    /// Effects feed entities oldest first so the newest wins.
    #[default]
    Override,

    /// Porter-Duff "over": each contribution covers what remains.
    ///
    /// Coverage saturates at alpha 1; later contributions stop mattering once
    /// less than `1e-6` remains.
    AccumulateAlpha,

    /// The frame starts from the previously committed color and each
    /// contribution blends toward its own color.
    PersistentBase,
}

/// Premultiplied Porter-Duff accumulator for one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverAccumulator {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl OverAccumulator {
    const MIN_REMAIN: f32 = 1e-6;

    /// Layer `color` with opacity `alpha` under everything added so far.
    #[inline]
    pub fn add(&mut self, color: Rgba, alpha: f32) {
        let remain = 1.0 - self.a;
        if remain > Self::MIN_REMAIN {
            let a = clamp01(alpha) * remain;
            self.r += color.r * a;
            self.g += color.g * a;
            self.b += color.b * a;
            self.a += a;
        }
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.a
    }

    /// Composite onto an opaque base.
    #[inline]
    pub fn over(&self, base: Rgba) -> Rgba {
        let inv = 1.0 - self.a;
        Rgba::rgb(
            self.r + base.r * inv,
            self.g + base.g * inv,
            self.b + base.b * inv,
        )
    }

    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Per-sample blending state for one effect.
#[derive(Debug, Clone)]
pub struct Compositor {
    policy: BlendPolicy,
    overrides: Vec<Option<Rgba>>,
    accum: Vec<OverAccumulator>,
    canvas: Vec<Rgba>,
}

impl Compositor {
    /// `initial` seeds the persistent canvas.
    pub fn new(policy: BlendPolicy, samples: usize, initial: Rgba) -> Self {
        let (overrides, accum, canvas) = match policy {
            BlendPolicy::Override => (vec![None; samples], Vec::new(), Vec::new()),
            BlendPolicy::AccumulateAlpha => {
                (Vec::new(), vec![OverAccumulator::default(); samples], Vec::new())
            }
            BlendPolicy::PersistentBase => (Vec::new(), Vec::new(), vec![initial; samples]),
        };
        Self {
            policy,
            overrides,
            accum,
            canvas,
        }
    }

    #[inline]
    pub fn policy(&self) -> BlendPolicy {
        self.policy
    }

    /// Clear per-frame contributions. The persistent canvas is kept.
    pub fn begin_frame(&mut self) {
        self.overrides.iter_mut().for_each(|o| *o = None);
        self.accum.iter_mut().for_each(OverAccumulator::clear);
    }

    /// Contribute `color` at opacity `alpha` to sample `i`.
    #[inline]
    pub fn paint(&mut self, i: usize, color: Rgba, alpha: f32) {
        match self.policy {
            BlendPolicy::Override => self.overrides[i] = Some(color),
            BlendPolicy::AccumulateAlpha => self.accum[i].add(color, alpha),
            BlendPolicy::PersistentBase => {
                self.canvas[i] = self.canvas[i].lerp(color, clamp01(alpha));
            }
        }
    }

    /// Final color of sample `i` over `base`.
    ///
    /// `base` is ignored by the persistent policy.
    #[inline]
    pub fn resolve(&self, i: usize, base: Rgba) -> Rgba {
        match self.policy {
            BlendPolicy::Override => self.overrides[i].unwrap_or(base),
            BlendPolicy::AccumulateAlpha => self.accum[i].over(base),
            BlendPolicy::PersistentBase => self.canvas[i],
        }
    }

    /// Persistent color of sample `i`.
    #[inline]
    pub fn canvas(&self, i: usize) -> Rgba {
        self.canvas[i]
    }

    #[inline]
    pub fn set_canvas(&mut self, i: usize, color: Rgba) {
        self.canvas[i] = color;
    }
}

/// One batch of color writes.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    writes: Vec<ColorWrite>,
}

impl Frame {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            writes: Vec::with_capacity(n),
        }
    }

    /// Queue a write, clamping every channel into `[0, 1]`.
    #[inline]
    pub fn set(&mut self, id: PanelId, color: Rgba) {
        self.writes.push(ColorWrite {
            id,
            color: color.clamped(),
        });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[ColorWrite] {
        &self.writes
    }

    /// Push the batch to the host if it is not empty. Returns the write count.
    pub fn commit(self, host: &mut dyn Host) -> usize {
        let n = self.writes.len();
        if n > 0 {
            host.set_colors(&self.writes);
        }
        n
    }
}

/// Paints only the panels whose hit state changed since the last frame.
#[derive(Debug, Clone, Default)]
pub struct HitDiff {
    last: HashSet<PanelId>,
}

impl HitDiff {
    /// Emit `off` for panels that left the hit set and `on` for new ones.
    pub fn apply(&mut self, hit: HashSet<PanelId>, on: Rgba, off: Rgba, frame: &mut Frame) {
        for id in self.last.difference(&hit) {
            frame.set(*id, off);
        }
        for id in hit.difference(&self.last) {
            frame.set(*id, on);
        }
        self.last = hit;
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}

/// Remembers the last painted color per panel to skip redundant writes.
#[derive(Debug, Clone, Default)]
pub struct PaintCache {
    painted: HashMap<PanelId, [i32; 4]>,
}

impl PaintCache {
    /// Queue `color` unless it matches what was last painted (to 3 decimals).
    pub fn paint(&mut self, id: PanelId, color: Rgba, frame: &mut Frame) {
        let key = color.quantized();
        if self.painted.insert(id, key) != Some(key) {
            frame.set(id, color);
        }
    }

    /// Drop entries for panels no longer present.
    pub fn retain_ids(&mut self, ids: &HashSet<PanelId>) {
        self.painted.retain(|id, _| ids.contains(id));
    }

    pub fn len(&self) -> usize {
        self.painted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.painted.is_empty()
    }

    pub fn clear(&mut self) {
        self.painted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_saturates() {
        let mut acc = OverAccumulator::default();
        for i in 0..50 {
            acc.add(Rgba::RED, 0.3 + (i % 3) as f32 * 0.3);
            assert!(acc.alpha() <= 1.0);
        }
        acc.add(Rgba::WHITE, 5.0);
        assert!(acc.alpha() <= 1.0);
    }

    #[test]
    fn test_over_composite() {
        let mut acc = OverAccumulator::default();
        acc.add(Rgba::RED, 0.5);
        let c = acc.over(Rgba::BLUE);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.b - 0.5).abs() < 1e-6);
        assert_eq!(c.a, 1.0);

        acc.add(Rgba::GREEN, 1.0);
        let c = acc.over(Rgba::BLUE);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
        assert!(c.b.abs() < 1e-6);
    }

    #[test]
    fn test_compositor_override() {
        let mut comp = Compositor::new(BlendPolicy::Override, 2, Rgba::WHITE);
        comp.begin_frame();
        comp.paint(0, Rgba::RED, 1.0);
        comp.paint(0, Rgba::GREEN, 1.0);
        assert_eq!(comp.resolve(0, Rgba::WHITE), Rgba::GREEN);
        assert_eq!(comp.resolve(1, Rgba::WHITE), Rgba::WHITE);
        comp.begin_frame();
        assert_eq!(comp.resolve(0, Rgba::BLACK), Rgba::BLACK);
    }

    #[test]
    fn test_compositor_persistent() {
        let mut comp = Compositor::new(BlendPolicy::PersistentBase, 1, Rgba::WHITE);
        comp.begin_frame();
        comp.paint(0, Rgba::BLACK, 0.5);
        comp.begin_frame();
        let c = comp.resolve(0, Rgba::RED);
        assert!((c.r - 0.5).abs() < 1e-6 && (c.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_frame_clamps() {
        let mut frame = Frame::default();
        frame.set(1, Rgba::new(1.5, -0.5, 0.5, 2.0));
        assert_eq!(frame.writes()[0].color, Rgba::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn test_hit_diff() {
        let mut diff = HitDiff::default();
        let mut frame = Frame::default();
        diff.apply([1, 2].into_iter().collect(), Rgba::ORANGE, Rgba::WHITE, &mut frame);
        assert_eq!(frame.len(), 2);

        let mut frame = Frame::default();
        diff.apply([2, 3].into_iter().collect(), Rgba::ORANGE, Rgba::WHITE, &mut frame);
        let w = frame.writes();
        assert_eq!(w.len(), 2);
        assert!(w.contains(&ColorWrite { id: 1, color: Rgba::WHITE }));
        assert!(w.contains(&ColorWrite { id: 3, color: Rgba::ORANGE }));
    }

    #[test]
    fn test_paint_cache_skips_repeats() {
        let mut cache = PaintCache::default();
        let mut frame = Frame::default();
        cache.paint(4, Rgba::RED, &mut frame);
        cache.paint(4, Rgba::new(1.0, 0.0001, 0.0, 1.0), &mut frame);
        cache.paint(4, Rgba::BLUE, &mut frame);
        assert_eq!(frame.len(), 2);
        cache.retain_ids(&HashSet::new());
        assert!(cache.is_empty());
    }
}
