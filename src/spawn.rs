//! Random source handed to spawners.
//!
//! Every effect owns one [`SpawnContext`]. Seeding it makes a run fully
//! reproducible, which the runner and the tests rely on.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::color::{hsl, hsv, Rgba};

/// Seeded RNG with helpers for the draws effects make when spawning.
///
/// ```ignore
/// let mut ctx = SpawnContext::seeded(7);
/// let radius = ctx.random_range(8.0, 12.0);
/// let azimuth = ctx.random_angle();
/// ```
#[derive(Debug, Clone)]
pub struct SpawnContext {
    rng: StdRng,
}

impl SpawnContext {
    /// Deterministic context.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Context seeded from the wall clock, different every run.
    pub fn from_clock() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` when the range is empty.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.random() * (max - min)
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform element of `items`, `None` when empty.
    #[inline]
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.random_index(items.len()))
    }

    /// Random `-1` or `1`.
    #[inline]
    pub fn random_sign(&mut self) -> f32 {
        if self.rng.gen::<bool>() {
            1.0
        } else {
            -1.0
        }
    }

    /// Random angle in `[0, 2pi)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.random() * TAU
    }

    /// Independent random angle per axis.
    pub fn random_euler(&mut self) -> Vec3 {
        Vec3::new(self.random_angle(), self.random_angle(), self.random_angle())
    }

    // ========== Color helpers ==========

    /// Bright color from a random hue.
    pub fn random_hsv(&mut self, saturation: (f32, f32), value: f32) -> Rgba {
        let h = self.random();
        let s = self.random_range(saturation.0, saturation.1);
        hsv(h, s, value)
    }

    /// Random hue at fixed saturation and lightness.
    pub fn random_hsl(&mut self, saturation: f32, lightness: f32) -> Rgba {
        let h = self.random();
        hsl(h, saturation, lightness)
    }

    /// Offset each RGB channel by up to `amount`, then clamp. Alpha is kept.
    pub fn jitter(&mut self, c: Rgba, amount: f32) -> Rgba {
        let mut j = |x: f32| (x + (self.random() * 2.0 - 1.0) * amount).clamp(0.0, 1.0);
        Rgba::new(j(c.r), j(c.g), j(c.b), c.a)
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::from_clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick() {
        let mut ctx = SpawnContext::seeded(3);
        let empty: [u8; 0] = [];
        assert_eq!(ctx.pick(&empty), None);
        let items = [4, 5, 6];
        for _ in 0..50 {
            assert!(items.contains(ctx.pick(&items).unwrap()));
        }
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = SpawnContext::seeded(11);
        let mut b = SpawnContext::seeded(11);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_random_range_bounds() {
        let mut ctx = SpawnContext::seeded(3);
        for _ in 0..1000 {
            let v = ctx.random_range(0.05, 0.5);
            assert!((0.05..0.5).contains(&v));
        }
        assert_eq!(ctx.random_range(2.0, 2.0), 2.0);
        assert_eq!(ctx.random_range(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_jitter_stays_in_gamut() {
        let mut ctx = SpawnContext::seeded(5);
        for _ in 0..200 {
            let c = ctx.jitter(Rgba::new(0.99, 0.01, 0.5, 0.3), 0.06);
            assert!((0.0..=1.0).contains(&c.r));
            assert!((0.0..=1.0).contains(&c.g));
            assert!((c.b - 0.5).abs() <= 0.06 + 1e-6);
            assert_eq!(c.a, 0.3);
        }
    }

    #[test]
    fn test_random_hsv_value() {
        let mut ctx = SpawnContext::seeded(9);
        for _ in 0..100 {
            let c = ctx.random_hsv((0.85, 1.0), 0.9);
            let max = c.r.max(c.g).max(c.b);
            assert!((max - 0.9).abs() < 1e-5);
        }
    }
}
