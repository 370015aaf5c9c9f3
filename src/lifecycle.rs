//! Entity lifecycle: how a spawned wave or drop moves and when it ends.
//!
//! Every entity moves through `Spawned -> Active -> (Expired | Completed)`.
//! Three advance rules cover the catalog:
//!
//! | Rule | Progress | Ends when |
//! |------|----------|-----------|
//! | [`TimedTravel`] | `clamp((now - birth) / duration)` | `now - birth >= duration` |
//! | [`GeometricStep`] | `s += step; step = min(step * accel, max)` | `s >= 1`, overshoot, or bad state |
//! | [`Oscillation`] | `0.5 * (1 + sin(2pi/period * t + phase))` | never; culled by TTL |
//!
//! # Motion profiles
//!
//! A [`TimedTravel`] progress is reshaped by a [`MotionProfile`] before it is
//! mapped onto a path:
//!
//! ```ignore
//! let travel = TimedTravel::new(born_ms, 1333.0);
//! let s = MotionProfile::CircularEaseIn.apply(travel.progress(now_ms));
//! let center = meridian_point(&dome, s, azimuth);
//! ```

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::math::{alpha_envelope, clamp01};

/// Where an entity is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// Ran out of time.
    Expired,
    /// Reached the end of its path.
    Completed,
}

impl Phase {
    #[inline]
    pub fn is_alive(self) -> bool {
        self == Phase::Active
    }
}

/// Travel over a fixed duration from `birth`.
///
/// Units are whatever the owner uses for time; seconds and milliseconds both
/// appear in the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedTravel {
    pub birth: f32,
    pub duration: f32,
}

impl TimedTravel {
    pub fn new(birth: f32, duration: f32) -> Self {
        Self { birth, duration }
    }

    #[inline]
    pub fn age(&self, now: f32) -> f32 {
        now - self.birth
    }

    /// Normalized progress, clamped into `[0, 1]`.
    #[inline]
    pub fn progress(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        clamp01(self.age(now) / self.duration)
    }

    /// `sin(pi * u)`: transparent at birth and at the end.
    #[inline]
    pub fn envelope(&self, now: f32) -> f32 {
        alpha_envelope(self.progress(now))
    }

    #[inline]
    pub fn is_complete(&self, now: f32) -> bool {
        self.age(now) >= self.duration
    }

    pub fn phase(&self, now: f32) -> Phase {
        if self.is_complete(now) {
            Phase::Expired
        } else {
            Phase::Active
        }
    }
}

/// Accelerating progress along a path, one step per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricStep {
    /// Current path parameter.
    pub s: f32,
    pub step: f32,
    pub accel: f32,
    pub max_step: f32,
    /// Cull threshold slightly past the end.
    pub overshoot: f32,
}

impl GeometricStep {
    pub const OVERSHOOT: f32 = 1.02;

    pub fn new(s: f32, step: f32, accel: f32, max_step: f32) -> Self {
        Self {
            s,
            step,
            accel,
            max_step,
            overshoot: Self::OVERSHOOT,
        }
    }

    /// Grow the step, then move. The step is capped before it is applied.
    pub fn advance(&mut self) -> Phase {
        if !self.s.is_finite() || !self.step.is_finite() {
            return Phase::Expired;
        }
        self.step = (self.step * self.accel).min(self.max_step);
        if self.step <= 0.0 {
            return Phase::Expired;
        }
        self.s += self.step;
        if self.s >= 1.0 || self.s > self.overshoot {
            Phase::Completed
        } else {
            Phase::Active
        }
    }

    /// Path parameter clamped into `[0, 1]`.
    #[inline]
    pub fn position(&self) -> f32 {
        clamp01(self.s)
    }
}

/// Back-and-forth sweep over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillation {
    pub period: f32,
    pub phase: f32,
}

impl Oscillation {
    pub fn new(period: f32, phase: f32) -> Self {
        Self { period, phase }
    }

    #[inline]
    pub fn value(&self, t: f32) -> f32 {
        0.5 * (1.0 + (TAU / self.period * t + self.phase).sin())
    }
}

/// Angle of a constant-rate spin: `2pi * t / period + phase`.
#[inline]
pub fn spin_angle(t: f32, period: f32, phase: f32) -> f32 {
    TAU * t / period + phase
}

/// Easing applied to a timed progress before it drives a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionProfile {
    #[default]
    Linear,
    /// `1 - sqrt(1 - u^2)`: slow start, fast finish.
    CircularEaseIn,
    /// Cubic ease-in with a smooth boost around the midpoint.
    CubicBell,
    /// `2^(10(u - 1))`.
    ExpoEaseIn,
}

impl MotionProfile {
    // =========================================================================
    // Curve constants
    // =========================================================================

    const BELL_CENTER: f32 = 0.5;
    const BELL_HALF_WIDTH: f32 = 0.22;
    const BELL_GAIN: f32 = 0.35;

    pub fn apply(self, u: f32) -> f32 {
        let u = clamp01(u);
        match self {
            MotionProfile::Linear => u,
            MotionProfile::CircularEaseIn => 1.0 - (1.0 - u * u).max(0.0).sqrt(),
            MotionProfile::CubicBell => {
                let slow = u * u * u;
                let t = (1.0 - (u - Self::BELL_CENTER).abs() / Self::BELL_HALF_WIDTH).max(0.0);
                let bell = t * t * (3.0 - 2.0 * t);
                clamp01(slow + Self::BELL_GAIN * bell * u)
            }
            MotionProfile::ExpoEaseIn => {
                if u == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (u - 1.0))
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MotionProfile::Linear => "Linear",
            MotionProfile::CircularEaseIn => "Circular Ease-In",
            MotionProfile::CubicBell => "Cubic + Bell",
            MotionProfile::ExpoEaseIn => "Exponential Ease-In",
        }
    }

    pub fn variants() -> &'static [MotionProfile] {
        &[
            MotionProfile::Linear,
            MotionProfile::CircularEaseIn,
            MotionProfile::CubicBell,
            MotionProfile::ExpoEaseIn,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_travel() {
        let t = TimedTravel::new(1000.0, 2000.0);
        assert_eq!(t.progress(500.0), 0.0);
        assert_eq!(t.progress(2000.0), 0.5);
        assert_eq!(t.progress(9000.0), 1.0);
        assert!(t.phase(2999.0).is_alive());
        assert_eq!(t.phase(3000.0), Phase::Expired);
        assert!(t.envelope(1000.0).abs() < 1e-6);
        assert!((t.envelope(2000.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_geometric_step_caps_and_completes() {
        let mut g = GeometricStep::new(0.1, 0.005, 1.05, 0.06);
        let mut frames = 0;
        while g.advance().is_alive() {
            assert!(g.step <= 0.06);
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(g.s >= 1.0);
    }

    #[test]
    fn test_geometric_step_bad_state() {
        let mut g = GeometricStep::new(f32::NAN, 0.01, 1.5, 0.1);
        assert_eq!(g.advance(), Phase::Expired);
        let mut g = GeometricStep::new(0.2, 0.0, 1.5, 0.1);
        assert_eq!(g.advance(), Phase::Expired);
    }

    #[test]
    fn test_oscillation_range() {
        let osc = Oscillation::new(1.2, 0.7);
        for i in 0..100 {
            let u = osc.value(i as f32 * 0.037);
            assert!((0.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn test_profiles_hit_endpoints() {
        for p in MotionProfile::variants() {
            assert!(p.apply(0.0).abs() < 1e-6, "{}", p.name());
            assert!((p.apply(1.0) - 1.0).abs() < 1e-6, "{}", p.name());
            let mut prev = 0.0;
            for i in 0..=50 {
                let s = p.apply(i as f32 / 50.0);
                assert!((0.0..=1.0).contains(&s));
                if *p != MotionProfile::CubicBell {
                    assert!(s >= prev);
                }
                prev = s;
            }
        }
    }
}
