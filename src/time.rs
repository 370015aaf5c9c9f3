//! Frame clock that feeds `t` and `dt` to effects.
//!
//! Effects never read the wall clock themselves. A driver owns a [`Clock`]
//! and passes its values to [`Effect::update`](crate::effect::Effect::update).
//!
//! # Example
//!
//! ```ignore
//! use ripps::time::Clock;
//!
//! let mut clock = Clock::fixed(30.0);
//! for _ in 0..300 {
//!     let (t, dt) = clock.tick();
//!     effect.update(&mut host, t, dt);
//! }
//! ```

use std::time::Instant;

/// Time tracking for a run of frames.
///
/// In fixed mode every tick advances by `1 / fps` regardless of how long the
/// frame took, which makes runs reproducible. In wall mode the delta is the
/// real time since the previous tick.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Fixed step in seconds, `None` for wall time.
    fixed_delta: Option<f32>,
    last_tick: Instant,
    elapsed_secs: f32,
    frame_count: u64,
    /// Multiplier on every delta (1.0 = normal speed).
    time_scale: f32,
}

impl Clock {
    /// Deterministic clock stepping `1 / fps` seconds per tick.
    ///
    /// A non-positive or non-finite `fps` falls back to 60.
    pub fn fixed(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self::with_delta(Some(1.0 / fps))
    }

    /// Clock driven by real elapsed time.
    pub fn wall() -> Self {
        Self::with_delta(None)
    }

    fn with_delta(fixed_delta: Option<f32>) -> Self {
        Self {
            fixed_delta,
            last_tick: Instant::now(),
            elapsed_secs: 0.0,
            frame_count: 0,
            time_scale: 1.0,
        }
    }

    /// Advance one frame. Returns `(elapsed, delta)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        let delta = self.fixed_delta.unwrap_or(raw) * self.time_scale;
        self.elapsed_secs += delta;
        self.frame_count += 1;
        (self.elapsed_secs, delta)
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Negative and non-finite scales clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Ticks a fixed clock needs to cover `seconds` of scaled time. A wall
    /// clock or a stopped clock never gets there and reports 0.
    pub fn frames_for(&self, seconds: f32) -> u64 {
        match self.fixed_delta {
            Some(dt) if seconds > 0.0 && self.time_scale > 0.0 => {
                (seconds / (dt * self.time_scale)).ceil() as u64
            }
            _ => 0,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::fixed(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = Clock::fixed(30.0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_fixed_tick() {
        let mut clock = Clock::fixed(60.0);
        let (t, dt) = clock.tick();
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(t, dt);
        for _ in 0..59 {
            clock.tick();
        }
        assert!((clock.elapsed() - 1.0).abs() < 1e-4);
        assert_eq!(clock.frame(), 60);
    }

    #[test]
    fn test_bad_fps_falls_back() {
        let mut clock = Clock::fixed(f32::NAN);
        assert!((clock.tick().1 - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_wall_tick_follows_real_time() {
        let mut clock = Clock::wall();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let (t, dt) = clock.tick();
        assert!(dt >= 0.015);
        assert_eq!(t, dt);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_time_scale() {
        let mut clock = Clock::fixed(10.0);
        clock.set_time_scale(2.0);
        assert!((clock.tick().1 - 0.2).abs() < 1e-6);
        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
        assert_eq!(clock.tick().1, 0.0);
        clock.set_time_scale(f32::INFINITY);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn test_frames_for() {
        let mut clock = Clock::fixed(30.0);
        assert_eq!(clock.frames_for(10.0), 300);
        clock.set_time_scale(2.0);
        assert_eq!(clock.frames_for(10.0), 150);
        clock.set_time_scale(0.0);
        assert_eq!(clock.frames_for(10.0), 0);
        assert_eq!(Clock::wall().frames_for(10.0), 0);
    }
}
