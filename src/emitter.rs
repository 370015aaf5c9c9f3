//! Spawn cadences.
//!
//! An [`Emitter`] turns elapsed time into a number of spawns for the current
//! frame. It does not know what it spawns; the owning effect pushes entities
//! into its [`Pool`](crate::pool::Pool) once per fire.
//!
//! # Cadence Types
//!
//! | Type | Rule | Fires per frame |
//! |------|------|-----------------|
//! | [`Cadence::Fixed`] | accumulate `dt`, fire every `period` | any number |
//! | [`Cadence::Jittered`] | accumulate `dt`, next delay drawn from `[min, max)` | any number |
//! | [`Cadence::Scheduled`] | `t - last >= every - 1e-6` | at most one |
//! | [`Cadence::Once`] | fires on the first poll only | at most one |
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = Emitter::new(Cadence::Fixed { period: 0.5 }, &mut ctx);
//! for _ in 0..emitter.poll(t, dt, &mut ctx) {
//!     drops.push(Drop::new(t));
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::spawn::SpawnContext;

/// When new entities appear.
///
/// Times are in the same unit as the `t`/`dt` passed to [`Emitter::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cadence {
    /// Regular interval driven by an accumulator.
    ///
    /// A long frame fires several times so the long-run rate stays exact.
    Fixed {
        /// Time between spawns.
        period: f32,
    },

    /// Accumulator with a fresh random delay after every fire.
    Jittered {
        min: f32,
        max: f32,
    },

    /// Clock comparison against the last fire time.
    ///
    /// Never fires twice in one frame; a slow host simply spawns less.
    Scheduled {
        every: f32,
    },

    /// A single spawn on the first poll.
    Once,
}

impl Cadence {
    /// Average time between spawns, `None` for [`Cadence::Once`].
    pub fn mean_interval(&self) -> Option<f32> {
        match *self {
            Cadence::Fixed { period } => Some(period),
            Cadence::Jittered { min, max } => Some(0.5 * (min + max)),
            Cadence::Scheduled { every } => Some(every),
            Cadence::Once => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cadence::Fixed { .. } => "Fixed",
            Cadence::Jittered { .. } => "Jittered",
            Cadence::Scheduled { .. } => "Scheduled",
            Cadence::Once => "Once",
        }
    }
}

/// Runtime state of a [`Cadence`].
#[derive(Debug, Clone)]
pub struct Emitter {
    cadence: Cadence,
    acc: f32,
    next_delay: f32,
    last_fire: Option<f32>,
    fired_once: bool,
}

impl Emitter {
    /// A jittered emitter draws its first delay here.
    pub fn new(cadence: Cadence, ctx: &mut SpawnContext) -> Self {
        let next_delay = match cadence {
            Cadence::Fixed { period } => period,
            Cadence::Jittered { min, max } => ctx.random_range(min, max),
            Cadence::Scheduled { every } => every,
            Cadence::Once => 0.0,
        };
        Self {
            cadence,
            acc: 0.0,
            next_delay,
            last_fire: None,
            fired_once: false,
        }
    }

    #[inline]
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Mark a fire at `t` without going through [`Emitter::poll`], so a
    /// scheduled cadence measures its next interval from there.
    pub fn mark_fired(&mut self, t: f32) {
        self.last_fire = Some(t);
        self.fired_once = true;
    }

    /// How many spawns are due this frame.
    ///
    /// Negative `dt` counts as zero. A non-positive delay never fires, which
    /// keeps a bad config from spinning forever.
    pub fn poll(&mut self, t: f32, dt: f32, ctx: &mut SpawnContext) -> u32 {
        match self.cadence {
            Cadence::Fixed { period } => {
                if period <= 0.0 {
                    return 0;
                }
                self.acc += dt.max(0.0);
                let mut n = 0;
                while self.acc >= period {
                    self.acc -= period;
                    n += 1;
                }
                n
            }
            Cadence::Jittered { min, max } => {
                self.acc += dt.max(0.0);
                let mut n = 0;
                while self.next_delay > 0.0 && self.acc >= self.next_delay {
                    self.acc -= self.next_delay;
                    self.next_delay = ctx.random_range(min, max);
                    n += 1;
                }
                n
            }
            Cadence::Scheduled { every } => {
                let due = match self.last_fire {
                    None => true,
                    Some(last) => t - last >= every - 1e-6,
                };
                if due {
                    self.last_fire = Some(t);
                    1
                } else {
                    0
                }
            }
            Cadence::Once => {
                if self.fired_once {
                    0
                } else {
                    self.fired_once = true;
                    1
                }
            }
        }
    }

    /// Drop accumulated time and redraw the next delay.
    pub fn reset(&mut self, ctx: &mut SpawnContext) {
        *self = Self::new(self.cadence, ctx);
    }
}
