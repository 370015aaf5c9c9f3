//! The contract every ripp implements.
//!
//! A host calls [`Effect::init`] once, then [`Effect::update`] once per frame
//! with the elapsed time `t` and the frame delta `dt` (both seconds). All
//! state lives in the effect value itself, so two instances of the same
//! effect never interfere.
//!
//! # Lifecycle
//!
//! | Call | Typical work |
//! |------|--------------|
//! | `init` | resolve dome info, snapshot samples, seed entities, paint the baseline |
//! | `update` | spawn, advance, cull, paint one frame, commit it once |
//! | `dispose` | release overlay objects |

use serde::{Deserialize, Serialize};

use crate::composite::BlendPolicy;
use crate::host::Host;

/// Static description of an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectMeta {
    /// Display name.
    pub name: String,
    /// Preferred frame rate.
    pub fps: u32,
    /// Suggested run length in seconds.
    pub duration: f32,
    /// How overlapping contributions combine.
    pub blend: BlendPolicy,
}

impl EffectMeta {
    pub fn new(name: impl Into<String>, fps: u32, duration: f32, blend: BlendPolicy) -> Self {
        Self {
            name: name.into(),
            fps,
            duration,
            blend,
        }
    }
}

/// A procedural color effect driven frame by frame.
///
/// `update` never fails: degraded host data is logged and skipped.
pub trait Effect: Send {
    fn meta(&self) -> EffectMeta;

    /// Prepare state against `host` and paint the starting colors.
    fn init(&mut self, host: &mut dyn Host);

    /// Advance to time `t` and commit at most one batch of writes.
    fn update(&mut self, host: &mut dyn Host, t: f32, dt: f32);

    /// Release anything the effect created on the host.
    fn dispose(&mut self, _host: &mut dyn Host) {}
}

impl std::fmt::Debug for dyn Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect").field("meta", &self.meta()).finish()
    }
}
