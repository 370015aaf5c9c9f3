//! # ripps - procedural color effects for dome panels
//!
//! Each effect ("ripp") colors a set of addressable panels arranged roughly
//! on a dome. It is handed a [`Host`] that knows where every panel sits and
//! accepts color writes, and it paints frame by frame from a handful of
//! geometric primitives: moving planes, oscillating bands, spawned waves and
//! spherical volumes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ripps::prelude::*;
//!
//! fn main() -> ripps::Result<()> {
//!     let mut host = SceneHost::dome(Vec3::ZERO, 100.0, 12, 24);
//!     let mut effect = registry::create("candyorb-1", Some(7))?;
//!     let mut clock = Clock::fixed(effect.meta().fps as f32);
//!
//!     effect.init(&mut host);
//!     for _ in 0..600 {
//!         let (t, dt) = clock.tick();
//!         effect.update(&mut host, t, dt);
//!     }
//!     effect.dispose(&mut host);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Hosts
//!
//! [`Host`] is the boundary to whatever drives the panels: dome metadata,
//! panel ids by family, positions, color writes and an optional overlay for
//! translucent helper planes. [`SceneHost`] is an in-memory implementation
//! used by the tests, the benchmarks and the runner.
//!
//! ### Effects
//!
//! [`Effect`] has three calls: `init` once, `update` every frame, and
//! `dispose` at the end. Every engine in [`effects`] is a plain struct built
//! from a serde config with named presets, so a catalog variant is only
//! timing, palette and policy.
//!
//! ### Blending
//!
//! | [`BlendPolicy`] | Meaning |
//! |-----------------|---------|
//! | `Override` | the newest contribution wins |
//! | `AccumulateAlpha` | Porter-Duff "over" onto a base color |
//! | `PersistentBase` | the frame starts from the previous committed colors |
//!
//! ## Feature Overview
//!
//! | Area | Modules |
//! |------|---------|
//! | Geometry | [`math`], [`collision`], [`dome`], [`motion`] |
//! | Color | [`color`], [`palette`], [`gradient`], [`composite`] |
//! | Entities | [`pool`], [`lifecycle`], [`emitter`], [`spawn`] |
//! | Running | [`effect`], [`effects`], [`registry`], [`config`], [`time`] |

pub mod collision;
pub mod color;
pub mod composite;
pub mod config;
pub mod dome;
pub mod effect;
pub mod effects;
pub mod emitter;
pub mod error;
pub mod gradient;
pub mod host;
pub mod lifecycle;
pub mod math;
pub mod motion;
pub mod palette;
pub mod pool;
pub mod registry;
pub mod scene;
pub mod spawn;
pub mod time;

pub use color::Rgba;
pub use composite::BlendPolicy;
pub use config::{EffectConfig, RunConfig};
pub use effect::{Effect, EffectMeta};
pub use error::{Result, RippError};
pub use glam::Vec3;
pub use host::{DomeInfo, Host, PanelId};
pub use palette::Palette;
pub use scene::SceneHost;
pub use spawn::SpawnContext;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use ripps::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::composite::BlendPolicy;
    pub use crate::config::{EffectConfig, RunConfig};
    pub use crate::effect::{Effect, EffectMeta};
    pub use crate::effects::*;
    pub use crate::host::{DomeInfo, Host, Overlay, PanelId};
    pub use crate::palette::{Palette, Swatch};
    pub use crate::registry;
    pub use crate::scene::SceneHost;
    pub use crate::spawn::SpawnContext;
    pub use crate::time::Clock;
    pub use crate::Vec3;
}
