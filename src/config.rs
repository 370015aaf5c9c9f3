//! Serializable run configuration.
//!
//! A [`RunConfig`] names one engine with its full settings plus an optional
//! seed, and round-trips through JSON. The runner loads one with `--config`
//! and writes one with `--dump-config`.
//!
//! ```json
//! {
//!   "effect": { "kind": "orbit_bands", "band_dm": 2.0, "spawn_every": 0.2 },
//!   "seed": 7
//! }
//! ```
//!
//! Fields left out of an engine's settings take the values of its default
//! preset.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::effect::Effect;
use crate::effects::{
    Cascade, CascadeConfig, LayeredWaves, LayeredWavesConfig, MeridianDrops, MeridianDropsConfig,
    OrbitBands, OrbitBandsConfig, PlaneProbe, PlaneProbeConfig, PlaneWipe, PlaneWipeConfig,
    SeaHorizon, SeaHorizonConfig, SidePlane, SidePlaneConfig, SphereProbe, SphereProbeConfig,
    TravelingBands, TravelingBandsConfig,
};
use crate::error::Result;
use crate::spawn::SpawnContext;

/// Settings for any engine in [`crate::effects`], tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectConfig {
    PlaneProbe(PlaneProbeConfig),
    SidePlane(SidePlaneConfig),
    PlaneWipe(PlaneWipeConfig),
    LayeredWaves(LayeredWavesConfig),
    OrbitBands(OrbitBandsConfig),
    TravelingBands(TravelingBandsConfig),
    MeridianDrops(MeridianDropsConfig),
    SeaHorizon(SeaHorizonConfig),
    SphereProbe(SphereProbeConfig),
    Cascade(CascadeConfig),
}

impl EffectConfig {
    /// Engine name as written in the `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            EffectConfig::PlaneProbe(_) => "plane_probe",
            EffectConfig::SidePlane(_) => "side_plane",
            EffectConfig::PlaneWipe(_) => "plane_wipe",
            EffectConfig::LayeredWaves(_) => "layered_waves",
            EffectConfig::OrbitBands(_) => "orbit_bands",
            EffectConfig::TravelingBands(_) => "traveling_bands",
            EffectConfig::MeridianDrops(_) => "meridian_drops",
            EffectConfig::SeaHorizon(_) => "sea_horizon",
            EffectConfig::SphereProbe(_) => "sphere_probe",
            EffectConfig::Cascade(_) => "cascade",
        }
    }

    /// Display name carried by the settings.
    pub fn name(&self) -> &str {
        match self {
            EffectConfig::PlaneProbe(c) => &c.name,
            EffectConfig::SidePlane(c) => &c.name,
            EffectConfig::PlaneWipe(c) => &c.name,
            EffectConfig::LayeredWaves(c) => &c.name,
            EffectConfig::OrbitBands(c) => &c.name,
            EffectConfig::TravelingBands(c) => &c.name,
            EffectConfig::MeridianDrops(c) => &c.name,
            EffectConfig::SeaHorizon(c) => &c.name,
            EffectConfig::SphereProbe(c) => &c.name,
            EffectConfig::Cascade(c) => &c.name,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            EffectConfig::PlaneProbe(c) => c.validate(),
            EffectConfig::SidePlane(c) => c.validate(),
            EffectConfig::PlaneWipe(c) => c.validate(),
            EffectConfig::LayeredWaves(c) => c.validate(),
            EffectConfig::OrbitBands(c) => c.validate(),
            EffectConfig::TravelingBands(c) => c.validate(),
            EffectConfig::MeridianDrops(c) => c.validate(),
            EffectConfig::SeaHorizon(c) => c.validate(),
            EffectConfig::SphereProbe(c) => c.validate(),
            EffectConfig::Cascade(c) => c.validate(),
        }
    }

    /// Validate and construct the engine. Engines without randomness ignore
    /// `ctx`.
    pub fn build(self, ctx: SpawnContext) -> Result<Box<dyn Effect>> {
        self.validate()?;
        debug!(kind = self.kind(), name = self.name(), "building effect");
        let effect: Box<dyn Effect> = match self {
            EffectConfig::PlaneProbe(c) => Box::new(PlaneProbe::new(c)),
            EffectConfig::SidePlane(c) => Box::new(SidePlane::new(c)),
            EffectConfig::PlaneWipe(c) => Box::new(PlaneWipe::new(c)),
            EffectConfig::LayeredWaves(c) => Box::new(LayeredWaves::new(c, ctx)),
            EffectConfig::OrbitBands(c) => Box::new(OrbitBands::new(c, ctx)),
            EffectConfig::TravelingBands(c) => Box::new(TravelingBands::new(c, ctx)),
            EffectConfig::MeridianDrops(c) => Box::new(MeridianDrops::new(c, ctx)),
            EffectConfig::SeaHorizon(c) => Box::new(SeaHorizon::new(c)),
            EffectConfig::SphereProbe(c) => Box::new(SphereProbe::new(c)),
            EffectConfig::Cascade(c) => Box::new(Cascade::new(c)),
        };
        Ok(effect)
    }
}

/// One effect and the seed to run it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub effect: EffectConfig,
    /// `None` seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn new(effect: EffectConfig) -> Self {
        Self { effect, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.effect.validate()
    }

    pub fn spawn_context(&self) -> SpawnContext {
        match self.seed {
            Some(seed) => SpawnContext::seeded(seed),
            None => SpawnContext::from_clock(),
        }
    }

    pub fn build(self) -> Result<Box<dyn Effect>> {
        let ctx = self.spawn_context();
        self.effect.build(ctx)
    }
}
