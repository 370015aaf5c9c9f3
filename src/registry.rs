//! The named effect catalog.
//!
//! Every entry maps a stable id to an engine preset. Enabled entries come
//! first, in menu order; the rest are kept for direct use by id.
//!
//! ```ignore
//! use ripps::registry;
//!
//! for entry in registry::enabled() {
//!     println!("{} ({})", entry.id, entry.name);
//! }
//! let mut effect = registry::create("candyorb-1", Some(7))?;
//! ```

use tracing::debug;

use crate::config::{EffectConfig, RunConfig};
use crate::effect::Effect;
use crate::effects::{
    CascadeConfig, LayeredWavesConfig, MeridianDropsConfig, OrbitBandsConfig, PlaneProbeConfig,
    PlaneWipeConfig, SeaHorizonConfig, SidePlaneConfig, SphereProbeConfig, TravelingBandsConfig,
};
use crate::error::{Result, RippError};

/// One catalog variant.
pub struct CatalogEntry {
    pub id: &'static str,
    /// Menu label.
    pub name: &'static str,
    /// Listed in the menu.
    pub enabled: bool,
    pub config: fn() -> EffectConfig,
}

impl CatalogEntry {
    /// Engine kind of this entry's settings.
    pub fn kind(&self) -> &'static str {
        (self.config)().kind()
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .finish()
    }
}

pub static CATALOG: &[CatalogEntry] = &[
    // ========== Menu ==========
    CatalogEntry {
        id: "t_wave-2",
        name: "t_wave-2",
        enabled: true,
        config: || EffectConfig::SeaHorizon(SeaHorizonConfig::black_and_white()),
    },
    CatalogEntry {
        id: "t_wave-9",
        name: "t_wave-7",
        enabled: true,
        config: || EffectConfig::SidePlane(SidePlaneConfig::wave_9()),
    },
    CatalogEntry {
        id: "t_wave-8",
        name: "t_wave-8",
        enabled: true,
        config: || EffectConfig::SidePlane(SidePlaneConfig::wave_8()),
    },
    CatalogEntry {
        id: "7-up-2",
        name: "7-Up",
        enabled: true,
        config: || EffectConfig::TravelingBands(TravelingBandsConfig::seven_up()),
    },
    CatalogEntry {
        id: "raindrops-7",
        name: "vapor-paint",
        enabled: true,
        config: || EffectConfig::MeridianDrops(MeridianDropsConfig::vapor_paint()),
    },
    CatalogEntry {
        id: "raindrops-4",
        name: "lava-matrix",
        enabled: true,
        config: || EffectConfig::MeridianDrops(MeridianDropsConfig::lava_tracers()),
    },
    CatalogEntry {
        id: "candyorb-1",
        name: "SMPTE-10hz-dreamMachine",
        enabled: true,
        config: || EffectConfig::OrbitBands(OrbitBandsConfig::candyorb()),
    },
    // ========== Shelved ==========
    CatalogEntry {
        id: "sea-horizon-gradient",
        name: "sea-horizon-gradient (10s loop)",
        enabled: false,
        config: || EffectConfig::SeaHorizon(SeaHorizonConfig::skybox()),
    },
    CatalogEntry {
        id: "t_plane-base",
        name: "t_plane-base",
        enabled: false,
        config: || EffectConfig::PlaneProbe(PlaneProbeConfig::plane_base()),
    },
    CatalogEntry {
        id: "t_wave-5",
        name: "t_wave-5",
        enabled: false,
        config: || EffectConfig::PlaneProbe(PlaneProbeConfig::wave_5()),
    },
    CatalogEntry {
        id: "t_wave-6",
        name: "t_wave-6",
        enabled: false,
        config: || EffectConfig::PlaneProbe(PlaneProbeConfig::wave_6()),
    },
    CatalogEntry {
        id: "t_wave-7",
        name: "t_wave-7",
        enabled: false,
        config: || EffectConfig::SidePlane(SidePlaneConfig::wave_7()),
    },
    CatalogEntry {
        id: "t_wave-11",
        name: "t_wave-11",
        enabled: false,
        config: || EffectConfig::LayeredWaves(LayeredWavesConfig::wave_11()),
    },
    CatalogEntry {
        id: "t_page-turn",
        name: "t_page-turn",
        enabled: false,
        config: || EffectConfig::PlaneWipe(PlaneWipeConfig::page_turn()),
    },
    CatalogEntry {
        id: "jawbreaker-1",
        name: "jawbreaker-1",
        enabled: false,
        config: || EffectConfig::OrbitBands(OrbitBandsConfig::jawbreaker()),
    },
    CatalogEntry {
        id: "7-up-3",
        name: "7-Up-3",
        enabled: false,
        config: || EffectConfig::TravelingBands(TravelingBandsConfig::seven_up_lime()),
    },
    CatalogEntry {
        id: "temari-1",
        name: "temari-1",
        enabled: false,
        config: || EffectConfig::TravelingBands(TravelingBandsConfig::temari()),
    },
    CatalogEntry {
        id: "raindrops-1",
        name: "raindrops-1",
        enabled: false,
        config: || EffectConfig::MeridianDrops(MeridianDropsConfig::orange_rain()),
    },
    CatalogEntry {
        id: "raindrops-3",
        name: "raindrops-3",
        enabled: false,
        config: || EffectConfig::MeridianDrops(MeridianDropsConfig::ink_rain()),
    },
    CatalogEntry {
        id: "raindrops-5",
        name: "raindrops-5",
        enabled: false,
        config: || EffectConfig::MeridianDrops(MeridianDropsConfig::orange_emitter()),
    },
    CatalogEntry {
        id: "raindrops-6",
        name: "8bit volcano",
        enabled: false,
        config: || EffectConfig::MeridianDrops(MeridianDropsConfig::volcano()),
    },
    CatalogEntry {
        id: "collision-test",
        name: "collision-test",
        enabled: false,
        config: || EffectConfig::SphereProbe(SphereProbeConfig::collision_test()),
    },
    CatalogEntry {
        id: "cascade-1",
        name: "cascade-1",
        enabled: false,
        config: || EffectConfig::Cascade(CascadeConfig::cascade()),
    },
];

/// Catalog entry for `id`.
pub fn find(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Preset settings for `id`.
pub fn config_for(id: &str) -> Result<EffectConfig> {
    find(id)
        .map(|e| (e.config)())
        .ok_or_else(|| RippError::UnknownEffect(id.to_string()))
}

/// Build the effect registered under `id`. `None` seeds from the clock.
pub fn create(id: &str, seed: Option<u64>) -> Result<Box<dyn Effect>> {
    let mut run = RunConfig::new(config_for(id)?);
    run.seed = seed;
    debug!(id, ?seed, "creating catalog effect");
    run.build()
}

/// Menu entries, in menu order.
pub fn enabled() -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(|e| e.enabled)
}
