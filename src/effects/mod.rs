//! The effect catalog.
//!
//! Every engine here is a plain struct that implements
//! [`Effect`](crate::effect::Effect) and is built from a serde config. The
//! named catalog variants are presets on those configs; see
//! [`registry`](crate::registry) for the id to preset mapping.
//!
//! | Engine | Paints |
//! |--------|--------|
//! | [`PlaneProbe`] | panels within a slab around a posed plane |
//! | [`SidePlane`] | each side of a moving plane, optionally feathered and rippled |
//! | [`PlaneWipe`] | a plane turning about Z below the dome, ramping panels it crosses |
//! | [`LayeredWaves`] | rippled planes stacked on a persistent framebuffer |
//! | [`OrbitBands`] | oscillating bands on a rotating guide segment |
//! | [`TravelingBands`] | bands crossing a segment over a drifting gradient |
//! | [`MeridianDrops`] | spheres falling crown to bottom along meridians |
//! | [`SeaHorizon`] | a periodic waterline around the equator |
//! | [`SphereProbe`] | a sphere placed on a guide path |
//! | [`Cascade`] | a slab dropping once per loop with an overlay plane |

mod cascade;
mod layered_waves;
mod meridian_drops;
mod orbit_bands;
mod plane_probe;
mod plane_wipe;
mod sea_horizon;
mod side_plane;
mod sphere_probe;
mod traveling_bands;

pub use cascade::{Cascade, CascadeConfig};
pub use layered_waves::{LayeredWaves, LayeredWavesConfig};
pub use meridian_drops::{
    DropColor, DropMotion, DropPaint, DropSize, MeridianDrops, MeridianDropsConfig,
};
pub use orbit_bands::{BandColor, OrbitBands, OrbitBandsConfig, Strobe};
pub use plane_probe::{PlaneProbe, PlaneProbeConfig};
pub use plane_wipe::{PlaneWipe, PlaneWipeConfig};
pub use sea_horizon::{Horizon, SeaHorizon, SeaHorizonConfig, SeaStyle};
pub use side_plane::{Restart, SidePlane, SidePlaneConfig};
pub use sphere_probe::{SphereProbe, SphereProbeConfig};
pub use traveling_bands::{TravelingBands, TravelingBandsConfig};

use glam::Vec3;

use crate::host::{collect_samples, DomeInfo, Host, Sample};

/// Radius assumed by plane and drop effects when the host has none.
pub(crate) const PLANE_FALLBACK_RADIUS: f32 = 250.0;
/// Radius assumed by band effects when the host has none.
pub(crate) const BAND_FALLBACK_RADIUS: f32 = 200.0;

/// Host time in milliseconds, never negative.
#[inline]
pub(crate) fn now_ms(t: f32) -> f32 {
    (t * 1000.0).max(0.0)
}

/// Dome metadata and the panel snapshot an effect works against.
#[derive(Debug, Clone)]
pub(crate) struct Stage {
    pub dome: DomeInfo,
    pub samples: Vec<Sample>,
    fallback_radius: f32,
}

impl Stage {
    pub fn new(fallback_radius: f32) -> Self {
        Self {
            dome: DomeInfo::new(Vec3::ZERO, fallback_radius),
            samples: Vec::new(),
            fallback_radius,
        }
    }

    /// Re-read dome info and positions from `host`.
    pub fn capture(&mut self, host: &dyn Host) {
        self.dome = DomeInfo::resolve(host, self.fallback_radius);
        self.samples = collect_samples(host);
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.dome.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.dome.radius
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared scaffolding for the engine tests.

    use glam::Vec3;

    use crate::effect::Effect;
    use crate::scene::SceneHost;

    pub fn dome() -> SceneHost {
        SceneHost::dome(Vec3::ZERO, 100.0, 8, 16)
    }

    /// Run `frames` updates at `fps` after `init`.
    pub fn run(effect: &mut dyn Effect, host: &mut SceneHost, fps: f32, frames: usize) {
        effect.init(host);
        let dt = 1.0 / fps;
        for i in 1..=frames {
            effect.update(host, i as f32 * dt, dt);
        }
    }
}
