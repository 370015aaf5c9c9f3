//! The boundary between effects and whatever drives the dome.
//!
//! A host owns panel positions and the committed color of every panel. An
//! effect reads positions once at init, then pushes one batch of color
//! writes per frame through [`Host::set_colors`].
//!
//! # Panel families
//!
//! Panels come in three families (`t`, `d`, `l`). Effects usually treat them
//! as one population through [`IdSets::union`], which removes duplicates while
//! keeping first-seen order.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::color::Rgba;

/// Host-assigned identifier of one addressable panel.
pub type PanelId = u32;

/// Scene metadata: where the dome is and how big it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomeInfo {
    pub center: Vec3,
    pub radius: f32,
}

impl DomeInfo {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Host metadata when it is usable, otherwise `center = 0` and
    /// `radius = fallback_radius`.
    pub fn resolve(host: &dyn Host, fallback_radius: f32) -> Self {
        match host.info() {
            Some(info)
                if info.center.is_finite() && info.radius.is_finite() && info.radius > 0.0 =>
            {
                info
            }
            Some(info) => {
                let center = if info.center.is_finite() { info.center } else { Vec3::ZERO };
                let radius = if info.radius.is_finite() && info.radius > 0.0 {
                    info.radius
                } else {
                    fallback_radius
                };
                warn!(?info, "dome info partially invalid, patching with defaults");
                Self::new(center, radius)
            }
            None => {
                warn!(fallback_radius, "host has no dome info, using defaults");
                Self::new(Vec3::ZERO, fallback_radius)
            }
        }
    }
}

/// Panel ids grouped by family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdSets {
    pub t: Vec<PanelId>,
    pub d: Vec<PanelId>,
    pub l: Vec<PanelId>,
}

impl IdSets {
    /// All ids, de-duplicated, in family order `t`, `d`, `l`.
    pub fn union(&self) -> Vec<PanelId> {
        let mut seen = HashSet::with_capacity(self.len());
        self.t
            .iter()
            .chain(&self.d)
            .chain(&self.l)
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Total ids across families, duplicates included.
    pub fn len(&self) -> usize {
        self.t.len() + self.d.len() + self.l.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One color assignment in an output frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorWrite {
    pub id: PanelId,
    pub color: Rgba,
}

/// Handle for an overlay object created through [`Overlay::add_plane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u32);

/// A flat translucent square drawn in the host's viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlane {
    /// Edge length in world units.
    pub side: f32,
    /// Tint; alpha is the opacity.
    pub color: Rgba,
    pub position: Vec3,
    /// Euler pose in radians.
    pub rotation: Vec3,
    pub visible: bool,
}

/// Optional scene-overlay surface exposed by hosts with a viewport.
pub trait Overlay {
    fn add_plane(&mut self, plane: OverlayPlane) -> OverlayHandle;
    fn update_plane(&mut self, handle: OverlayHandle, position: Vec3, visible: bool);
    fn remove(&mut self, handle: OverlayHandle);
    /// Remove every object this overlay holds.
    fn clear(&mut self);
}

/// Everything an effect may ask of its host.
pub trait Host {
    /// Dome center and radius, when the host knows them.
    fn info(&self) -> Option<DomeInfo>;

    /// Panel ids by family.
    fn ids(&self) -> &IdSets;

    /// World position of a panel. Callers must still check finiteness.
    fn pos_of(&self, id: PanelId) -> Option<Vec3>;

    /// Commit one batch of colors.
    fn set_colors(&mut self, writes: &[ColorWrite]);

    /// Paint every panel the same color.
    fn reset_colors_to(&mut self, color: Rgba);

    /// Last committed color of a panel.
    fn color_of(&self, id: PanelId) -> Option<Rgba>;

    /// Every panel id that currently has a committed color.
    fn painted_ids(&self) -> Vec<PanelId>;

    /// Scene overlay, when the host has a viewport.
    fn overlay(&mut self) -> Option<&mut dyn Overlay> {
        None
    }
}

/// A panel id and its world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub id: PanelId,
    pub position: Vec3,
}

/// Snapshot every panel with a finite position.
pub fn collect_samples(host: &dyn Host) -> Vec<Sample> {
    samples_for(host, &host.ids().union())
}

/// Snapshot the given ids, skipping missing or non-finite positions.
pub fn samples_for(host: &dyn Host, ids: &[PanelId]) -> Vec<Sample> {
    let samples: Vec<Sample> = ids
        .iter()
        .filter_map(|&id| {
            host.pos_of(id)
                .filter(|p| p.is_finite())
                .map(|position| Sample { id, position })
        })
        .collect();
    if samples.len() < ids.len() {
        warn!(
            skipped = ids.len() - samples.len(),
            "panels without a usable position were skipped"
        );
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_dedups_in_order() {
        let ids = IdSets {
            t: vec![3, 1],
            d: vec![1, 7],
            l: vec![3, 9],
        };
        assert_eq!(ids.union(), vec![3, 1, 7, 9]);
        assert_eq!(ids.len(), 6);
    }
}
