//! In-memory [`Host`] used by the runner, the tests and the benchmarks.
//!
//! [`SceneHost::dome`] lays panels out on latitude rings of a sphere so that
//! crown-to-bottom effects see a realistic spread of heights and azimuths.

use glam::Vec3;
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use tracing::debug;

use crate::color::Rgba;
use crate::host::{
    ColorWrite, DomeInfo, Host, IdSets, Overlay, OverlayHandle, OverlayPlane, PanelId,
};

/// Panel family, matching the three id lists a host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    T,
    D,
    L,
}

/// Overlay that records planes instead of drawing them.
#[derive(Debug, Default)]
pub struct SceneOverlay {
    planes: HashMap<OverlayHandle, OverlayPlane>,
    next: u32,
}

impl SceneOverlay {
    pub fn plane(&self, handle: OverlayHandle) -> Option<&OverlayPlane> {
        self.planes.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

impl Overlay for SceneOverlay {
    fn add_plane(&mut self, plane: OverlayPlane) -> OverlayHandle {
        let handle = OverlayHandle(self.next);
        self.next += 1;
        self.planes.insert(handle, plane);
        handle
    }

    fn update_plane(&mut self, handle: OverlayHandle, position: Vec3, visible: bool) {
        if let Some(p) = self.planes.get_mut(&handle) {
            p.position = position;
            p.visible = visible;
        }
    }

    fn remove(&mut self, handle: OverlayHandle) {
        self.planes.remove(&handle);
    }

    fn clear(&mut self) {
        self.planes.clear();
    }
}

/// Panels, positions and committed colors held in memory.
#[derive(Debug, Default)]
pub struct SceneHost {
    info: Option<DomeInfo>,
    ids: IdSets,
    positions: HashMap<PanelId, Vec3>,
    colors: HashMap<PanelId, Rgba>,
    overlay: Option<SceneOverlay>,
    frames_committed: u64,
    writes_total: u64,
    last_batch: usize,
}

impl SceneHost {
    /// Empty scene. `info` is what [`Host::info`] will report.
    pub fn new(info: Option<DomeInfo>) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    /// Sphere of panels: one at each pole plus `rings` latitude rings of
    /// `segments` panels. Families rotate `T`, `D`, `L` by ring.
    pub fn dome(center: Vec3, radius: f32, rings: u32, segments: u32) -> Self {
        let mut scene = Self::new(Some(DomeInfo::new(center, radius)));
        let mut id: PanelId = 0;

        scene.add_panel(Family::T, id, center + Vec3::Y * radius);
        id += 1;

        for ring in 0..rings {
            let polar = PI * (ring + 1) as f32 / (rings + 1) as f32;
            let y = polar.cos() * radius;
            let r = polar.sin() * radius;
            let family = match ring % 3 {
                0 => Family::T,
                1 => Family::D,
                _ => Family::L,
            };
            // Stagger alternate rings by half a segment.
            let offset = if ring % 2 == 0 { 0.0 } else { 0.5 };
            for seg in 0..segments {
                let az = TAU * (seg as f32 + offset) / segments as f32;
                let p = center + Vec3::new(r * az.sin(), y, r * az.cos());
                scene.add_panel(family, id, p);
                id += 1;
            }
        }

        scene.add_panel(Family::L, id, center - Vec3::Y * radius);
        debug!(panels = id + 1, radius, "built dome scene");
        scene
    }

    /// Enable the recording overlay.
    pub fn with_overlay(mut self) -> Self {
        self.overlay = Some(SceneOverlay::default());
        self
    }

    /// Replace the reported dome info.
    pub fn set_info(&mut self, info: Option<DomeInfo>) {
        self.info = info;
    }

    pub fn add_panel(&mut self, family: Family, id: PanelId, position: Vec3) {
        match family {
            Family::T => self.ids.t.push(id),
            Family::D => self.ids.d.push(id),
            Family::L => self.ids.l.push(id),
        }
        self.positions.insert(id, position);
    }

    /// Move (or invalidate) a panel.
    pub fn set_position(&mut self, id: PanelId, position: Vec3) {
        self.positions.insert(id, position);
    }

    pub fn panel_count(&self) -> usize {
        self.positions.len()
    }

    pub fn recorded_overlay(&self) -> Option<&SceneOverlay> {
        self.overlay.as_ref()
    }

    /// Number of non-empty batches committed.
    pub fn frames_committed(&self) -> u64 {
        self.frames_committed
    }

    pub fn writes_total(&self) -> u64 {
        self.writes_total
    }

    /// Size of the most recent batch.
    pub fn last_batch(&self) -> usize {
        self.last_batch
    }

    /// Committed color or black when the panel was never painted.
    pub fn color_or_black(&self, id: PanelId) -> Rgba {
        self.colors.get(&id).copied().unwrap_or(Rgba::BLACK)
    }
}

impl Host for SceneHost {
    fn info(&self) -> Option<DomeInfo> {
        self.info
    }

    fn ids(&self) -> &IdSets {
        &self.ids
    }

    fn pos_of(&self, id: PanelId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    fn set_colors(&mut self, writes: &[ColorWrite]) {
        for w in writes {
            self.colors.insert(w.id, w.color);
        }
        self.last_batch = writes.len();
        self.writes_total += writes.len() as u64;
        if !writes.is_empty() {
            self.frames_committed += 1;
        }
    }

    fn reset_colors_to(&mut self, color: Rgba) {
        for id in self.ids.union() {
            self.colors.insert(id, color);
        }
    }

    fn color_of(&self, id: PanelId) -> Option<Rgba> {
        self.colors.get(&id).copied()
    }

    fn painted_ids(&self) -> Vec<PanelId> {
        let mut ids: Vec<PanelId> = self.colors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn overlay(&mut self) -> Option<&mut dyn Overlay> {
        self.overlay.as_mut().map(|o| o as &mut dyn Overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::collect_samples;

    #[test]
    fn test_dome_layout() {
        let scene = SceneHost::dome(Vec3::new(0.0, 10.0, 0.0), 100.0, 6, 12);
        assert_eq!(scene.panel_count(), 2 + 6 * 12);
        for s in collect_samples(&scene) {
            let d = (s.position - Vec3::new(0.0, 10.0, 0.0)).length();
            assert!((d - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_reset_and_painted_ids() {
        let mut scene = SceneHost::dome(Vec3::ZERO, 50.0, 2, 4);
        assert!(scene.painted_ids().is_empty());
        scene.reset_colors_to(Rgba::WHITE);
        assert_eq!(scene.painted_ids().len(), scene.panel_count());
        scene.set_colors(&[ColorWrite { id: 0, color: Rgba::RED }]);
        assert_eq!(scene.color_of(0), Some(Rgba::RED));
        assert_eq!(scene.frames_committed(), 1);
    }

    #[test]
    fn test_non_finite_positions_skipped() {
        let mut scene = SceneHost::dome(Vec3::ZERO, 50.0, 2, 4);
        scene.set_position(3, Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(collect_samples(&scene).len(), scene.panel_count() - 1);
    }

    #[test]
    fn test_overlay_records_planes() {
        let mut scene = SceneHost::dome(Vec3::ZERO, 50.0, 2, 4).with_overlay();
        let overlay = scene.overlay().unwrap();
        let h = overlay.add_plane(OverlayPlane {
            side: 10.0,
            color: Rgba::BLUE.with_alpha(0.15),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            visible: true,
        });
        overlay.update_plane(h, Vec3::Y, false);
        let rec = scene.recorded_overlay().unwrap();
        assert_eq!(rec.plane(h).unwrap().position, Vec3::Y);
        assert!(!rec.plane(h).unwrap().visible);
    }
}
