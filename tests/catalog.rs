//! Integration tests that run every catalog entry on an in-memory dome.

use glam::Vec3;
use ripps::host::collect_samples;
use ripps::prelude::*;

fn run_for(id: &str, host: &mut SceneHost, seconds: f32) -> Box<dyn Effect> {
    let mut effect = registry::create(id, Some(42)).unwrap();
    let fps = effect.meta().fps as f32;
    let mut clock = Clock::fixed(fps);
    effect.init(host);
    for _ in 0..(seconds * fps) as usize {
        let (t, dt) = clock.tick();
        effect.update(host, t, dt);
    }
    effect
}

fn assert_colors_valid(host: &SceneHost, id: &str) {
    for s in collect_samples(host) {
        if let Some(c) = host.color_of(s.id) {
            assert!(c.is_finite(), "{id}: non-finite color on panel {}", s.id);
            for ch in c.to_array() {
                assert!((0.0..=1.0).contains(&ch), "{id}: channel {ch} out of range");
            }
        }
    }
}

#[test]
fn test_every_entry_runs() {
    for entry in registry::CATALOG {
        let mut host = SceneHost::dome(Vec3::new(0.0, 20.0, 0.0), 120.0, 10, 20).with_overlay();
        let mut effect = run_for(entry.id, &mut host, 3.0);
        assert!(!host.painted_ids().is_empty(), "{} painted nothing", entry.id);
        assert_colors_valid(&host, entry.id);
        effect.dispose(&mut host);
        assert!(host.recorded_overlay().unwrap().is_empty(), "{} left overlay objects", entry.id);
    }
}

#[test]
fn test_entries_survive_missing_info() {
    for entry in registry::CATALOG {
        let mut host = SceneHost::dome(Vec3::ZERO, 150.0, 6, 12);
        host.set_info(None);
        run_for(entry.id, &mut host, 1.0);
        assert_colors_valid(&host, entry.id);
    }
}

#[test]
fn test_seeded_runs_repeat() {
    for id in ["7-up-2", "raindrops-7", "candyorb-1", "t_wave-11"] {
        let mut a = SceneHost::dome(Vec3::ZERO, 100.0, 8, 16);
        let mut b = SceneHost::dome(Vec3::ZERO, 100.0, 8, 16);
        run_for(id, &mut a, 2.0);
        run_for(id, &mut b, 2.0);
        for s in collect_samples(&a) {
            assert_eq!(a.color_of(s.id), b.color_of(s.id), "{id} diverged on panel {}", s.id);
        }
    }
}

#[test]
fn test_run_config_from_json() {
    let json = r#"{
        "effect": { "kind": "orbit_bands", "max_live": 3, "spawn_every": 0.1 },
        "seed": 9
    }"#;
    let run = RunConfig::from_json(json).unwrap();
    let mut effect = run.build().unwrap();
    let mut host = SceneHost::dome(Vec3::ZERO, 100.0, 8, 16);
    effect.init(&mut host);
    let mut clock = Clock::fixed(60.0);
    for _ in 0..120 {
        let (t, dt) = clock.tick();
        effect.update(&mut host, t, dt);
    }
    assert_eq!(host.last_batch(), host.panel_count());
}
