//! Benchmarks for the per-frame paint pass.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use ripps::collision::Plane;
use ripps::color::Rgba;
use ripps::composite::{BlendPolicy, Compositor};
use ripps::host::collect_samples;
use ripps::registry;
use ripps::scene::SceneHost;

fn dome() -> SceneHost {
    SceneHost::dome(Vec3::ZERO, 100.0, 24, 48)
}

fn bench_catalog_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_update");

    for id in ["t_wave-9", "t_wave-11", "7-up-2", "raindrops-7", "candyorb-1", "t_wave-2"] {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, id| {
            let mut host = dome();
            let mut effect = registry::create(id, Some(1)).expect("catalog id");
            effect.init(&mut host);
            // Warm the pools up before timing.
            let dt = 1.0 / 60.0;
            let mut t = 0.0;
            for _ in 0..300 {
                t += dt;
                effect.update(&mut host, t, dt);
            }
            b.iter(|| {
                t += dt;
                effect.update(black_box(&mut host), t, dt);
            })
        });
    }

    group.finish();
}

fn bench_accumulate(c: &mut Criterion) {
    let host = dome();
    let samples = collect_samples(&host);
    let planes: Vec<(Plane, Rgba)> = (0..40)
        .map(|i| {
            let a = i as f32 * 0.3;
            let normal = Vec3::new(a.cos(), 0.4, a.sin());
            (Plane::new(Vec3::Y * (i as f32 - 20.0), normal), Rgba::rgb(0.2, 0.6, 0.9))
        })
        .collect();

    c.bench_function("accumulate_40_bands", |b| {
        let mut comp = Compositor::new(BlendPolicy::AccumulateAlpha, samples.len(), Rgba::BLACK);
        b.iter(|| {
            comp.begin_frame();
            for (plane, color) in &planes {
                for (i, s) in samples.iter().enumerate() {
                    if plane.in_band(s.position, 6.0) {
                        comp.paint(i, *color, 0.5);
                    }
                }
            }
            let mut sum = 0.0;
            for i in 0..samples.len() {
                sum += comp.resolve(i, Rgba::BLACK).r;
            }
            black_box(sum)
        })
    });
}

criterion_group!(benches, bench_catalog_update, bench_accumulate);
criterion_main!(benches);
