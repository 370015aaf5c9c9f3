//! Integration tests for the shared kernels.
//!
//! These exercise the public building blocks the engines are made of, the
//! same way an outside effect author would.

use glam::Vec3;
use ripps::collision::Plane;
use ripps::color::Rgba;
use ripps::composite::OverAccumulator;
use ripps::emitter::{Cadence, Emitter};
use ripps::gradient::ColorLane;
use ripps::math::{alpha_envelope, apply_euler, ease_cos};
use ripps::palette::{NoRepeatBag, NonRepeatingPicker, Palette};
use ripps::pool::{CapPolicy, Pool};
use ripps::spawn::SpawnContext;

fn rainbow() -> Palette {
    Palette::new(vec![
        Rgba::RED,
        Rgba::GREEN,
        Rgba::BLUE,
        Rgba::ORANGE,
        Rgba::rgb(0.5, 0.0, 1.0),
    ])
    .unwrap()
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_rotation_preserves_norm() {
    let mut ctx = SpawnContext::seeded(1);
    for _ in 0..200 {
        let v = Vec3::new(
            ctx.random_range(-50.0, 50.0),
            ctx.random_range(-50.0, 50.0),
            ctx.random_range(-50.0, 50.0),
        );
        let r = apply_euler(v, ctx.random_euler());
        assert!((r.length() - v.length()).abs() < 1e-3 * v.length().max(1.0));
    }
}

#[test]
fn test_plane_band_boundary() {
    let plane = Plane::new(Vec3::ZERO, Vec3::Y);
    assert!(plane.in_band(Vec3::new(3.0, 2.5, -1.0), 2.5));
    assert!(plane.in_band(Vec3::new(0.0, -2.5, 0.0), 2.5));
    assert!(!plane.in_band(Vec3::new(0.0, 2.50001, 0.0), 2.5));
}

// ============================================================================
// Easing
// ============================================================================

#[test]
fn test_envelope_shape() {
    assert!(alpha_envelope(0.0).abs() < 1e-6);
    assert!(alpha_envelope(1.0).abs() < 1e-6);
    assert!((alpha_envelope(0.5) - 1.0).abs() < 1e-6);
}

#[test]
fn test_ease_cos_monotone() {
    assert_eq!(ease_cos(0.0), 0.0);
    assert!((ease_cos(1.0) - 1.0).abs() < 1e-6);
    let mut prev = ease_cos(0.0);
    for i in 1..=1000 {
        let v = ease_cos(i as f32 / 1000.0);
        assert!(v >= prev);
        prev = v;
    }
}

// ============================================================================
// Compositing
// ============================================================================

#[test]
fn test_over_alpha_never_exceeds_one() {
    let mut ctx = SpawnContext::seeded(2);
    let mut acc = OverAccumulator::default();
    for _ in 0..500 {
        acc.add(rainbow().pick(&mut ctx), ctx.random_range(0.0, 1.0));
        assert!(acc.alpha() <= 1.0);
    }
    let c = acc.over(Rgba::BLACK);
    assert!(c.is_finite());
    assert!(c.r <= 1.0 && c.g <= 1.0 && c.b <= 1.0);
}

// ============================================================================
// Palettes
// ============================================================================

#[test]
fn test_no_repeat_bag() {
    let palette = rainbow();
    let mut bag = NoRepeatBag::new(palette.clone());
    let mut ctx = SpawnContext::seeded(3);

    let first: Vec<[i32; 4]> = (0..palette.len()).map(|_| bag.draw(&mut ctx).quantized()).collect();
    for (i, c) in first.iter().enumerate() {
        assert!(!first[..i].contains(c), "repeat before the bag emptied");
    }

    let mut prev = *first.last().unwrap();
    for _ in 0..200 {
        let c = bag.draw(&mut ctx).quantized();
        assert_ne!(c, prev);
        prev = c;
    }
}

#[test]
fn test_picker_never_repeats() {
    let palette = rainbow();
    let mut picker = NonRepeatingPicker::new();
    let mut ctx = SpawnContext::seeded(4);
    let mut prev = picker.pick(&palette, &mut ctx);
    for _ in 0..200 {
        let c = picker.pick(&palette, &mut ctx);
        assert_ne!(c, prev);
        prev = c;
    }
}

#[test]
fn test_empty_palette_rejected() {
    assert!(Palette::new(Vec::new()).is_err());
}

// ============================================================================
// Pools and cadences
// ============================================================================

#[test]
fn test_pool_never_exceeds_cap() {
    for policy in [CapPolicy::RejectNew, CapPolicy::DropNewest, CapPolicy::TrimOldest] {
        let mut pool = Pool::new(7, policy);
        for i in 0..100 {
            pool.push(i);
            assert!(pool.len() <= 7);
            if i % 13 == 0 {
                pool.trim_front_while(|&v| v < i - 3);
            }
        }
    }
}

#[test]
fn test_fixed_cadence_fills_six() {
    let mut ctx = SpawnContext::seeded(5);
    let mut emitter = Emitter::new(Cadence::Fixed { period: 500.0 }, &mut ctx);
    let mut pool: Pool<f32> = Pool::new(10, CapPolicy::RejectNew);
    let ttl = 5000.0;

    let dt = 100.0;
    let mut t = 0.0;
    let mut spawned = 0;
    while t < 3000.0 {
        t += dt;
        pool.trim_front_while(|&born| t - born > ttl);
        for _ in 0..emitter.poll(t, dt, &mut ctx) {
            pool.push(t);
            spawned += 1;
            if spawned == 6 {
                assert_eq!(pool.len(), 6);
            }
        }
    }
    assert_eq!(spawned, 6);
    assert_eq!(pool.len(), 6);
}

// ============================================================================
// Gradient lanes
// ============================================================================

#[test]
fn test_lane_eases_toward_target() {
    let palette = rainbow();
    let mut ctx = SpawnContext::seeded(6);
    let mut lane = ColorLane::new(Rgba::WHITE, 0.0, (14.0, 28.0));

    lane.advance(0.0, &palette, &mut ctx);
    let from = lane.from.unwrap();
    let to = lane.to.unwrap();
    assert!(lane.duration >= 14.0 && lane.duration <= 28.0);

    let mut dist = lane.current.rgb_distance(to);
    let mut t = 0.0;
    while t + 0.5 < lane.duration {
        t += 0.5;
        lane.advance(t, &palette, &mut ctx);
        assert_eq!(lane.from, Some(from));
        let d = lane.current.rgb_distance(to);
        assert!(d <= dist + 1e-5);
        dist = d;
    }
}
