//! Behavioural properties of the particle field over many frames.

use std::collections::BTreeSet;

use glyphfield::prelude::*;
use glyphfield::input::{Input, Stimulus};
use glyphfield::{DrawCommand, LINK_DISTANCE, LINK_MAX_ALPHA, PALETTE};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

fn seeded(count: usize, seed: u64) -> FieldConfig {
    FieldConfig::new().with_particle_count(count).with_seed(seed)
}

fn link_set(field: &mut Field) -> BTreeSet<(usize, usize)> {
    field
        .links()
        .into_iter()
        .map(|l| (l.a.min(l.b), l.a.max(l.b)))
        .collect()
}

#[test]
fn test_positions_stay_in_bounds() {
    let mut field = Field::with_config(640.0, 480.0, seeded(50, 1));
    for frame in 0..600 {
        // Shake things up with the pointer now and then
        if frame % 7 == 0 {
            field.repel(Vec2::new((frame * 13 % 640) as f32, (frame * 29 % 480) as f32));
        }
        field.update();
        for p in field.particles() {
            assert!(p.position.x >= 0.0 && p.position.x <= 640.0);
            assert!(p.position.y >= 0.0 && p.position.y <= 480.0);
        }
    }
}

#[test]
fn test_fixed_attributes_never_change() {
    let mut field = Field::with_config(800.0, 600.0, seeded(50, 2));
    let before: Vec<_> = field
        .particles()
        .iter()
        .map(|p| (p.radius(), p.symbol_id(), p.opacity_base()))
        .collect();

    let mut rec = Recorder::new(800, 600);
    for _ in 0..200 {
        field.repel(Vec2::new(400.0, 300.0));
        field.update();
        field.render(&mut rec);
    }
    field.resize(300.0, 200.0);
    field.update();

    let after: Vec<_> = field
        .particles()
        .iter()
        .map(|p| (p.radius(), p.symbol_id(), p.opacity_base()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(field.len(), 50);
}

#[test]
fn test_spawned_attributes_in_range() {
    let field = Field::with_config(800.0, 600.0, seeded(200, 3));
    for p in field.particles() {
        assert!((10.0..30.0).contains(&p.radius()));
        assert!((0.2..1.0).contains(&p.opacity_base()));
        assert!(p.symbol_id() < PALETTE.len());
        assert!(p.velocity.x.abs() <= 1.0 && p.velocity.y.abs() <= 1.0);
    }
}

#[test]
fn test_edge_bounce() {
    let particle = Particle::new(Vec2::new(799.0, 300.0), Vec2::new(2.0, 0.0), 15.0, 0, 0.5);
    let mut field = Field::from_particles(800.0, 600.0, vec![particle], FieldConfig::new());
    field.update();

    let p = &field.particles()[0];
    assert_eq!(p.velocity.x, -2.0);
    assert_eq!(p.position.x, 800.0);
}

#[test]
fn test_grid_matches_exhaustive() {
    for seed in 0..8 {
        let mut exhaustive = Field::with_config(1024.0, 768.0, seeded(300, seed));
        let mut grid = Field::with_config(
            1024.0,
            768.0,
            seeded(300, seed).with_links(LinkStrategy::Grid),
        );
        for _ in 0..30 {
            exhaustive.update();
            grid.update();
        }
        assert_eq!(link_set(&mut exhaustive), link_set(&mut grid));
    }
}

#[test]
fn test_grid_checks_fewer_pairs() {
    let mut field = Field::with_config(
        2000.0,
        2000.0,
        seeded(1000, 5).with_links(LinkStrategy::Auto { threshold: 100 }),
    );
    let checked = field.for_each_link(|_| {});
    assert!(checked < 1000 * 999 / 2);
}

#[test]
fn test_rendered_links_fade_with_distance() {
    let mut field = Field::with_config(800.0, 600.0, seeded(50, 6));
    let mut rec = Recorder::new(800, 600);
    let stats = field.render(&mut rec);

    assert_eq!(stats.pairs_checked, 1225);
    assert_eq!(stats.links_drawn, rec.lines().count());
    for cmd in rec.lines() {
        if let DrawCommand::Line { from, to, alpha, .. } = cmd {
            let d = from.distance(*to);
            assert!(d < LINK_DISTANCE);
            let expected = (LINK_DISTANCE - d) / LINK_DISTANCE * LINK_MAX_ALPHA;
            assert!((alpha - expected).abs() < 1e-5);
        }
    }
}

#[test]
fn test_canvas_frame_is_drawn() {
    let mut field = Field::with_config(200.0, 200.0, seeded(10, 7));
    let mut canvas = Canvas::new(200, 200);
    field.update();
    let stats = field.render(&mut canvas);

    assert_eq!(stats.particles_drawn, 10);
    assert!(canvas.as_raw().chunks(4).any(|px| px[3] > 0));
}

#[test]
fn test_minimize_and_restore_keeps_field_spread() {
    let mut field = Field::with_config(800.0, 600.0, seeded(50, 9));
    let mut input = Input::new(800, 600);

    for size in [PhysicalSize::new(0, 0), PhysicalSize::new(800, 600)] {
        if let Some(Stimulus::Resized { width, height }) = input.handle_event(&WindowEvent::Resized(size)) {
            field.resize(width as f32, height as f32);
        }
        field.update();
    }

    assert_eq!(field.bounds(), Vec2::new(800.0, 600.0));
    let at_origin = field
        .particles()
        .iter()
        .filter(|p| p.position == Vec2::ZERO)
        .count();
    assert!(at_origin < 50);
    assert!(field.links().len() < 1225);
}
