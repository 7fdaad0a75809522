//! A single glyph particle.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::palette::{self, Symbol, PALETTE};

/// Radius range in pixels (`min..max`).
pub const RADIUS_RANGE: std::ops::Range<f32> = 10.0..30.0;
/// Base opacity range.
pub const OPACITY_RANGE: std::ops::Range<f32> = 0.2..1.0;
/// Amplitude of the sinusoidal opacity pulse.
pub const PULSE_AMPLITUDE: f32 = 0.2;

/// One simulated glyph.
///
/// `radius`, `symbol_id` and `opacity_base` are fixed at spawn and only
/// exposed through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees, accumulated without wraparound.
    pub rotation: f32,
    /// Degrees per frame.
    pub rotation_speed: f32,
    /// Radians, accumulated without wraparound. Only `sin(phase)` is used.
    pub phase: f32,
    pub phase_speed: f32,
    radius: f32,
    symbol_id: usize,
    opacity_base: f32,
}

impl Particle {
    /// Spawn a particle uniformly inside `bounds` with randomized attributes.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: Vec2) -> Self {
        Self {
            position: Vec2::new(unit(rng) * bounds.x, unit(rng) * bounds.y),
            velocity: Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)),
            rotation: rng.gen_range(0.0..360.0),
            rotation_speed: rng.gen_range(-2.0..=2.0),
            phase: rng.gen_range(0.0..TAU),
            phase_speed: rng.gen_range(0.01..=0.03),
            radius: rng.gen_range(RADIUS_RANGE),
            symbol_id: rng.gen_range(0..PALETTE.len()),
            opacity_base: rng.gen_range(OPACITY_RANGE),
        }
    }

    /// Build a particle with explicit fixed attributes and zero spin/pulse.
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, symbol_id: usize, opacity_base: f32) -> Self {
        Self {
            position,
            velocity,
            rotation: 0.0,
            rotation_speed: 0.0,
            phase: 0.0,
            phase_speed: 0.0,
            radius,
            symbol_id: symbol_id % PALETTE.len(),
            opacity_base,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn symbol_id(&self) -> usize {
        self.symbol_id
    }

    #[inline]
    pub fn symbol(&self) -> &'static Symbol {
        palette::symbol(self.symbol_id)
    }

    #[inline]
    pub fn opacity_base(&self) -> f32 {
        self.opacity_base
    }

    /// Draw alpha for this frame: base opacity pulsed by `sin(phase)`.
    ///
    /// Not clamped here; the surface clamps into `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        self.opacity_base + self.phase.sin() * PULSE_AMPLITUDE
    }

    /// Advance one frame inside `bounds`.
    ///
    /// `scale` multiplies every per-frame delta; `1.0` is one display frame.
    pub fn update(&mut self, bounds: Vec2, scale: f32) {
        self.position += self.velocity * scale;

        // Mirror bounce on the sampled position, then pull back inside
        if self.position.x < 0.0 || self.position.x > bounds.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > bounds.y {
            self.velocity.y = -self.velocity.y;
        }
        self.position = self.position.clamp(Vec2::ZERO, bounds.max(Vec2::ZERO));

        self.rotation += self.rotation_speed * scale;
        self.phase += self.phase_speed * scale;
    }
}

fn unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}
