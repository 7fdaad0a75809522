//! The drawing capability set the field renders through.
//!
//! [`Surface`] mirrors a 2D immediate-mode canvas: a global alpha and an
//! affine transform with save/restore, cleared each frame, onto which the
//! field strokes link lines, fills glow gradients, and draws glyph text.
//!
//! Two backends ship with the crate:
//! - [`crate::Canvas`] rasterizes into an RGBA image (used by the window host
//!   and the PNG snapshot).
//! - [`crate::Recorder`] records commands for inspection and tests.

use glam::{Affine2, Vec2};

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Opaque colour from `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Same colour with a different alpha byte.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Components as floats in `[0, 1]`.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Linear interpolation between two colours, `t` in `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Axis-aligned rectangle in the current (transformed) coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Square of half-extent `half` centred on `center`.
    pub fn centered(center: Vec2, half: f32) -> Self {
        Self {
            min: center - Vec2::splat(half),
            size: Vec2::splat(half * 2.0),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.min + self.size;
        p.x >= self.min.x && p.y >= self.min.y && p.x <= max.x && p.y <= max.y
    }
}

/// Radial gradient from `inner` at `center` to `outer` at `radius`.
///
/// Points beyond `radius` take the `outer` colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub inner: Rgba,
    pub outer: Rgba,
}

impl RadialGradient {
    /// Colour at point `p` (same coordinate space as `center`).
    pub fn sample(&self, p: Vec2) -> Rgba {
        if self.radius <= 0.0 {
            return self.outer;
        }
        let t = p.distance(self.center) / self.radius;
        self.inner.lerp(self.outer, t)
    }
}

/// 2D immediate-mode drawing context.
///
/// Alpha set through [`Surface::set_alpha`] multiplies every subsequent draw
/// and is clamped into `[0, 1]`. [`Surface::save`] and [`Surface::restore`]
/// push and pop both alpha and transform.
pub trait Surface {
    /// Current surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Clear every pixel to the surface background.
    fn clear(&mut self);

    fn save(&mut self);

    fn restore(&mut self);

    fn set_alpha(&mut self, alpha: f32);

    fn translate(&mut self, offset: Vec2);

    /// Rotate the current transform by `radians` (clockwise on a y-down surface).
    fn rotate(&mut self, radians: f32);

    fn fill_radial_gradient_rect(&mut self, rect: Rect, gradient: &RadialGradient);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);

    /// Draw `text` centred on `at`, `font_size` pixels tall.
    fn fill_text(&mut self, text: &str, at: Vec2, font_size: f32, color: Rgba);
}

/// Alpha and transform, as pushed by `save`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub alpha: f32,
    pub transform: Affine2,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            transform: Affine2::IDENTITY,
        }
    }
}

/// Save/restore stack shared by the surface backends.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pop the last saved state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        // NaN and infinities are ignored
        if alpha.is_finite() {
            self.current.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.current.transform = self.current.transform * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, radians: f32) {
        self.current.transform = self.current.transform * Affine2::from_angle(radians);
    }

    /// Map a point from the current space to surface pixels.
    pub fn to_surface(&self, p: Vec2) -> Vec2 {
        self.current.transform.transform_point2(p)
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drop all saved states and reset to identity.
    pub fn reset(&mut self) {
        self.current = DrawState::default();
        self.saved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_clamped() {
        let mut stack = StateStack::default();
        stack.set_alpha(1.2);
        assert_eq!(stack.current().alpha, 1.0);
        stack.set_alpha(-0.1);
        assert_eq!(stack.current().alpha, 0.0);
        stack.set_alpha(f32::NAN);
        assert_eq!(stack.current().alpha, 0.0);
    }

    #[test]
    fn test_save_restore_roundtrip() {
        let mut stack = StateStack::default();
        stack.save();
        stack.set_alpha(0.5);
        stack.translate(Vec2::new(10.0, 20.0));
        stack.rotate(std::f32::consts::FRAC_PI_2);

        let p = stack.to_surface(Vec2::new(1.0, 0.0));
        assert!((p - Vec2::new(10.0, 21.0)).length() < 1e-4);

        stack.restore();
        assert_eq!(*stack.current(), DrawState::default());

        // Extra restore is a no-op
        stack.restore();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_gradient_sample_edges() {
        let g = RadialGradient {
            center: Vec2::ZERO,
            radius: 10.0,
            inner: Rgba::from_hex(0x00ffff).with_alpha(0x40),
            outer: Rgba::from_hex(0x00ffff).with_alpha(0),
        };
        assert_eq!(g.sample(Vec2::ZERO).a, 0x40);
        assert_eq!(g.sample(Vec2::new(10.0, 0.0)).a, 0);
        assert_eq!(g.sample(Vec2::new(50.0, 0.0)).a, 0);
    }

    #[test]
    fn test_hex_colour() {
        assert_eq!(Rgba::from_hex(0x6c5ce7), Rgba::rgb(0x6c, 0x5c, 0xe7));
    }
}
