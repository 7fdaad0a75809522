//! Software raster backend for [`Surface`].
//!
//! Draws into an `image::RgbaImage` with straight-alpha source-over
//! blending. Fills are sampled per pixel through the inverse of the current
//! transform, so rotated gradients and glyphs need no special casing.

use std::path::Path;

use glam::{Affine2, Vec2};
use image::{Rgba as Pixel, RgbaImage};

use crate::error::ExportError;
use crate::font;
use crate::surface::{RadialGradient, Rect, Rgba, StateStack, Surface};

/// An off-screen RGBA pixel buffer implementing [`Surface`].
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    background: Rgba,
    state: StateStack,
}

impl Canvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
            background: Rgba::TRANSPARENT,
            state: StateStack::default(),
        }
    }

    /// Colour [`Surface::clear`] fills with.
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self.clear();
        self
    }

    /// Reallocate the buffer. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
            self.clear();
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Tightly packed RGBA8 rows, top to bottom.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let Pixel([r, g, b, a]) = *self.image.get_pixel(x, y);
        Rgba::new(r, g, b, a)
    }

    /// Write the current contents as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn transform(&self) -> Affine2 {
        self.state.current().transform
    }

    /// Blend `color` at `coverage` (times global alpha) onto pixel `(x, y)`.
    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        let (w, h) = self.image.dimensions();
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            return;
        }
        let sa = color.a as f32 / 255.0 * coverage * self.state.current().alpha;
        if sa <= 0.0 {
            return;
        }

        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let da = dst.0[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let s = src[c] as f32;
            let d = dst.0[c] as f32;
            dst.0[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Pixel rectangle covering the transformed local-space `corners`,
    /// clipped to the image. Inclusive-exclusive.
    fn pixel_bounds(&self, corners: [Vec2; 4]) -> Option<(i64, i64, i64, i64)> {
        let t = self.transform();
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for c in corners {
            let p = t.transform_point2(c);
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        let (w, h) = self.image.dimensions();
        let x0 = (min.x.floor() as i64).max(0);
        let y0 = (min.y.floor() as i64).max(0);
        let x1 = (max.x.ceil() as i64).min(w as i64);
        let y1 = (max.y.ceil() as i64).min(h as i64);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Run `shade` for every pixel centre whose local-space point lies in
    /// `rect`, blending the returned colour at the returned coverage.
    fn fill_local(&mut self, rect: Rect, mut shade: impl FnMut(Vec2) -> Option<(Rgba, f32)>) {
        let max = rect.min + rect.size;
        let corners = [rect.min, Vec2::new(max.x, rect.min.y), max, Vec2::new(rect.min.x, max.y)];
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(corners) else {
            return;
        };
        let inverse = self.transform().inverse();

        for y in y0..y1 {
            for x in x0..x1 {
                let local = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if !rect.contains(local) {
                    continue;
                }
                if let Some((color, coverage)) = shade(local) {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self) {
        let bg = self.background;
        for p in self.image.pixels_mut() {
            *p = Pixel([bg.r, bg.g, bg.b, bg.a]);
        }
        self.state.reset();
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.set_alpha(alpha);
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.translate(offset);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.rotate(radians);
    }

    fn fill_radial_gradient_rect(&mut self, rect: Rect, gradient: &RadialGradient) {
        let gradient = *gradient;
        self.fill_local(rect, |p| Some((gradient.sample(p), 1.0)));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        let a = self.state.to_surface(from);
        let b = self.state.to_surface(to);
        if !a.is_finite() || !b.is_finite() {
            return;
        }

        let brush = width.max(1.0).round() as i64;
        let offset = (brush - 1) / 2;
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil() as i64;

        let mut last = None;
        for i in 0..=steps {
            let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
            let p = a + delta * t;
            let px = (p.x.floor() as i64, p.y.floor() as i64);
            if last == Some(px) {
                continue;
            }
            last = Some(px);
            for dy in 0..brush {
                for dx in 0..brush {
                    self.blend(px.0 + dx - offset, px.1 + dy - offset, color, 1.0);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, at: Vec2, font_size: f32, color: Rgba) {
        let Some(mask) = font::rasterize(text, font_size) else {
            return;
        };
        let size = Vec2::new(mask.width() as f32, mask.height() as f32);
        let origin = at - size * 0.5;

        self.fill_local(Rect::new(origin, size), |p| {
            let uv = p - origin;
            let coverage = mask.sample(uv.x, uv.y);
            (coverage > 0.0).then_some((color, coverage))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_to_background() {
        let mut canvas = Canvas::new(4, 4).with_background(Rgba::rgb(5, 5, 12));
        canvas.stroke_line(Vec2::ZERO, Vec2::new(3.0, 3.0), Rgba::rgb(255, 0, 0), 1.0);
        canvas.clear();
        assert_eq!(canvas.pixel(2, 2), Rgba::rgb(5, 5, 12));
    }

    #[test]
    fn test_line_respects_global_alpha() {
        let mut canvas = Canvas::new(10, 10);
        canvas.set_alpha(0.5);
        canvas.stroke_line(Vec2::new(0.0, 5.0), Vec2::new(9.0, 5.0), Rgba::rgb(0, 255, 255), 1.0);

        let p = canvas.pixel(4, 5);
        assert_eq!((p.r, p.g, p.b), (0, 255, 255));
        assert!((p.a as i32 - 128).abs() <= 1);
        assert_eq!(canvas.pixel(4, 4).a, 0);
    }

    #[test]
    fn test_zero_alpha_draws_nothing() {
        let mut canvas = Canvas::new(10, 10);
        canvas.set_alpha(0.0);
        canvas.stroke_line(Vec2::ZERO, Vec2::new(9.0, 9.0), Rgba::rgb(255, 255, 255), 1.0);
        assert!(canvas.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_gradient_peaks_in_centre() {
        let mut canvas = Canvas::new(40, 40);
        canvas.translate(Vec2::new(20.0, 20.0));
        let gradient = RadialGradient {
            center: Vec2::ZERO,
            radius: 10.0,
            inner: Rgba::rgb(255, 0, 255).with_alpha(0x40),
            outer: Rgba::rgb(255, 0, 255).with_alpha(0),
        };
        canvas.fill_radial_gradient_rect(Rect::centered(Vec2::ZERO, 10.0), &gradient);

        let centre = canvas.pixel(20, 20).a;
        let edge = canvas.pixel(28, 20).a;
        assert!(centre > edge, "centre {} edge {}", centre, edge);
        assert!(centre <= 0x40);
        assert_eq!(canvas.pixel(2, 2).a, 0);
    }

    #[test]
    fn test_text_draws_inside_box() {
        let mut canvas = Canvas::new(32, 32);
        canvas.fill_text("▮", Vec2::new(16.0, 16.0), 16.0, Rgba::rgb(255, 107, 107));

        // Solid bar through the centre, nothing at the edges
        let centre = canvas.pixel(16, 16);
        assert_eq!((centre.r, centre.g, centre.b), (255, 107, 107));
        assert!(centre.a > 0);
        assert_eq!(canvas.pixel(0, 16).a, 0);
        assert_eq!(canvas.pixel(16, 30).a, 0);
    }

    #[test]
    fn test_text_is_antialiased() {
        let mut canvas = Canvas::new(64, 64);
        canvas.fill_text("∑", Vec2::new(32.0, 32.0), 40.0, Rgba::rgb(240, 147, 43));

        let alphas: std::collections::HashSet<u8> = canvas
            .as_raw()
            .chunks(4)
            .map(|px| px[3])
            .filter(|&a| a > 0 && a < 255)
            .collect();
        assert!(!alphas.is_empty(), "outline edges should carry partial coverage");
    }

    #[test]
    fn test_rotated_text_swaps_axes() {
        let mut canvas = Canvas::new(32, 32);
        canvas.translate(Vec2::new(16.0, 16.0));
        canvas.rotate(std::f32::consts::FRAC_PI_2);
        canvas.fill_text("⎯", Vec2::ZERO, 16.0, Rgba::rgb(255, 255, 255));

        // Horizontal stroke becomes vertical
        let lit: Vec<(u32, u32)> = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y).a > 0)
            .collect();
        assert!(!lit.is_empty());
        let xs: std::collections::HashSet<u32> = lit.iter().map(|p| p.0).collect();
        let ys: std::collections::HashSet<u32> = lit.iter().map(|p| p.1).collect();
        assert!(ys.len() > xs.len());
    }

    #[test]
    fn test_resize_reallocates() {
        let mut canvas = Canvas::new(800, 600);
        canvas.resize(400, 300);
        assert_eq!(canvas.size(), (400, 300));
        assert_eq!(canvas.as_raw().len(), 400 * 300 * 4);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames").join("frame.png");
        let mut canvas = Canvas::new(8, 8);
        canvas.stroke_line(Vec2::ZERO, Vec2::new(7.0, 7.0), Rgba::rgb(0, 255, 255), 1.0);
        canvas.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(loaded.get_pixel(3, 3).0, [0, 255, 255, 255]);
    }
}
