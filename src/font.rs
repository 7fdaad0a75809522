//! Glyph rasterization for the software canvas.
//!
//! Text is set in an embedded DejaVu Sans face through `ab_glyph`, one
//! coverage value per pixel. The symbols that face has no outline for (the
//! emoji and `⎯`) come from small built-in 8x8 bitmaps, and any other
//! missing character draws as a hollow box. Variation selectors and other
//! zero-width characters are skipped.
//!
//! ```ignore
//! let mask = font::rasterize("42", 20.0).unwrap();
//! let coverage = mask.sample(3.5, 10.5);
//! ```

use std::sync::OnceLock;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};

/// DejaVu Sans (Bitstream Vera license, see `assets/DejaVuSans-LICENSE.txt`).
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Fallback bitmap cell size.
pub const CELL: usize = 8;

/// One fallback glyph: 8 rows, most significant bit is the leftmost column.
pub type Bitmap = [u8; CELL];

const fn row(s: &str) -> u8 {
    let b = s.as_bytes();
    let mut out = 0u8;
    let mut i = 0;
    while i < CELL {
        out <<= 1;
        if b[i] == b'#' {
            out |= 1;
        }
        i += 1;
    }
    out
}

const fn glyph(rows: [&str; CELL]) -> Bitmap {
    let mut out = [0u8; CELL];
    let mut i = 0;
    while i < CELL {
        out[i] = row(rows[i]);
        i += 1;
    }
    out
}

const TOFU: Bitmap = glyph([
    "######..",
    "#....#..",
    "#....#..",
    "#....#..",
    "#....#..",
    "#....#..",
    "######..",
    "........",
]);

const LINE: Bitmap = glyph([
    "........",
    "........",
    "........",
    "########",
    "........",
    "........",
    "........",
    "........",
]);

const BAR_CHART: Bitmap = glyph([
    "........",
    ".....##.",
    ".....##.",
    "..##.##.",
    "..##.##.",
    "#.##.##.",
    "#.##.##.",
    "########",
]);

const LINE_CHART: Bitmap = glyph([
    "#.......",
    "#.....##",
    "#....##.",
    "#.#.##..",
    "#.###...",
    "#..#....",
    "#.......",
    "########",
]);

const CABINET: Bitmap = glyph([
    "#######.",
    "#.....#.",
    "#..#..#.",
    "#######.",
    "#.....#.",
    "#..#..#.",
    "#######.",
    "........",
]);

const FLOPPY: Bitmap = glyph([
    "#######.",
    "#.#..##.",
    "#.####.#",
    "#......#",
    "#.####.#",
    "#.#..#.#",
    "########",
    "........",
]);

/// The embedded face, parsed once. `None` if it fails to parse, in which
/// case all text falls back to bitmaps.
fn face() -> Option<&'static FontArc> {
    static FACE: OnceLock<Option<FontArc>> = OnceLock::new();
    FACE.get_or_init(|| match FontArc::try_from_slice(FONT_DATA) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("embedded font unusable, drawing bitmap glyphs: {}", e);
            None
        }
    })
    .as_ref()
}

/// Whether the embedded face has an outline for `ch`.
pub fn has_outline(ch: char) -> bool {
    face().is_some_and(|f| f.glyph_id(ch).0 != 0)
}

/// Fallback bitmap for `ch`, or `None` when there is no built-in entry.
pub fn bitmap(ch: char) -> Option<Bitmap> {
    let b = match ch {
        '⎯' => LINE,
        '📊' => BAR_CHART,
        '📈' => LINE_CHART,
        '🗄' => CABINET,
        '💾' => FLOPPY,
        _ => return None,
    };
    Some(b)
}

/// Zero-width characters that take no space.
pub fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{fe00}'..='\u{fe0f}' | '\u{200b}'..='\u{200d}')
}

/// Per-pixel coverage of a line of text, origin at the top-left of the
/// line box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl TextMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage in `[0, 1]` at mask-space point `(x, y)`; 0 outside.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if !(x >= 0.0 && y >= 0.0) {
            return 0.0;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c <= 0.0)
    }

    fn add(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let c = &mut self.coverage[y as usize * self.width as usize + x as usize];
        *c = (*c + coverage).min(1.0);
    }

    /// Draw `bitmap` scaled into the `side`-pixel square starting at column `left`.
    fn stamp(&mut self, bitmap: Bitmap, left: f32, side: f32) {
        let x0 = left.floor() as i32;
        let n = side.ceil() as i32;
        for py in 0..n {
            let row = ((py as f32 + 0.5) / side * CELL as f32) as usize;
            for px in 0..n {
                let col = ((px as f32 + 0.5) / side * CELL as f32) as usize;
                if row < CELL && col < CELL && bitmap[row] & (0x80 >> col) != 0 {
                    self.add(x0 + px, py, 1.0);
                }
            }
        }
    }
}

/// Rasterize `text` at `font_size` pixels.
///
/// Returns `None` for empty text or a non-positive size.
pub fn rasterize(text: &str, font_size: f32) -> Option<TextMask> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return None;
    }
    let chars: Vec<char> = text.chars().filter(|c| !is_zero_width(*c)).collect();
    if chars.is_empty() {
        return None;
    }
    Some(match face() {
        Some(face) => set_outlined(face, &chars, font_size),
        None => set_bitmaps(&chars, font_size),
    })
}

fn set_outlined(face: &FontArc, chars: &[char], font_size: f32) -> TextMask {
    let scaled = face.as_scaled(PxScale::from(font_size));
    let ascent = scaled.ascent();
    let line = (ascent - scaled.descent()).max(1.0);

    // Pen positions; bitmap glyphs take a square the height of the line
    let mut pens: Vec<(f32, Option<GlyphId>)> = Vec::with_capacity(chars.len());
    let mut caret = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    for &ch in chars {
        let id = face.glyph_id(ch);
        if id.0 == 0 {
            pens.push((caret, None));
            caret += line;
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        pens.push((caret, Some(id)));
        caret += scaled.h_advance(id);
        prev = Some(id);
    }

    let mut mask = TextMask::new(caret.ceil().max(1.0) as u32, line.ceil() as u32);
    for (&ch, (x, id)) in chars.iter().zip(pens) {
        match id {
            Some(id) => {
                let glyph = id.with_scale_and_position(scaled.scale(), point(x, ascent));
                if let Some(outlined) = face.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, c| {
                        mask.add(bounds.min.x as i32 + gx as i32, bounds.min.y as i32 + gy as i32, c)
                    });
                }
            }
            None => mask.stamp(bitmap(ch).unwrap_or(TOFU), x, line),
        }
    }
    mask
}

fn set_bitmaps(chars: &[char], font_size: f32) -> TextMask {
    let width = (font_size * chars.len() as f32).ceil() as u32;
    let mut mask = TextMask::new(width.max(1), font_size.ceil() as u32);
    for (i, &ch) in chars.iter().enumerate() {
        mask.stamp(bitmap(ch).unwrap_or(TOFU), i as f32 * font_size, font_size);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;

    #[test]
    fn test_every_palette_glyph_renders() {
        for symbol in PALETTE.iter() {
            let mask = rasterize(symbol.glyph, 20.0).unwrap();
            assert!(!mask.is_blank(), "nothing drawn for {}", symbol.label);
        }
    }

    #[test]
    fn test_text_glyphs_use_outlines() {
        for ch in "0123456789%▦▮◴∑µ".chars() {
            assert!(has_outline(ch), "no outline for {:?}", ch);
        }
        for ch in "⎯📊📈🗄💾".chars() {
            assert!(!has_outline(ch));
            assert!(bitmap(ch).is_some(), "no fallback for {:?}", ch);
        }
    }

    #[test]
    fn test_database_glyph_skips_variation_selector() {
        let with = rasterize("🗄️", 16.0).unwrap();
        let without = rasterize("🗄", 16.0).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_two_digits_wider_than_one() {
        let one = rasterize("4", 20.0).unwrap();
        let two = rasterize("42", 20.0).unwrap();
        assert!(two.width() > one.width());
        assert_eq!(two.height(), one.height());
    }

    #[test]
    fn test_unknown_falls_back_to_box() {
        let mask = rasterize("\u{1f9ff}", 16.0).unwrap();
        // Top-left of the box outline is solid, its middle is hollow
        assert_eq!(mask.sample(0.5, 0.5), 1.0);
        let mid = mask.height() as f32 * 0.4;
        assert_eq!(mask.sample(mid, mid), 0.0);
    }

    #[test]
    fn test_sample_outside_is_zero() {
        let mask = rasterize("8", 16.0).unwrap();
        assert_eq!(mask.sample(-1.0, 2.0), 0.0);
        assert_eq!(mask.sample(f32::NAN, 2.0), 0.0);
        assert_eq!(mask.sample(mask.width() as f32, 0.0), 0.0);
    }

    #[test]
    fn test_empty_or_degenerate_text() {
        assert!(rasterize("", 16.0).is_none());
        assert!(rasterize("\u{fe0f}", 16.0).is_none());
        assert!(rasterize("5", 0.0).is_none());
        assert!(rasterize("5", f32::NAN).is_none());
    }

    #[test]
    fn test_row_bits() {
        assert_eq!(row("#......#"), 0x81);
        assert_eq!(row("..####.."), 0x3c);
    }
}
