//! The symbol palette particles are drawn from.
//!
//! The palette is a fixed, process-wide table. Particles store an index into
//! it and never own or mutate an entry.

use crate::surface::Rgba;
use rand::Rng;

/// What a palette entry depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Chart,
    Table,
    Graph,
    Pie,
    Bar,
    Line,
    /// Renders a freshly rolled number every frame instead of its glyph.
    Number,
    Percent,
    Database,
    Analytics,
    Stats,
    Data,
}

/// One immutable palette record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub label: &'static str,
    pub glyph: &'static str,
    pub color: Rgba,
}

impl Symbol {
    const fn new(kind: SymbolKind, label: &'static str, glyph: &'static str, hex: u32) -> Self {
        Self {
            kind,
            label,
            glyph,
            color: Rgba::from_hex(hex),
        }
    }

    /// Text to draw for this symbol on the current frame.
    ///
    /// `Number` rolls a new value in `0..=99` on every call, so the same
    /// particle shows a different number each frame.
    pub fn text<R: Rng + ?Sized>(&self, rng: &mut R) -> Glyph {
        match self.kind {
            SymbolKind::Number => Glyph::Rolled(rng.gen_range(0..100)),
            SymbolKind::Percent => Glyph::Fixed("%"),
            _ => Glyph::Fixed(self.glyph),
        }
    }
}

/// Text produced by [`Symbol::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Fixed(&'static str),
    Rolled(u32),
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Glyph::Fixed(s) => f.write_str(s),
            Glyph::Rolled(n) => write!(f, "{}", n),
        }
    }
}

/// The 12 data-analytics symbols.
pub static PALETTE: [Symbol; 12] = [
    Symbol::new(SymbolKind::Chart, "chart", "📊", 0x00ffff),
    Symbol::new(SymbolKind::Table, "table", "▦", 0xff00ff),
    Symbol::new(SymbolKind::Graph, "graph", "📈", 0x00ff00),
    Symbol::new(SymbolKind::Pie, "pie", "◴", 0xffff00),
    Symbol::new(SymbolKind::Bar, "bar", "▮", 0xff6b6b),
    Symbol::new(SymbolKind::Line, "line", "⎯", 0x4ecdc4),
    Symbol::new(SymbolKind::Number, "number", "42", 0x45b7d1),
    Symbol::new(SymbolKind::Percent, "percent", "%", 0x96ceb4),
    Symbol::new(SymbolKind::Database, "database", "🗄️", 0xf9ca24),
    Symbol::new(SymbolKind::Analytics, "analytics", "∑", 0xf0932b),
    Symbol::new(SymbolKind::Stats, "stats", "µ", 0xeb4d4b),
    Symbol::new(SymbolKind::Data, "data", "💾", 0x6c5ce7),
];

/// Look up a palette entry by index.
///
/// Indices come from [`crate::Particle::symbol_id`], which is always in range.
#[inline]
pub fn symbol(index: usize) -> &'static Symbol {
    &PALETTE[index % PALETTE.len()]
}
