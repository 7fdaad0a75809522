//! # glyphfield
//!
//! A decorative 2D particle background: a fixed set of data-analytics glyphs
//! drifting across a surface, linked by fading lines when they come close,
//! pushed away by the pointer, and kept inside the viewport as it resizes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glyphfield::prelude::*;
//!
//! fn main() {
//!     let mut field = Field::with_config(
//!         800.0,
//!         600.0,
//!         FieldConfig::new().with_particle_count(50).with_seed(7),
//!     );
//!     let mut canvas = Canvas::new(800, 600);
//!
//!     for _ in 0..120 {
//!         field.update();
//!         field.render(&mut canvas);
//!     }
//!     canvas.save_png("field.png").unwrap();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Field
//!
//! [`Field`] owns every [`Particle`]. The host drives it with four calls:
//!
//! | Call | When |
//! |------|------|
//! | [`Field::update`] / [`Field::advance`] | once per frame |
//! | [`Field::render`] | once per frame, after the update |
//! | [`Field::repel`] | on every pointer move |
//! | [`Field::resize`] | on every viewport change |
//!
//! ### Surfaces
//!
//! Rendering goes through the [`Surface`] trait, a small immediate-mode 2D
//! drawing interface. [`Canvas`] rasterizes in software; [`Recorder`]
//! captures commands. The window host in [`app`] presents a `Canvas` with
//! wgpu.
//!
//! ## Scaling
//!
//! The link pass tests every pair by default, which is 1225 distance checks
//! for 50 particles. For larger fields use [`LinkStrategy::Grid`] or
//! [`LinkStrategy::Auto`], which bin particles into a uniform grid and only
//! test neighbouring cells.

pub mod app;
mod canvas;
pub mod error;
mod field;
pub mod font;
mod gpu;
pub mod input;
pub mod palette;
mod particle;
mod recording;
pub mod spatial;
mod surface;
pub mod time;

pub use canvas::Canvas;
pub use error::{ExportError, HostError, PresenterError};
pub use field::{
    link_alpha, Field, FieldConfig, FrameStats, Link, LinkStrategy, Motion, DEFAULT_PARTICLE_COUNT,
    LINK_DISTANCE, LINK_MAX_ALPHA, REPEL_RADIUS, REPEL_STRENGTH,
};
pub use glam::Vec2;
pub use gpu::{Presenter, BLIT_WGSL};
pub use palette::{Glyph, Symbol, SymbolKind, PALETTE};
pub use particle::Particle;
pub use recording::{DrawCommand, Recorder};
pub use surface::{DrawState, RadialGradient, Rect, Rgba, StateStack, Surface};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use glyphfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{run, HostConfig};
    pub use crate::canvas::Canvas;
    pub use crate::field::{Field, FieldConfig, FrameStats, LinkStrategy, Motion};
    pub use crate::particle::Particle;
    pub use crate::recording::Recorder;
    pub use crate::surface::{Rgba, Surface};
    pub use crate::time::FrameClock;
    pub use crate::Vec2;
}
