//! A [`Surface`] that records what was drawn.
//!
//! Every command carries the alpha and transform in effect when it was
//! issued, so a frame can be inspected without rasterizing it.

use glam::{Affine2, Vec2};

use crate::surface::{RadialGradient, Rect, Rgba, StateStack, Surface};

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
        alpha: f32,
    },
    Gradient {
        rect: Rect,
        gradient: RadialGradient,
        alpha: f32,
        transform: Affine2,
    },
    Text {
        text: String,
        at: Vec2,
        font_size: f32,
        color: Rgba,
        alpha: f32,
        transform: Affine2,
    },
}

impl DrawCommand {
    /// Surface-space origin of the command's local coordinate frame.
    pub fn origin(&self) -> Option<Vec2> {
        match self {
            DrawCommand::Gradient { transform, .. } | DrawCommand::Text { transform, .. } => {
                Some(transform.translation)
            }
            _ => None,
        }
    }
}

/// Records draw calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct Recorder {
    width: u32,
    height: u32,
    state: StateStack,
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: StateStack::default(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Text { .. }))
    }

    /// Unbalanced `save` calls outstanding.
    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Surface for Recorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Clearing also drops the previous frame's commands.
    fn clear(&mut self) {
        self.commands.clear();
        self.state.reset();
        self.commands.push(DrawCommand::Clear);
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
        let state = *self.state.current();
        self.commands.push(DrawCommand::Gradient {
            rect,
            gradient: *gradient,
            alpha: state.alpha,
            transform: state.transform,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Line {
            from: self.state.to_surface(from),
            to: self.state.to_surface(to),
            color,
            width,
            alpha: self.state.current().alpha,
        });
    }

    fn fill_text(&mut self, text: &str, at: Vec2, font_size: f32, color: Rgba) {
        let state = *self.state.current();
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            font_size,
            color,
            alpha: state.alpha,
            transform: state.transform,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_starts_new_frame() {
        let mut rec = Recorder::new(100, 100);
        rec.stroke_line(Vec2::ZERO, Vec2::ONE, Rgba::rgb(0, 255, 255), 1.0);
        rec.clear();
        assert_eq!(rec.commands(), &[DrawCommand::Clear]);
    }

    #[test]
    fn test_records_transformed_origin() {
        let mut rec = Recorder::new(100, 100);
        rec.save();
        rec.set_alpha(0.4);
        rec.translate(Vec2::new(30.0, 40.0));
        rec.rotate(1.0);
        rec.fill_text("%", Vec2::ZERO, 12.0, Rgba::rgb(0x96, 0xce, 0xb4));
        rec.restore();

        let cmd = rec.texts().next().unwrap();
        assert_eq!(cmd.origin(), Some(Vec2::new(30.0, 40.0)));
        match cmd {
            DrawCommand::Text { alpha, text, .. } => {
                assert!((alpha - 0.4).abs() < 1e-6);
                assert_eq!(text, "%");
            }
            _ => unreachable!(),
        }
        assert_eq!(rec.save_depth(), 0);
    }
}
