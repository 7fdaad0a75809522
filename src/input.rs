//! Input handling for the window host.
//!
//! [`Input`] turns raw winit window events into the three stimuli the field
//! cares about: pointer movement, viewport resizes, and the few keys the host
//! binds. It also keeps the latest pointer position and viewport size so the
//! host can query them between events.
//!
//! # Usage
//!
//! ```ignore
//! match input.handle_event(&event) {
//!     Some(Stimulus::PointerMoved(p)) => { field.repel(p); }
//!     Some(Stimulus::Resized { width, height }) => field.resize(width as f32, height as f32),
//!     Some(Stimulus::KeyPressed(KeyCode::Space)) => clock.toggle_pause(),
//!     _ => {}
//! }
//! ```

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Something that happened to the field's host surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stimulus {
    /// Pointer moved to this surface-space position.
    PointerMoved(Vec2),
    /// Pointer left the surface.
    PointerLeft,
    /// Viewport changed to a non-zero size.
    Resized { width: u32, height: u32 },
    /// A key went down (auto-repeat filtered out).
    KeyPressed(KeyCode),
}

/// Pointer, key and viewport state.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    pointer: Option<Vec2>,
    viewport: (u32, u32),
}

impl Input {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width, height),
            ..Default::default()
        }
    }

    /// Pointer position in surface pixels, if the pointer is over the surface.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Record a window event, returning the stimulus it produced.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Stimulus> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                self.key(KeyCode::from(code), event.state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.pointer_moved(Vec2::new(position.x as f32, position.y as f32)))
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                Some(Stimulus::PointerLeft)
            }
            WindowEvent::Resized(size) => self.resized(size.width, size.height),
            _ => None,
        }
    }

    fn key(&mut self, key: KeyCode, state: ElementState) -> Option<Stimulus> {
        match state {
            // Only report the first press, not auto-repeat
            ElementState::Pressed => self.keys_held.insert(key).then_some(Stimulus::KeyPressed(key)),
            ElementState::Released => {
                self.keys_held.remove(&key);
                None
            }
        }
    }

    fn pointer_moved(&mut self, position: Vec2) -> Stimulus {
        self.pointer = Some(position);
        Stimulus::PointerMoved(position)
    }

    /// Minimizing reports a zero-area size; that is not a real viewport
    /// and is dropped so the field keeps its last bounds.
    fn resized(&mut self, width: u32, height: u32) -> Option<Stimulus> {
        if width == 0 || height == 0 {
            return None;
        }
        self.viewport = (width, height);
        Some(Stimulus::Resized { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_repeat_filtered() {
        let mut input = Input::new(800, 600);

        assert_eq!(
            input.key(KeyCode::Space, ElementState::Pressed),
            Some(Stimulus::KeyPressed(KeyCode::Space))
        );
        assert!(input.key_held(KeyCode::Space));
        assert_eq!(input.key(KeyCode::Space, ElementState::Pressed), None);

        assert_eq!(input.key(KeyCode::Space, ElementState::Released), None);
        assert!(!input.key_held(KeyCode::Space));
        assert!(input.key(KeyCode::Space, ElementState::Pressed).is_some());
    }

    #[test]
    fn test_pointer_tracking() {
        let mut input = Input::new(800, 600);
        assert_eq!(input.pointer(), None);

        let s = input.pointer_moved(Vec2::new(12.0, 34.0));
        assert_eq!(s, Stimulus::PointerMoved(Vec2::new(12.0, 34.0)));
        assert_eq!(input.pointer(), Some(Vec2::new(12.0, 34.0)));
    }

    #[test]
    fn test_resize_tracks_viewport() {
        let mut input = Input::new(800, 600);
        let s = input.resized(400, 300);
        assert_eq!(s, Some(Stimulus::Resized { width: 400, height: 300 }));
        assert_eq!(input.viewport(), (400, 300));
    }

    #[test]
    fn test_minimize_does_not_resize() {
        let mut input = Input::new(800, 600);
        assert_eq!(input.resized(0, 0), None);
        assert_eq!(input.resized(800, 0), None);
        assert_eq!(input.viewport(), (800, 600));

        assert_eq!(
            input.resized(800, 600),
            Some(Stimulus::Resized { width: 800, height: 600 })
        );
    }

    #[test]
    fn test_key_code_mapping() {
        assert_eq!(KeyCode::from(WinitKeyCode::Escape), KeyCode::Escape);
        assert!(matches!(KeyCode::from(WinitKeyCode::KeyQ), KeyCode::Other(_)));
    }
}
