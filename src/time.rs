//! Frame pacing for the host loop.
//!
//! The field is driven by whatever cadence the window delivers redraws at.
//! [`FrameClock`] measures that cadence: the time since the previous frame,
//! a running frame count, and an FPS estimate refreshed twice a second.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // On every redraw:
//! let dt = clock.tick();
//! field.advance(dt);
//! if let Some(fps) = clock.take_fps_update() {
//!     window.set_title(&format!("glyphfield - {:.0} fps", fps));
//! }
//! ```

use std::time::{Duration, Instant};

/// Time tracking for the frame loop.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    fps_dirty: bool,
    paused: bool,
}

impl FrameClock {
    /// Create a clock whose first frame starts now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fps_dirty: false,
            paused: false,
        }
    }

    /// Mark the start of a new frame. Returns seconds since the previous one,
    /// or `0.0` while paused.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let raw_delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.delta_secs = if self.paused { 0.0 } else { raw_delta };
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            self.fps_dirty = true;
        }

        self.delta_secs
    }

    /// Seconds between the last two ticks.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames ticked so far, paused frames included.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// The FPS estimate, once per refresh.
    pub fn take_fps_update(&mut self) -> Option<f32> {
        std::mem::take(&mut self.fps_dirty).then_some(self.fps)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle pause. Frames keep ticking; only the reported delta stops.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_tick_measures_delta() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        let dt = clock.tick_at(start + Duration::from_millis(16));

        assert!((dt - 0.016).abs() < 1e-4);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_pause_zeroes_delta() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        clock.toggle_pause();

        assert_eq!(clock.tick_at(start + Duration::from_millis(16)), 0.0);
        assert_eq!(clock.frame(), 1);

        clock.toggle_pause();
        let dt = clock.tick_at(start + Duration::from_millis(32));
        assert!((dt - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_fps_reported_once_per_interval() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        for i in 1..=30 {
            clock.tick_at(start + Duration::from_millis(i * 20));
        }
        // 25 frames in the first 500ms
        let fps = clock.take_fps_update().unwrap();
        assert!((fps - 50.0).abs() < 1.0, "fps {}", fps);
        assert!(clock.take_fps_update().is_none());
    }
}
