//! Window host: owns the field and drives it from the winit event loop.
//!
//! Every redraw advances the field, renders it into the software canvas,
//! presents the canvas, and requests the next redraw. The loop has no exit
//! condition of its own; it runs until the window closes.

use std::path::Path;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::canvas::Canvas;
use crate::error::HostError;
use crate::field::{Field, FieldConfig, FrameStats};
use crate::gpu::Presenter;
use crate::input::{Input, KeyCode, Stimulus};
use crate::surface::Rgba;
use crate::time::FrameClock;

/// Near-black page background the particles float over.
pub const BACKGROUND: Rgba = Rgba::rgb(10, 10, 10);

/// Window and field settings for [`run`].
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    pub field: FieldConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            title: "glyphfield".to_string(),
            width: 1280,
            height: 720,
            background: BACKGROUND,
            field: FieldConfig::default(),
        }
    }
}

/// Open a window and animate the field until it is closed.
///
/// If no window or GPU surface can be obtained the field never starts and
/// this returns `Ok(())` after logging why.
pub fn run(config: HostConfig) -> Result<(), HostError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

/// Render `frames` frames without a window and write the last one to `path`.
pub fn render_snapshot(
    width: u32,
    height: u32,
    frames: u32,
    background: Rgba,
    config: FieldConfig,
    path: impl AsRef<Path>,
) -> Result<FrameStats, HostError> {
    let mut field = Field::with_config(width as f32, height as f32, config);
    let mut canvas = Canvas::new(width, height).with_background(background);

    let mut stats = field.render(&mut canvas);
    for _ in 0..frames {
        field.update();
        stats = field.render(&mut canvas);
    }

    canvas.save_png(path.as_ref())?;
    log::info!(
        "wrote {} after {} frames ({} links)",
        path.as_ref().display(),
        frames,
        stats.links_drawn
    );
    Ok(stats)
}

/// Everything that exists only once a drawing surface is available.
struct Running {
    window: Arc<Window>,
    presenter: Presenter,
    field: Field,
    canvas: Canvas,
}

struct App {
    config: HostConfig,
    running: Option<Running>,
    input: Input,
    clock: FrameClock,
}

impl App {
    fn new(config: HostConfig) -> Self {
        let input = Input::new(config.width, config.height);
        Self {
            config,
            running: None,
            input,
            clock: FrameClock::new(),
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running, HostError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone(), self.config.background))?;

        let size = window.inner_size();
        let field = Field::with_config(size.width as f32, size.height as f32, self.config.field.clone());
        // Left transparent; the presenter composites it over the background
        let canvas = Canvas::new(size.width, size.height);
        log::info!(
            "field started: {} particles over {}x{}",
            field.len(),
            size.width,
            size.height
        );

        Ok(Running {
            window,
            presenter,
            field,
            canvas,
        })
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = &mut self.running else {
            return;
        };

        let dt = self.clock.tick();
        if !self.clock.is_paused() {
            running.field.advance(dt);
        }
        let stats = running.field.render(&mut running.canvas);

        match running.presenter.present(&running.canvas) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                running.presenter.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, stopping");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("present failed: {:?}", e),
        }

        if let Some(fps) = self.clock.take_fps_update() {
            running
                .window
                .set_title(&format!("{} - {:.0} fps", self.config.title, fps));
            log::trace!(
                "fps {:.1}, {} pairs checked, {} links",
                fps,
                stats.pairs_checked,
                stats.links_drawn
            );
        }

        running.window.request_redraw();
    }

    fn stimulus(&mut self, event_loop: &ActiveEventLoop, stimulus: Stimulus) {
        let Some(running) = &mut self.running else {
            return;
        };

        match stimulus {
            Stimulus::PointerMoved(pointer) => {
                running.field.repel(pointer);
            }
            Stimulus::PointerLeft => {}
            Stimulus::Resized { width, height } => {
                running.field.resize(width as f32, height as f32);
                running.canvas.resize(width, height);
                running.presenter.resize(width, height);
            }
            Stimulus::KeyPressed(KeyCode::Escape) => event_loop.exit(),
            Stimulus::KeyPressed(KeyCode::Space) => {
                self.clock.toggle_pause();
                log::info!("{}", if self.clock.is_paused() { "paused" } else { "resumed" });
            }
            Stimulus::KeyPressed(KeyCode::Other(_)) => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                log::warn!("no drawing surface, particle field not started: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }
        if let WindowEvent::RedrawRequested = event {
            self.frame(event_loop);
            return;
        }
        if let Some(stimulus) = self.input.handle_event(&event) {
            self.stimulus(event_loop, stimulus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.png");
        let config = FieldConfig::new().with_seed(11).with_particle_count(20);

        let stats = render_snapshot(320, 240, 5, BACKGROUND, config, &path).unwrap();
        assert_eq!(stats.particles_drawn, 20);
        assert_eq!(stats.pairs_checked, 190);

        let img = image::open(&path).unwrap().into_rgba8();
        assert_eq!(img.dimensions(), (320, 240));
        // Background is opaque everywhere
        assert!(img.pixels().all(|p| p.0[3] == 255));
    }
}
