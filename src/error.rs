//! Error types for glyphfield.
//!
//! The simulation itself never fails. These cover the host: acquiring a GPU
//! surface to present on, running the window, and exporting snapshots.

use std::fmt;

/// Errors that can occur while setting up the window presenter.
#[derive(Debug)]
pub enum PresenterError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    UnsupportedSurface,
}

impl fmt::Display for PresenterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenterError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            PresenterError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            PresenterError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            PresenterError::UnsupportedSurface => write!(f, "Surface has no supported texture format"),
        }
    }
}

impl std::error::Error for PresenterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresenterError::SurfaceCreation(e) => Some(e),
            PresenterError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for PresenterError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        PresenterError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for PresenterError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        PresenterError::DeviceCreation(e)
    }
}

/// Errors that can occur when writing a canvas snapshot.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to encode the image.
    Image(image::ImageError),
    /// Failed to create the output directory.
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Image(e) => write!(f, "Failed to encode image: {}", e),
            ExportError::Io(e) => write!(f, "Failed to write snapshot: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Image(e) => Some(e),
            ExportError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// Errors that can occur when running the host.
#[derive(Debug)]
pub enum HostError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// Presenter initialization failed.
    Presenter(PresenterError),
    /// Snapshot export failed.
    Export(ExportError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            HostError::Window(e) => write!(f, "Failed to create window: {}", e),
            HostError::Presenter(e) => write!(f, "Presenter error: {}", e),
            HostError::Export(e) => write!(f, "Export error: {}", e),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::EventLoop(e) => Some(e),
            HostError::Window(e) => Some(e),
            HostError::Presenter(e) => Some(e),
            HostError::Export(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for HostError {
    fn from(e: winit::error::EventLoopError) -> Self {
        HostError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for HostError {
    fn from(e: winit::error::OsError) -> Self {
        HostError::Window(e)
    }
}

impl From<PresenterError> for HostError {
    fn from(e: PresenterError) -> Self {
        HostError::Presenter(e)
    }
}

impl From<ExportError> for HostError {
    fn from(e: ExportError) -> Self {
        HostError::Export(e)
    }
}
