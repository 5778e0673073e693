//! Error types for Pyre.
//!
//! GPU setup and configuration errors abort startup. Asset errors are
//! reported by the loaders but the scene host logs them and carries on with a
//! fallback, so a missing model or skybox never stops the frame loop.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// The surface reports no usable texture format for this adapter.
    NoSurfaceFormat,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::NoSurfaceFormat => {
                write!(f, "The window surface supports no texture format on this adapter.")
            }
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter | GpuError::NoSurfaceFormat => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading textures, skyboxes and models.
#[derive(Debug)]
pub enum AssetError {
    /// Failed to decode an image file.
    ImageLoad(image::ImageError),
    /// Failed to import a glTF document.
    Gltf(gltf::Error),
    /// Skybox faces must be square and share one size.
    CubemapFaceMismatch {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// The model contained no triangle geometry.
    EmptyModel(PathBuf),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::ImageLoad(e) => write!(f, "Failed to load image: {}", e),
            AssetError::Gltf(e) => write!(f, "Failed to import glTF: {}", e),
            AssetError::CubemapFaceMismatch { path, expected, found } => write!(
                f,
                "Skybox face '{}' is {}x{}, expected {}x{}",
                path.display(),
                found.0,
                found.1,
                expected.0,
                expected.1
            ),
            AssetError::EmptyModel(path) => {
                write!(f, "Model '{}' has no triangle meshes", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::ImageLoad(e) => Some(e),
            AssetError::Gltf(e) => Some(e),
            AssetError::CubemapFaceMismatch { .. } | AssetError::EmptyModel(_) => None,
        }
    }
}

impl From<image::ImageError> for AssetError {
    fn from(e: image::ImageError) -> Self {
        AssetError::ImageLoad(e)
    }
}

impl From<gltf::Error> for AssetError {
    fn from(e: gltf::Error) -> Self {
        AssetError::Gltf(e)
    }
}

/// Errors from reading or validating a [`DemoConfig`](crate::DemoConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid config JSON.
    Parse(serde_json::Error),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur when running the demo.
#[derive(Debug)]
pub enum DemoError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            DemoError::Window(e) => write!(f, "Failed to create window: {}", e),
            DemoError::Gpu(e) => write!(f, "GPU error: {}", e),
            DemoError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DemoError::EventLoop(e) => Some(e),
            DemoError::Window(e) => Some(e),
            DemoError::Gpu(e) => Some(e),
            DemoError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for DemoError {
    fn from(e: winit::error::EventLoopError) -> Self {
        DemoError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for DemoError {
    fn from(e: winit::error::OsError) -> Self {
        DemoError::Window(e)
    }
}

impl From<GpuError> for DemoError {
    fn from(e: GpuError) -> Self {
        DemoError::Gpu(e)
    }
}

impl From<ConfigError> for DemoError {
    fn from(e: ConfigError) -> Self {
        DemoError::Config(e)
    }
}
