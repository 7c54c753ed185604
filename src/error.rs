//! Error types for the simulation.
//!
//! The simulation core has a single failure path: rejecting a configuration
//! at startup. Everything else that can fail lives in the window and GPU
//! collaborators.

use std::fmt;

/// Reasons a [`SimConfig`](crate::SimConfig) is rejected before the first tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The population is empty.
    NoAgents,
    /// The trail field has zero width or height.
    EmptyField { width: u32, height: u32 },
    /// A parameter is NaN or infinite.
    NonFinite(&'static str),
    /// A parameter that must be non-negative is negative.
    Negative(&'static str, f32),
    /// A blend factor lies outside `[0, 1]`.
    OutOfUnitRange(&'static str, f32),
    /// Species count outside the supported range.
    Species(u32),
    /// More agents than the population counter can hold.
    TooManyAgents,
    /// An explicitly placed agent starts outside the field.
    AgentOutOfBounds(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoAgents => write!(f, "Agent count must be at least 1"),
            ConfigError::EmptyField { width, height } => {
                write!(f, "Trail field must not be empty (got {}x{})", width, height)
            }
            ConfigError::NonFinite(name) => write!(f, "Parameter '{}' must be finite", name),
            ConfigError::Negative(name, v) => {
                write!(f, "Parameter '{}' must be non-negative (got {})", name, v)
            }
            ConfigError::OutOfUnitRange(name, v) => {
                write!(f, "Parameter '{}' must lie in [0, 1] (got {})", name, v)
            }
            ConfigError::Species(n) => write!(
                f,
                "Species count must be between 1 and {} (got {})",
                crate::config::MAX_SPECIES,
                n
            ),
            ConfigError::TooManyAgents => write!(f, "Agent count exceeds u32::MAX"),
            ConfigError::AgentOutOfBounds(i) => {
                write!(f, "Agent {} starts outside the trail field", i)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "Surface does not support any texture format"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
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

/// Errors that can occur when running a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The presenter could not show a frame.
    Present(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SimulationError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SimulationError::Window(e) => write!(f, "Failed to create window: {}", e),
            SimulationError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulationError::Present(msg) => write!(f, "Failed to present frame: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::EventLoop(e) => Some(e),
            SimulationError::Window(e) => Some(e),
            SimulationError::Gpu(e) => Some(e),
            SimulationError::Present(_) => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for SimulationError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SimulationError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SimulationError {
    fn from(e: winit::error::OsError) -> Self {
        SimulationError::Window(e)
    }
}

impl From<GpuError> for SimulationError {
    fn from(e: GpuError) -> Self {
        SimulationError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_messages_name_parameter() {
        let err = ConfigError::OutOfUnitRange("diffuse_rate", 1.5);
        assert!(err.to_string().contains("diffuse_rate"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_simulation_error_wraps_config_source() {
        let err = SimulationError::from(ConfigError::NoAgents);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
