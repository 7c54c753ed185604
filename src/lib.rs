//! # Physarum
//!
//! Agent-based simulation of slime-mold (*Physarum polycephalum*) trail networks.
//!
//! A population of agents moves over a 2D trail field. Each agent deposits
//! its color where it lands, senses the field at three points ahead of it,
//! and turns toward the strongest reading. The field diffuses and decays
//! every tick, so only trails that agents keep reinforcing survive. The
//! result is a self-organizing network of veins.
//!
//! ## Quick Start
//!
//! ```
//! use physarum::prelude::*;
//!
//! let config = SimConfig::new()
//!     .with_agent_count(5_000)
//!     .with_size(200, 150)
//!     .with_seed(7);
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.run_for(50, &mut NullPresenter).unwrap();
//!
//! let stats = sim.field().stats();
//! assert!(stats.lit_cells > 0);
//! ```
//!
//! ## Tick Structure
//!
//! Every tick runs three phases, each finished for all agents before the
//! next begins:
//!
//! | Phase | What happens |
//! |-------|--------------|
//! | Move + deposit | Agents step forward; those that would leave the field stay put and pick a random heading |
//! | Diffuse + decay | The field blurs toward its 3x3 mean and loses a fixed amount per channel |
//! | Sense + steer | Agents read three sensors and turn by a fixed step |
//!
//! [`TickOrder`] swaps the last two phases.
//!
//! ## Presentation
//!
//! The loop hands the field to a [`Presenter`] after each tick and polls a
//! [`CancelSignal`] between ticks. [`run_windowed`] wires both to a winit
//! window with a wgpu renderer; headless runs use [`NullPresenter`] or a
//! closure.

pub mod agents;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod input;
pub mod sensing;
pub mod simulation;
pub mod steering;
pub mod time;
mod window;

pub use agents::AgentPool;
pub use config::{DepositMode, SensingMode, SimConfig, TickOrder, MAX_SPECIES};
pub use error::{ConfigError, GpuError, SimulationError};
pub use field::{FieldStats, TrailField};
pub use glam::{Vec2, Vec3};
pub use input::QuitSignal;
pub use sensing::{Sensor, SensorReadings};
pub use simulation::{CancelSignal, NullPresenter, Presenter, Simulation};
pub use steering::{steer, Turn};
pub use window::run_windowed;

/// Convenient re-exports for common usage.
///
/// ```
/// use physarum::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agents::AgentPool;
    pub use crate::config::{DepositMode, SensingMode, SimConfig, TickOrder};
    pub use crate::error::{ConfigError, SimulationError};
    pub use crate::field::{FieldStats, TrailField};
    pub use crate::input::QuitSignal;
    pub use crate::simulation::{CancelSignal, NullPresenter, Presenter, Simulation};
    pub use crate::time::TickTimer;
    pub use crate::window::run_windowed;
    pub use crate::{Vec2, Vec3};
}
