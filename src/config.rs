//! Startup configuration for a simulation run.
//!
//! Every parameter is fixed once the [`Simulation`](crate::Simulation) is
//! built. Changing behavior means starting a new run with a new config.
//!
//! # Example
//!
//! ```
//! use physarum::{SimConfig, SensingMode, TickOrder};
//!
//! let config = SimConfig::new()
//!     .with_agent_count(20_000)
//!     .with_size(400, 300)
//!     .with_sensing(SensingMode::Scalar)
//!     .with_tick_order(TickOrder::SenseThenDiffuse)
//!     .with_seed(7);
//!
//! assert!(config.validate().is_ok());
//! ```

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;

use crate::error::ConfigError;

/// Largest supported species count.
pub const MAX_SPECIES: u32 = 3;

/// Order of the sense and diffuse phases within a tick.
///
/// Agents always move first. The remaining two phases run in one of two
/// orders, which decides whether sensing sees this tick's raw deposits
/// or the previous tick's diffused field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TickOrder {
    /// `move -> diffuse/decay -> sense`. Sensing reads the freshly blurred field.
    #[default]
    DiffuseThenSense,
    /// `move -> sense -> diffuse/decay`. Sensing reads raw deposits on top of
    /// the previous tick's diffused field.
    SenseThenDiffuse,
}

/// How a sensor turns field samples into a desirability reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SensingMode {
    /// Dot product of the sample and the agent's color, both remapped from
    /// `[0, 1]` to `[-1, 1]`. Same-species trails attract, others repel.
    #[default]
    SpeciesWeighted,
    /// Plain trail intensity (mean of the three channels).
    Scalar,
}

/// How a deposit combines with the value already in its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DepositMode {
    /// Replace the cell. Multiple agents on one cell: the last write wins.
    #[default]
    Overwrite,
    /// Keep the per-channel maximum.
    Max,
    /// Add to the cell.
    Additive,
}

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Number of agents. Fixed for the lifetime of the run.
    pub agent_count: u32,
    /// Field width in cells.
    pub width: u32,
    /// Field height in cells.
    pub height: u32,
    /// Distance travelled per tick, in cells.
    pub agent_speed: f32,
    /// Heading change applied by a turn, in radians.
    pub rotation_step: f32,
    /// Angle between the forward sensor and each side sensor, in radians.
    pub sensor_angle: f32,
    /// Distance from the agent to each sensor center, in cells.
    pub sensor_distance: f32,
    /// Half-width of the square sensor window. `0` samples a single cell.
    pub sensor_half_width: u32,
    /// Amount subtracted from every channel per tick.
    pub decay_rate: f32,
    /// Blend factor toward the 3x3 neighborhood mean (0.0-1.0).
    pub diffuse_rate: f32,
    /// Master seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Phase order within a tick.
    pub tick_order: TickOrder,
    /// Sensor reading variant.
    pub sensing: SensingMode,
    /// Deposit combination policy.
    pub deposit: DepositMode,
    /// Number of species (1-3).
    pub species: u32,
}

impl SimConfig {
    /// Create a configuration with the default parameters.
    ///
    /// Defaults:
    /// - 100 000 agents on an 800x600 field
    /// - speed 1.0, rotation step and sensor angle pi/4
    /// - sensor distance 9.0, sensor half-width 0
    /// - decay 0.01, diffuse 0.1
    /// - one species, overwrite deposits, species-weighted sensing
    pub fn new() -> Self {
        Self {
            agent_count: 100_000,
            width: 800,
            height: 600,
            agent_speed: 1.0,
            rotation_step: FRAC_PI_4,
            sensor_angle: FRAC_PI_4,
            sensor_distance: 9.0,
            sensor_half_width: 0,
            decay_rate: 0.01,
            diffuse_rate: 0.1,
            seed: None,
            tick_order: TickOrder::default(),
            sensing: SensingMode::default(),
            deposit: DepositMode::default(),
            species: 1,
        }
    }

    /// Set the number of agents.
    pub fn with_agent_count(mut self, count: u32) -> Self {
        self.agent_count = count;
        self
    }

    /// Set the field size in cells.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the agent speed (cells per tick).
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.agent_speed = speed;
        self
    }

    /// Set the rotation step in radians.
    pub fn with_rotation_step(mut self, radians: f32) -> Self {
        self.rotation_step = radians;
        self
    }

    /// Set the sensor geometry: side-sensor angle, distance and half-width.
    pub fn with_sensor(mut self, angle: f32, distance: f32, half_width: u32) -> Self {
        self.sensor_angle = angle;
        self.sensor_distance = distance;
        self.sensor_half_width = half_width;
        self
    }

    /// Set the per-tick decay amount.
    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay_rate = decay;
        self
    }

    /// Set the diffusion blend factor.
    pub fn with_diffuse(mut self, diffuse: f32) -> Self {
        self.diffuse_rate = diffuse;
        self
    }

    /// Fix the master seed for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the phase order.
    pub fn with_tick_order(mut self, order: TickOrder) -> Self {
        self.tick_order = order;
        self
    }

    /// Set the sensing variant.
    pub fn with_sensing(mut self, mode: SensingMode) -> Self {
        self.sensing = mode;
        self
    }

    /// Set the deposit policy.
    pub fn with_deposit(mut self, mode: DepositMode) -> Self {
        self.deposit = mode;
        self
    }

    /// Set the number of species.
    pub fn with_species(mut self, species: u32) -> Self {
        self.species = species;
        self
    }

    /// Total number of field cells.
    pub fn total_cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Fixed color of the agent at `index`.
    ///
    /// A single species is white. With more species, agents cycle through
    /// red, green and blue by index.
    pub fn species_color(&self, index: usize) -> Vec3 {
        const PALETTE: [Vec3; MAX_SPECIES as usize] = [Vec3::X, Vec3::Y, Vec3::Z];
        if self.species <= 1 {
            Vec3::ONE
        } else {
            PALETTE[index % self.species.min(MAX_SPECIES) as usize]
        }
    }

    /// Check every startup invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 {
            return Err(ConfigError::NoAgents);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyField {
                width: self.width,
                height: self.height,
            });
        }

        for (name, value) in [
            ("rotation_step", self.rotation_step),
            ("sensor_angle", self.sensor_angle),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }

        for (name, value) in [
            ("agent_speed", self.agent_speed),
            ("sensor_distance", self.sensor_distance),
            ("decay_rate", self.decay_rate),
            ("diffuse_rate", self.diffuse_rate),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
            if value < 0.0 {
                return Err(ConfigError::Negative(name, value));
            }
        }

        if self.diffuse_rate > 1.0 {
            return Err(ConfigError::OutOfUnitRange("diffuse_rate", self.diffuse_rate));
        }
        if self.species == 0 || self.species > MAX_SPECIES {
            return Err(ConfigError::Species(self.species));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert_eq!(config.agent_count, 100_000);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.total_cells(), 480_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_population_and_field() {
        assert_eq!(
            SimConfig::new().with_agent_count(0).validate(),
            Err(ConfigError::NoAgents)
        );
        assert_eq!(
            SimConfig::new().with_size(0, 10).validate(),
            Err(ConfigError::EmptyField { width: 0, height: 10 })
        );
    }

    #[test]
    fn test_rejects_bad_rates() {
        assert!(matches!(
            SimConfig::new().with_diffuse(1.5).validate(),
            Err(ConfigError::OutOfUnitRange("diffuse_rate", _))
        ));
        assert!(matches!(
            SimConfig::new().with_decay(-0.1).validate(),
            Err(ConfigError::Negative("decay_rate", _))
        ));
        assert!(matches!(
            SimConfig::new().with_speed(f32::NAN).validate(),
            Err(ConfigError::NonFinite("agent_speed"))
        ));
        assert!(matches!(
            SimConfig::new().with_rotation_step(f32::INFINITY).validate(),
            Err(ConfigError::NonFinite("rotation_step"))
        ));
    }

    #[test]
    fn test_species_range() {
        assert!(SimConfig::new().with_species(3).validate().is_ok());
        assert_eq!(
            SimConfig::new().with_species(0).validate(),
            Err(ConfigError::Species(0))
        );
        assert_eq!(
            SimConfig::new().with_species(4).validate(),
            Err(ConfigError::Species(4))
        );
    }

    #[test]
    fn test_species_colors_are_fixed() {
        let single = SimConfig::new();
        assert_eq!(single.species_color(0), Vec3::ONE);
        assert_eq!(single.species_color(41), Vec3::ONE);

        let three = SimConfig::new().with_species(3);
        assert_eq!(three.species_color(0), Vec3::X);
        assert_eq!(three.species_color(1), Vec3::Y);
        assert_eq!(three.species_color(2), Vec3::Z);
        assert_eq!(three.species_color(3), Vec3::X);
    }
}
