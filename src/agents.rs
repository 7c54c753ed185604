//! Agent state stored as parallel arrays.
//!
//! Each agent owns one slot in every array: position, heading, color and a
//! private RNG stream. Per-agent updates run as rayon parallel loops over
//! these arrays; no slot is ever touched by another agent's update.
//!
//! # Random streams
//!
//! Every agent's RNG is seeded from the master seed and its index, so a run
//! is reproducible for a given seed no matter how rayon splits the work.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::trace;

use crate::config::{DepositMode, SimConfig};
use crate::field::TrailField;
use crate::sensing::Sensor;
use crate::steering::steer;

/// Mix the master seed with an agent index (splitmix64 finalizer).
fn derive_seed(master: u64, index: u64) -> u64 {
    let mut z = master ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Wrap an angle into `[0, 2pi)`.
///
/// `rem_euclid` rounds tiny negative angles up to exactly `TAU`; those map to 0.
#[inline]
fn wrap_heading(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn random_heading(rng: &mut SmallRng) -> f32 {
    rng.gen_range(0.0..TAU)
}

/// Population of agents.
#[derive(Clone, Debug)]
pub struct AgentPool {
    positions: Vec<Vec2>,
    headings: Vec<f32>,
    colors: Vec<Vec3>,
    rngs: Vec<SmallRng>,
    /// Per-agent deposit target from the last move phase, reused every tick.
    pending: Vec<Option<usize>>,
    /// Master seed the RNG streams were derived from.
    seed: u64,
}

impl AgentPool {
    /// Scatter `config.agent_count` agents uniformly over the field.
    ///
    /// Headings are uniform in `[0, 2pi)`; colors come from
    /// [`SimConfig::species_color`] and are never randomized.
    pub fn initialize(config: &SimConfig, seed: u64) -> Self {
        let width = config.width as f32;
        let height = config.height as f32;
        let count = config.agent_count as usize;

        let mut rngs: Vec<SmallRng> = (0..count as u64)
            .map(|i| SmallRng::seed_from_u64(derive_seed(seed, i)))
            .collect();

        let (positions, headings): (Vec<Vec2>, Vec<f32>) = rngs
            .par_iter_mut()
            .map(|rng| {
                let heading = random_heading(rng);
                let position = Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
                (position, heading)
            })
            .unzip();

        let colors = (0..count).map(|i| config.species_color(i)).collect();

        Self {
            positions,
            headings,
            colors,
            rngs,
            pending: Vec::with_capacity(count),
            seed,
        }
    }

    /// Build a pool from explicit agent states.
    ///
    /// Each item is `(position, heading, color)`.
    pub fn from_agents<I>(agents: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = (Vec2, f32, Vec3)>,
    {
        let mut positions = Vec::new();
        let mut headings = Vec::new();
        let mut colors = Vec::new();
        for (position, heading, color) in agents {
            positions.push(position);
            headings.push(heading);
            colors.push(color);
        }
        let rngs = (0..positions.len() as u64)
            .map(|i| SmallRng::seed_from_u64(derive_seed(seed, i)))
            .collect();
        let pending = Vec::with_capacity(positions.len());

        Self {
            positions,
            headings,
            colors,
            rngs,
            pending,
            seed,
        }
    }

    /// Number of agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the pool has no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Master seed of the per-agent RNG streams.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    #[inline]
    pub fn headings(&self) -> &[f32] {
        &self.headings
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Advance every agent by `speed` along its heading and deposit.
    ///
    /// An agent whose step would leave the field stays put and is re-aimed
    /// at a uniformly random heading; it deposits nothing this tick.
    ///
    /// Moves are computed in parallel against a read-only view of the field.
    /// Deposits are then committed in ascending agent order, so when several
    /// agents land on one cell under [`DepositMode::Overwrite`] the highest
    /// index wins.
    ///
    /// Returns the number of deposits made.
    pub fn move_and_deposit(&mut self, field: &mut TrailField, speed: f32, mode: DepositMode) -> usize {
        let view: &TrailField = field;
        self.positions
            .par_iter_mut()
            .zip(self.headings.par_iter_mut())
            .zip(self.rngs.par_iter_mut())
            .map(|((position, heading), rng)| {
                if !heading.is_finite() {
                    *heading = random_heading(rng);
                }
                let candidate = *position + Vec2::from_angle(*heading) * speed;
                match view.cell_index(candidate) {
                    Some(idx) => {
                        *position = candidate;
                        Some(idx)
                    }
                    None => {
                        *heading = random_heading(rng);
                        None
                    }
                }
            })
            .collect_into_vec(&mut self.pending);

        let mut deposits = 0;
        for (idx, color) in self.pending.iter().zip(&self.colors) {
            if let Some(idx) = *idx {
                field.deposit_at(idx, *color, mode);
                deposits += 1;
            }
        }
        trace!(deposits, bounced = self.len() - deposits, "move phase");
        deposits
    }

    /// Sense the field and turn every agent.
    ///
    /// Headings are wrapped into `[0, 2pi)` afterwards.
    pub fn sense_and_steer(&mut self, field: &TrailField, sensor: &Sensor, rotation_step: f32) {
        self.positions
            .par_iter()
            .zip(self.headings.par_iter_mut())
            .zip(self.colors.par_iter())
            .zip(self.rngs.par_iter_mut())
            .for_each(|(((position, heading), color), rng)| {
                let readings = sensor.read_all(field, *position, *heading, *color);
                *heading = wrap_heading(*heading + steer(readings, rotation_step, rng));
            });
    }
}
