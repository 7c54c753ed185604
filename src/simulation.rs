//! Tick orchestration.
//!
//! A tick runs three phases with a full barrier between each:
//!
//! 1. agents move and deposit
//! 2. the field diffuses and decays
//! 3. agents sense and steer
//!
//! Phases 2 and 3 swap places under [`TickOrder::SenseThenDiffuse`]. The
//! loop never checks for cancellation inside a tick; a started tick always
//! completes.
//!
//! Presentation and input are collaborators behind the [`Presenter`] and
//! [`CancelSignal`] traits, so the same loop drives a window or a headless
//! run.

use tracing::{debug, info};

use crate::agents::AgentPool;
use crate::config::{SimConfig, TickOrder};
use crate::error::{ConfigError, SimulationError};
use crate::field::TrailField;
use crate::sensing::Sensor;
use crate::time::TickTimer;

/// Receives the field after every tick.
pub trait Presenter {
    /// Show one frame. The field is `width x height` colors in row-major order.
    fn present(&mut self, field: &TrailField) -> Result<(), SimulationError>;
}

/// Presenter that discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _field: &TrailField) -> Result<(), SimulationError> {
        Ok(())
    }
}

impl<F> Presenter for F
where
    F: FnMut(&TrailField) -> Result<(), SimulationError>,
{
    fn present(&mut self, field: &TrailField) -> Result<(), SimulationError> {
        self(field)
    }
}

/// Polled once between ticks; `true` stops the loop.
pub trait CancelSignal {
    fn cancel_requested(&mut self) -> bool;
}

impl<F> CancelSignal for F
where
    F: FnMut() -> bool,
{
    fn cancel_requested(&mut self) -> bool {
        self()
    }
}

/// A running Physarum simulation.
///
/// ```
/// use physarum::{SimConfig, Simulation};
///
/// let config = SimConfig::new().with_agent_count(1_000).with_size(64, 64).with_seed(1);
/// let mut sim = Simulation::new(config).unwrap();
/// for _ in 0..10 {
///     sim.step();
/// }
/// assert_eq!(sim.tick(), 10);
/// ```
pub struct Simulation {
    config: SimConfig,
    seed: u64,
    field: TrailField,
    agents: AgentPool,
    sensor: Sensor,
    tick: u64,
    stats_every: u64,
}

impl Simulation {
    /// Validate `config` and scatter a fresh population over an empty field.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let agents = AgentPool::initialize(&config, seed);
        let field = TrailField::new(config.width, config.height);
        Ok(Self::assemble(config, seed, field, agents))
    }

    /// Validate `config` and start from an explicit population.
    ///
    /// The config's agent count is replaced by the pool's size and its seed
    /// by the pool's. Every agent must start inside the field.
    pub fn with_agents(mut config: SimConfig, agents: AgentPool) -> Result<Self, ConfigError> {
        config.agent_count = u32::try_from(agents.len()).map_err(|_| ConfigError::TooManyAgents)?;
        config.validate()?;
        let field = TrailField::new(config.width, config.height);
        if let Some(index) = agents.positions().iter().position(|p| !field.contains(*p)) {
            return Err(ConfigError::AgentOutOfBounds(index));
        }
        let seed = agents.seed();
        config.seed = Some(seed);
        Ok(Self::assemble(config, seed, field, agents))
    }

    fn assemble(config: SimConfig, seed: u64, field: TrailField, agents: AgentPool) -> Self {
        info!(
            agents = agents.len(),
            width = config.width,
            height = config.height,
            seed,
            order = ?config.tick_order,
            sensing = ?config.sensing,
            deposit = ?config.deposit,
            "Simulation initialized"
        );
        Self {
            field,
            sensor: Sensor::from_config(&config),
            config,
            seed,
            agents,
            tick: 0,
            stats_every: 0,
        }
    }

    /// Log field statistics every `ticks` ticks while running.
    /// `0` disables it.
    pub fn with_stats_every(mut self, ticks: u64) -> Self {
        self.stats_every = ticks;
        self
    }

    /// Run one tick in the configured phase order.
    pub fn step(&mut self) {
        let deposits =
            self.agents
                .move_and_deposit(&mut self.field, self.config.agent_speed, self.config.deposit);

        match self.config.tick_order {
            TickOrder::DiffuseThenSense => {
                self.diffuse();
                self.sense();
            }
            TickOrder::SenseThenDiffuse => {
                self.sense();
                self.diffuse();
            }
        }

        self.tick += 1;
        debug!(tick = self.tick, deposits, "tick complete");
    }

    fn diffuse(&mut self) {
        self.field
            .diffuse_and_decay(self.config.diffuse_rate, self.config.decay_rate);
    }

    fn sense(&mut self) {
        self.agents
            .sense_and_steer(&self.field, &self.sensor, self.config.rotation_step);
    }

    /// Loop until `cancel` fires: check, step, present.
    ///
    /// Returns the number of ticks run by this call.
    pub fn run<P, C>(&mut self, presenter: &mut P, cancel: &mut C) -> Result<u64, SimulationError>
    where
        P: Presenter + ?Sized,
        C: CancelSignal + ?Sized,
    {
        let start = self.tick;
        let mut timer = TickTimer::new();
        while !cancel.cancel_requested() {
            self.advance(presenter, &mut timer)?;
        }
        let ran = self.tick - start;
        info!(ticks = ran, tps = timer.ticks_per_second(), "Simulation stopped");
        Ok(ran)
    }

    /// Run exactly `ticks` ticks, presenting each one.
    pub fn run_for<P>(&mut self, ticks: u64, presenter: &mut P) -> Result<(), SimulationError>
    where
        P: Presenter + ?Sized,
    {
        let mut timer = TickTimer::new();
        for _ in 0..ticks {
            self.advance(presenter, &mut timer)?;
        }
        info!(ticks, tps = timer.ticks_per_second(), "Run finished");
        Ok(())
    }

    fn advance<P>(&mut self, presenter: &mut P, timer: &mut TickTimer) -> Result<(), SimulationError>
    where
        P: Presenter + ?Sized,
    {
        self.step_timed(timer);
        presenter.present(&self.field)?;
        Ok(())
    }

    /// Run one tick, record it on `timer` and log stats when due.
    ///
    /// Returns `true` when the timer refreshed its rate.
    pub(crate) fn step_timed(&mut self, timer: &mut TickTimer) -> bool {
        self.step();
        let refreshed = timer.record();
        if self.stats_due() {
            self.log_stats(timer);
        }
        refreshed
    }

    fn stats_due(&self) -> bool {
        self.stats_every > 0 && self.tick % self.stats_every == 0
    }

    /// Log field statistics at `info`.
    pub fn log_stats(&self, timer: &TickTimer) {
        let stats = self.field.stats();
        info!(
            tick = self.tick,
            tps = timer.ticks_per_second(),
            mean = stats.mean,
            max = stats.max,
            lit_cells = stats.lit_cells,
            "field stats"
        );
    }

    /// Number of completed ticks.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The seed this run was started with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The trail field, as handed to the presenter.
    #[inline]
    pub fn field(&self) -> &TrailField {
        &self.field
    }

    /// Mutable access to the field, e.g. to seed a pattern before the first tick.
    #[inline]
    pub fn field_mut(&mut self) -> &mut TrailField {
        &mut self.field
    }

    #[inline]
    pub fn agents(&self) -> &AgentPool {
        &self.agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensingMode;
    use glam::{Vec2, Vec3};

    fn config() -> SimConfig {
        SimConfig::new().with_agent_count(200).with_size(32, 24).with_seed(42)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            Simulation::new(config().with_agent_count(0)),
            Err(ConfigError::NoAgents)
        ));
    }

    #[test]
    fn test_with_agents_rejects_out_of_bounds() {
        let pool = AgentPool::from_agents([(Vec2::new(40.0, 1.0), 0.0, Vec3::ONE)], 0);
        assert!(matches!(
            Simulation::with_agents(config(), pool),
            Err(ConfigError::AgentOutOfBounds(0))
        ));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Simulation::new(config()).unwrap();
        let mut b = Simulation::new(config()).unwrap();
        for _ in 0..25 {
            a.step();
            b.step();
        }
        assert_eq!(a.agents().positions(), b.agents().positions());
        assert_eq!(a.agents().headings(), b.agents().headings());
        assert_eq!(a.field().cells(), b.field().cells());
    }

    #[test]
    fn test_run_stops_on_cancel_between_ticks() {
        let mut sim = Simulation::new(config()).unwrap();
        let mut presented = 0;
        let mut presenter = |_: &TrailField| -> Result<(), SimulationError> {
            presented += 1;
            Ok(())
        };
        let mut polls = 0;
        let mut cancel = || {
            polls += 1;
            polls > 5
        };
        let ran = sim.run(&mut presenter, &mut cancel).unwrap();
        assert_eq!(ran, 5);
        assert_eq!(sim.tick(), 5);
        assert_eq!(presented, 5);
    }

    #[test]
    fn test_presenter_error_stops_run() {
        let mut sim = Simulation::new(config()).unwrap();
        let mut presenter =
            |_: &TrailField| -> Result<(), SimulationError> { Err(SimulationError::Present("gone".into())) };
        let result = sim.run_for(3, &mut presenter);
        assert!(matches!(result, Err(SimulationError::Present(_))));
        // The tick that failed to present still completed.
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn test_tick_orders_diverge() {
        let base = config().with_agent_count(400);
        let mut a = Simulation::new(base.clone().with_tick_order(TickOrder::DiffuseThenSense)).unwrap();
        let mut b = Simulation::new(base.with_tick_order(TickOrder::SenseThenDiffuse)).unwrap();
        for _ in 0..30 {
            a.step();
            b.step();
        }
        assert_ne!(a.agents().headings(), b.agents().headings());
    }

    /// One agent that, after its first move to (6, 5), has trail only under
    /// its right sensor. Full decay erases that trail before sensing under
    /// `DiffuseThenSense`; `SenseThenDiffuse` still sees it.
    fn single_agent_tick(order: TickOrder) -> f32 {
        let config = SimConfig::new()
            .with_size(20, 20)
            .with_decay(1.0)
            .with_diffuse(0.0)
            .with_sensing(SensingMode::Scalar)
            .with_sensor(std::f32::consts::FRAC_PI_4, 4.0, 0)
            .with_rotation_step(0.5)
            .with_tick_order(order);
        let pool = AgentPool::from_agents([(Vec2::new(5.0, 5.0), 0.0, Vec3::ONE)], 6);
        let mut sim = Simulation::with_agents(config, pool).unwrap();
        // Right sensor center from (6, 5): (8.83, 2.17), rounded to (9, 2).
        sim.field_mut().set(9, 2, Vec3::ONE);
        sim.step();
        assert_eq!(sim.agents().positions()[0], Vec2::new(6.0, 5.0));
        sim.agents().headings()[0]
    }

    #[test]
    fn test_diffuse_then_sense_reads_decayed_field() {
        assert_eq!(single_agent_tick(TickOrder::DiffuseThenSense), 0.0);
    }

    #[test]
    fn test_sense_then_diffuse_reads_raw_deposits() {
        let heading = single_agent_tick(TickOrder::SenseThenDiffuse);
        let expected = std::f32::consts::TAU - 0.5;
        assert!((heading - expected).abs() < 1e-6, "heading = {}", heading);
    }

    #[test]
    fn test_with_agents_reports_pool_seed() {
        let pool = AgentPool::from_agents([(Vec2::new(3.0, 3.0), 0.0, Vec3::ONE)], 1234);
        let sim = Simulation::with_agents(config(), pool).unwrap();
        assert_eq!(sim.seed(), 1234);
        assert_eq!(sim.config().seed, Some(1234));
    }

    #[test]
    fn test_step_timed_records_each_tick() {
        let mut sim = Simulation::new(config()).unwrap().with_stats_every(2);
        let mut timer = TickTimer::new();
        for _ in 0..4 {
            sim.step_timed(&mut timer);
        }
        assert_eq!(sim.tick(), 4);
        assert_eq!(timer.ticks(), 4);
    }
}
