//! Physarum CLI - run a slime-mold trail simulation in a window or headless.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use physarum::{run_windowed, DepositMode, NullPresenter, SensingMode, SimConfig, Simulation, TickOrder};

#[derive(Parser)]
#[command(name = "physarum")]
#[command(author, version, about = "Physarum - slime-mold trail network simulation", long_about = None)]
struct Cli {
    /// Number of agents
    #[arg(short = 'n', long, default_value = "100000")]
    agents: u32,

    /// Field width in cells
    #[arg(long, default_value = "800")]
    width: u32,

    /// Field height in cells
    #[arg(long, default_value = "600")]
    height: u32,

    /// Distance moved per tick, in cells
    #[arg(long, default_value = "1.0")]
    speed: f32,

    /// Turn applied when steering, in degrees
    #[arg(long, default_value = "45")]
    rotation: f32,

    /// Angle between forward and side sensors, in degrees
    #[arg(long, default_value = "45")]
    sensor_angle: f32,

    /// Distance from agent to sensor centers, in cells
    #[arg(long, default_value = "9.0")]
    sensor_distance: f32,

    /// Half-width of the square sensor window (0 = single cell)
    #[arg(long, default_value = "0")]
    sensor_width: u32,

    /// Amount subtracted from each channel per tick
    #[arg(long, default_value = "0.01")]
    decay: f32,

    /// Blend factor toward the 3x3 neighborhood mean (0.0 - 1.0)
    #[arg(long, default_value = "0.1")]
    diffuse: f32,

    /// Number of species (1-3)
    #[arg(long, default_value = "1")]
    species: u32,

    /// Master seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Phase order within a tick
    #[arg(long, value_enum, default_value_t = OrderArg::DiffuseFirst)]
    order: OrderArg,

    /// How sensors score the field
    #[arg(long, value_enum, default_value_t = SensingArg::Species)]
    sensing: SensingArg,

    /// How deposits combine with the existing cell value
    #[arg(long, value_enum, default_value_t = DepositArg::Overwrite)]
    deposit: DepositArg,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(short, long, default_value = "1000")]
    ticks: u64,

    /// Log field statistics every N ticks (0 = never)
    #[arg(long, default_value = "100")]
    stats_every: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    /// move, diffuse/decay, sense
    DiffuseFirst,
    /// move, sense, diffuse/decay
    SenseFirst,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SensingArg {
    /// Attracted to own species, repelled by others
    Species,
    /// Attracted to any trail
    Scalar,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DepositArg {
    Overwrite,
    Max,
    Additive,
}

impl From<OrderArg> for TickOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::DiffuseFirst => TickOrder::DiffuseThenSense,
            OrderArg::SenseFirst => TickOrder::SenseThenDiffuse,
        }
    }
}

impl From<SensingArg> for SensingMode {
    fn from(arg: SensingArg) -> Self {
        match arg {
            SensingArg::Species => SensingMode::SpeciesWeighted,
            SensingArg::Scalar => SensingMode::Scalar,
        }
    }
}

impl From<DepositArg> for DepositMode {
    fn from(arg: DepositArg) -> Self {
        match arg {
            DepositArg::Overwrite => DepositMode::Overwrite,
            DepositArg::Max => DepositMode::Max,
            DepositArg::Additive => DepositMode::Additive,
        }
    }
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        let mut config = SimConfig::new()
            .with_agent_count(self.agents)
            .with_size(self.width, self.height)
            .with_speed(self.speed)
            .with_rotation_step(self.rotation.to_radians())
            .with_sensor(self.sensor_angle.to_radians(), self.sensor_distance, self.sensor_width)
            .with_decay(self.decay)
            .with_diffuse(self.diffuse)
            .with_species(self.species)
            .with_tick_order(self.order.into())
            .with_sensing(self.sensing.into())
            .with_deposit(self.deposit.into());
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let sim = Simulation::new(cli.sim_config())
        .context("invalid simulation parameters")?
        .with_stats_every(cli.stats_every);
    info!(seed = sim.seed(), "Starting simulation");

    if cli.headless {
        let mut sim = sim;
        sim.run_for(cli.ticks, &mut NullPresenter)?;
        let stats = sim.field().stats();
        info!(
            ticks = sim.tick(),
            mean = stats.mean,
            max = stats.max,
            lit_cells = stats.lit_cells,
            "Final field"
        );
    } else {
        run_windowed(sim).context("window run failed")?;
    }

    Ok(())
}
