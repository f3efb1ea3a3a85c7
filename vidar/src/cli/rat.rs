use clap::Parser;
use miette::Result;
use simulation::{Arena, SimulationConfig};
use tracing::info;
use vidar::rat::{self as controller, RatConfig, RatController};

use super::ConfigOpts;

/// Let a rat follow the walls of the simulated arena.
#[derive(Parser, Debug)]
#[clap(about = "Let a rat follow the walls of the simulated arena")]
pub struct Rat {
    #[clap(flatten)]
    pub config: ConfigOpts,
    /// Name of the rat profile in the rat config.
    #[clap(long, default_value = "rat0")]
    pub profile: String,
    /// Stop after this many control steps.
    #[clap(long)]
    pub steps: Option<u64>,
}

impl Rat {
    pub fn rat(self) -> Result<()> {
        let roots = self.config.roots();

        let config: RatConfig = roots.load()?;
        let simulation: SimulationConfig = roots.load()?;
        let mut controller = RatController::new(config.profile(&self.profile)?.clone())?;

        let mut arena = Arena::new(simulation.arena);
        let steps = controller::run(
            &mut arena,
            &mut controller,
            config.step,
            self.steps.or(config.max_steps),
        );

        info!(
            profile = %self.profile,
            steps,
            pose = ?arena.pose(),
            battery = arena.battery(),
            "rat run finished"
        );

        Ok(())
    }
}
