use clap::Parser;
use miette::Result;
use simulation::{SimulationConfig, SoccerField};
use tracing::info;
use vidar::{config::FieldPlayerConfig, control::FieldPlayer, motion::MotionLibrary};

use super::ConfigOpts;

/// Play soccer on the simulated field.
///
/// The field player runs until it scores, the simulated time limit is reached or the cycle limit
/// is hit.
#[derive(Parser, Debug)]
#[clap(about = "Play soccer on the simulated field")]
pub struct Play {
    #[clap(flatten)]
    pub config: ConfigOpts,
    /// Seed for the simulated camera noise, overrides the simulation config.
    #[clap(long)]
    pub seed: Option<u64>,
    /// Stop after this many decision cycles.
    #[clap(long)]
    pub max_cycles: Option<u64>,
}

impl Play {
    pub fn play(self) -> Result<()> {
        let roots = self.config.roots();

        let mut config: FieldPlayerConfig = roots.load()?;
        let library = MotionLibrary::new(roots.load()?)?;
        let mut simulation: SimulationConfig = roots.load()?;

        if let Some(seed) = self.seed {
            simulation.field.seed = seed;
        }
        if let Some(max_cycles) = self.max_cycles {
            config.control.max_cycles = Some(max_cycles);
        }

        let mut player = FieldPlayer::new(SoccerField::new(simulation.field), config, library)?;
        let summary = player.run();

        let field = player.nao();
        info!(
            goals = field.goals(),
            time = ?field.time(),
            cycles = summary.cycles,
            search_passes = summary.search_passes,
            actions = ?summary.actions,
            exit = ?summary.exit,
            "game over"
        );

        Ok(())
    }
}
