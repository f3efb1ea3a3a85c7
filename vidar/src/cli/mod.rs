use std::path::PathBuf;

use clap::Parser;

pub mod play;
pub mod rat;

/// `vidar` - Reactive controllers for simulated robots
///
/// Runs a controller against the kinematic simulation. All parameters are read from the config
/// root, per-robot overlays are merged over it when a robot name is given.
///
/// # Playing soccer
/// ```sh
/// vidar play --seed 3 --max-cycles 500
/// ```
///
/// # Running a rat
/// ```sh
/// vidar rat --profile rat1 --steps 2000
/// ```
#[derive(Parser)]
#[clap(name = "vidar", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub action: Commands,
}

/// All possible commands for the cli, used for clap derive macros.
#[derive(Parser)]
pub enum Commands {
    Play(play::Play),
    Rat(rat::Rat),
}

/// Options shared by all commands.
#[derive(Parser, Debug, Clone)]
pub struct ConfigOpts {
    /// Directory containing the config files.
    #[clap(long, default_value = "./config")]
    pub config: PathBuf,
    /// Name of the robot whose overlay is merged over the main config.
    #[clap(long)]
    pub robot: Option<String>,
}

impl ConfigOpts {
    pub fn roots(&self) -> vidar::config::ConfigRoots {
        vidar::config::ConfigRoots::new(&self.config, self.robot.as_deref())
    }
}
