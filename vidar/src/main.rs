use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    miette::set_panic_hook();

    let args = Cli::parse();
    match args.action {
        Commands::Play(opts) => opts.play()?,
        Commands::Rat(opts) => opts.rat()?,
    }

    Ok(())
}
