mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{contact, inspect, render};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise each `-v` lowers the level one step from `warn`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Inspect(args) => inspect::run(&cli, args),
        Commands::Render(args) => render::run(&cli, args),
        Commands::Contact(args) => contact::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
