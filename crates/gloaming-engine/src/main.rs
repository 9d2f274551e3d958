//! # Gloaming
//!
//! Runs the day/night systems against a headless host and logs clock ticks and
//! overlay colors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gloaming_engine::{
    parse_commands, simulation, Command, GloamingConfig, SimulationOptions, CONFIG_FILE,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Headless day/night simulation.
#[derive(Debug, Parser)]
#[command(name = "gloaming", version, about)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Frames to simulate
    #[arg(long, default_value_t = 36_000)]
    frames: u64,

    /// Log the overlay every this many frames (0 = never)
    #[arg(long, default_value_t = 300)]
    log_every: u64,

    /// File of JSON commands, one per line, run before the first frame
    #[arg(long)]
    commands: Option<PathBuf>,

    /// Session directory, restored when it holds a save and written at exit
    #[arg(long)]
    session: Option<PathBuf>,
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("gloaming=info".parse()?))
        .init();

    let args = Args::parse();
    info!("Gloaming {}", env!("CARGO_PKG_VERSION"));

    let config = GloamingConfig::load_from(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let mut commands = vec![Command::Start];
    if let Some(path) = &args.commands {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        commands.extend(parse_commands(&text)?);
    }

    let options = SimulationOptions {
        frames: args.frames,
        log_every: args.log_every,
        commands,
        session: args.session,
    };
    let report = simulation::run(config, &options)?;

    info!(
        frames = report.frames,
        overlays = report.overlays,
        hours = report.hours_ticks,
        time = %report.final_label,
        color = report.final_color.as_deref().unwrap_or("none"),
        "Simulation complete"
    );
    Ok(())
}
