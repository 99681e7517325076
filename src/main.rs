mod app;
mod canvas;
mod config;
mod host;
mod layout;
mod renderer;
mod time_utils;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::host::sim::SimHost;

#[derive(Parser, Debug)]
#[command(name = "timezones", version, about = "World clock watch face, run against a simulated screen")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write each composed frame to this PNG file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Draw the first frame and exit
    #[arg(long)]
    once: bool,

    /// Print the default config file and exit
    #[arg(long)]
    print_default_config: bool,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "timezones", &mut std::io::stdout());
        return Ok(());
    }
    if args.print_default_config {
        print!("{}", config::generate_default_config());
        return Ok(());
    }

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;

    let device_offset = config.device.utc_offset.unwrap_or_else(time_utils::local_utc_offset);
    log::info!(
        "Starting timezones: {} zones on {}x{}, device offset {:+} min",
        config.zone.len(),
        config.screen.width,
        config.screen.height,
        device_offset
    );

    let mut host = SimHost::new(config.screen.width, config.screen.height, args.output)?;
    let mut app = app::WorldClock::new(config, device_offset);
    let options = host::RunOptions { once: args.once, ..host::RunOptions::default() };
    host::run(&mut app, &mut host, &options)?;

    log::info!("Stopped");
    Ok(())
}
