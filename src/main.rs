use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, warn};
use shared_resources::config::{Config, DEFAULT_CONFIG_PATH};

use elevator_sim::Simulation;
use floor::input::read_input_file;
use scheduler::monitor;

#[derive(Debug, Parser)]
#[command(about = "Runs the scheduler, elevator and floor subsystems in one process")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scenario file, overrides `input_file` from the configuration.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Draw a live status table instead of only logging statuses.
    #[arg(long)]
    monitor: bool,

    /// Give up after this many seconds of wall-clock time.
    #[arg(long, default_value_t = 300)]
    duration: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // READ CONFIGURATION
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let input = args
        .input
        .unwrap_or_else(|| PathBuf::from(&config.input_file));
    let records = read_input_file(&input, config.simulation.num_floors)
        .with_context(|| format!("reading scenario {}", input.display()))?;

    // INITIALIZE SUBSYSTEMS
    let mut simulation =
        Simulation::start(&config.simulation, records).context("starting simulation")?;

    // INITIALIZE STATUS MONITOR
    if let Some(status_rx) = simulation.take_status_feed() {
        let render = args.monitor;
        thread::Builder::new()
            .name("monitor".to_string())
            .spawn(move || {
                if let Err(e) = monitor::main(status_rx, render) {
                    error!("Status monitor stopped: {}", e);
                }
            })?;
    }

    if !simulation.wait_until_finished(Duration::from_secs(args.duration)) {
        warn!(
            "Stopped after {}s with {}/{} passenger(s) delivered",
            args.duration,
            simulation.delivered_count(),
            simulation.expected_count()
        );
        bail!("simulation did not finish in time");
    }
    Ok(())
}
