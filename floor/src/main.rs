use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use shared_resources::config::{Config, DEFAULT_CONFIG_PATH};
use shared_resources::links::{NodeLinks, Subsystem};

use floor::input::read_input_file;
use floor::FloorSubsystemNode;

#[derive(Debug, Parser)]
#[command(about = "Floor subsystem node of the elevator simulation")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scenario file, overrides `input_file` from the configuration.
    #[arg(long)]
    input: Option<PathBuf>,
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

    // INITIALIZE LINKS
    let links =
        NodeLinks::udp(Subsystem::Floor, &config.network).context("binding floor links")?;

    let node = FloorSubsystemNode::start(&config.simulation, links, records)
        .context("starting floor subsystem")?;

    let mut reported = false;
    loop {
        if !reported && node.is_finished() {
            info!("All {} passenger(s) delivered", node.expected_count());
            reported = true;
        }
        thread::sleep(Duration::from_millis(250));
    }
}
