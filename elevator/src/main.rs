use std::path::PathBuf;
use std::thread;

use anyhow::Context;
use clap::Parser;
use shared_resources::config::{Config, DEFAULT_CONFIG_PATH};
use shared_resources::links::{NodeLinks, Subsystem};

use elevator::ElevatorSubsystemNode;

#[derive(Debug, Parser)]
#[command(about = "Elevator subsystem node of the elevator simulation")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // READ CONFIGURATION
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // INITIALIZE LINKS
    let links = NodeLinks::udp(Subsystem::Elevator, &config.network)
        .context("binding elevator links")?;

    let _node =
        ElevatorSubsystemNode::start(&config.simulation, links).context("starting elevator subsystem")?;

    loop {
        thread::park();
    }
}
