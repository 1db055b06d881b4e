use std::path::PathBuf;
use std::thread;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::unbounded;
use log::error;
use shared_resources::config::{Config, DEFAULT_CONFIG_PATH};
use shared_resources::links::{NodeLinks, Subsystem};

use scheduler::{monitor, SchedulerNode};

#[derive(Debug, Parser)]
#[command(about = "Scheduler node of the elevator simulation")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Draw a live status table instead of only logging statuses.
    #[arg(long)]
    monitor: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // READ CONFIGURATION
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // INITIALIZE LINKS
    let mut links = NodeLinks::udp(Subsystem::Scheduler, &config.network)
        .context("binding scheduler links")?;
    let (gui_tx, gui_rx) = unbounded();
    links.add_outbound(Subsystem::Gui, gui_tx);

    // INITIALIZE STATUS MONITOR
    let render = args.monitor;
    thread::Builder::new()
        .name("monitor".to_string())
        .spawn(move || {
            if let Err(e) = monitor::main(gui_rx, render) {
                error!("Status monitor stopped: {}", e);
            }
        })?;

    let _node = SchedulerNode::start(&config.simulation, links).context("starting scheduler")?;

    loop {
        thread::park();
    }
}
