//! Single-process run of the elevator simulation: the scheduler, elevator and
//! floor subsystems wired together over in-process links.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use elevator::ElevatorSubsystemNode;
use floor::input::SimulationFloorInputData;
use floor::FloorSubsystemNode;
use log::info;
use scheduler::SchedulerNode;
use shared_resources::config::SimulationConfig;
use shared_resources::error::LinkError;
use shared_resources::links;
use shared_resources::Message;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct Simulation {
    scheduler: SchedulerNode,
    _elevator: ElevatorSubsystemNode,
    floor: FloorSubsystemNode,
    status_feed: Option<Receiver<Message>>,
}

impl Simulation {
    pub fn start(
        simulation: &SimulationConfig,
        records: Vec<SimulationFloorInputData>,
    ) -> Result<Self, LinkError> {
        let net = links::in_process();

        // Cars report their position on start, so the scheduler has to be listening first.
        let scheduler = SchedulerNode::start(simulation, net.scheduler)?;
        let elevator = ElevatorSubsystemNode::start(simulation, net.elevator)?;
        let floor = FloorSubsystemNode::start(simulation, net.floor, records)?;

        Ok(Simulation {
            scheduler,
            _elevator: elevator,
            floor,
            status_feed: Some(net.gui),
        })
    }

    /// The scheduler's mirror of every elevator status. Can be taken once.
    pub fn take_status_feed(&mut self) -> Option<Receiver<Message>> {
        self.status_feed.take()
    }

    pub fn scheduler(&self) -> &SchedulerNode {
        &self.scheduler
    }

    pub fn delivered_count(&self) -> usize {
        self.floor.delivered_count()
    }

    pub fn expected_count(&self) -> usize {
        self.floor.expected_count()
    }

    /// Everyone delivered and no car has work left.
    pub fn is_finished(&self) -> bool {
        self.floor.is_finished() && self.floor.waiting_count() == 0 && self.scheduler.is_idle()
    }

    /// Poll until the run is finished or `timeout` passes. Returns whether it finished.
    pub fn wait_until_finished(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.is_finished() {
                info!(
                    "Simulation finished: {}/{} passenger(s) delivered",
                    self.delivered_count(),
                    self.expected_count()
                );
                return true;
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.is_finished()
    }
}
