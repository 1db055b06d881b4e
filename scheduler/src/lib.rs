pub mod assignment;
pub mod dispatch;
pub mod handlers;
pub mod job;
pub mod job_management;
pub mod monitor;

use std::sync::Arc;

use log::info;
use shared_resources::config::SimulationConfig;
use shared_resources::error::LinkError;
use shared_resources::links::{NodeLinks, Subsystem};
use shared_resources::work_queue::MessageWorkQueue;

use crate::dispatch::Dispatcher;
use crate::handlers::{SchedulerElevatorWorkHandler, SchedulerFloorWorkHandler};

/// A running scheduler: one work queue per inbound link, both feeding the
/// same dispatcher.
pub struct SchedulerNode {
    dispatcher: Arc<Dispatcher>,
    _elevator_queue: MessageWorkQueue,
    _floor_queue: MessageWorkQueue,
}

impl SchedulerNode {
    pub fn start(simulation: &SimulationConfig, mut links: NodeLinks) -> Result<Self, LinkError> {
        let dispatcher = Arc::new(Dispatcher::new(
            simulation.num_elevators,
            simulation.num_floors,
            links.sender_to(Subsystem::Elevator)?,
            links.sender_to(Subsystem::Floor)?,
            links.sender_to(Subsystem::Gui).ok(),
        ));

        // INITIALIZE WORK QUEUE FOR ELEVATOR LINK
        let elevator_queue = MessageWorkQueue::spawn(
            "scheduler-elevator",
            SchedulerElevatorWorkHandler::new(Arc::clone(&dispatcher)),
        )?;
        elevator_queue.listen(Subsystem::Elevator, links.take_inbound(Subsystem::Elevator)?)?;

        // INITIALIZE WORK QUEUE FOR FLOOR LINK
        let floor_queue = MessageWorkQueue::spawn(
            "scheduler-floor",
            SchedulerFloorWorkHandler::new(Arc::clone(&dispatcher)),
        )?;
        floor_queue.listen(Subsystem::Floor, links.take_inbound(Subsystem::Floor)?)?;

        info!(
            "Scheduler started with {} elevator(s) over {} floors",
            simulation.num_elevators, simulation.num_floors
        );
        Ok(SchedulerNode {
            dispatcher,
            _elevator_queue: elevator_queue,
            _floor_queue: floor_queue,
        })
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }
}
