pub mod floor;
pub mod handlers;
pub mod input;
pub mod replay;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;
use shared_resources::config::SimulationConfig;
use shared_resources::error::LinkError;
use shared_resources::links::{NodeLinks, Subsystem};
use shared_resources::work_queue::MessageWorkQueue;

use crate::floor::Building;
use crate::handlers::{FloorElevatorWorkHandler, FloorSchedulerWorkHandler};
use crate::input::SimulationFloorInputData;
use crate::replay::RecordChannel;

/// A running floor subsystem replaying one scenario.
pub struct FloorSubsystemNode {
    building: Arc<Mutex<Building>>,
    expected: usize,
    _elevator_queue: MessageWorkQueue,
    _scheduler_queue: MessageWorkQueue,
}

impl FloorSubsystemNode {
    pub fn start(
        simulation: &SimulationConfig,
        mut links: NodeLinks,
        records: Vec<SimulationFloorInputData>,
    ) -> Result<Self, LinkError> {
        let building = Arc::new(Mutex::new(Building::new(simulation.num_floors)));
        let expected = records.len();

        // INITIALIZE WORK QUEUE FOR ELEVATOR LINK
        let elevator_queue = MessageWorkQueue::spawn(
            "floor-elevator",
            FloorElevatorWorkHandler::new(
                Arc::clone(&building),
                links.sender_to(Subsystem::Elevator)?,
            ),
        )?;
        elevator_queue.listen(Subsystem::Elevator, links.take_inbound(Subsystem::Elevator)?)?;

        // INITIALIZE WORK QUEUE FOR SCHEDULER LINK
        let scheduler_queue = MessageWorkQueue::spawn(
            "floor-scheduler",
            FloorSchedulerWorkHandler::new(Arc::clone(&building)),
        )?;
        scheduler_queue.listen(Subsystem::Scheduler, links.take_inbound(Subsystem::Scheduler)?)?;

        // INITIALIZE SCENARIO REPLAY
        let channel = Arc::new(RecordChannel::new());
        replay::spawn_request_sender(
            Arc::clone(&channel),
            Arc::clone(&building),
            links.sender_to(Subsystem::Scheduler)?,
        )?;
        replay::spawn_replay(records, simulation, channel)?;

        info!(
            "Floor subsystem started with {} floors and {} passenger(s) to replay",
            simulation.num_floors, expected
        );
        Ok(FloorSubsystemNode {
            building,
            expected,
            _elevator_queue: elevator_queue,
            _scheduler_queue: scheduler_queue,
        })
    }

    fn building(&self) -> MutexGuard<'_, Building> {
        self.building.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn expected_count(&self) -> usize {
        self.expected
    }

    pub fn delivered_count(&self) -> usize {
        self.building().delivered_count()
    }

    pub fn waiting_count(&self) -> usize {
        self.building().waiting_count()
    }

    /// Every replayed passenger has reached their destination.
    pub fn is_finished(&self) -> bool {
        self.delivered_count() >= self.expected
    }
}
