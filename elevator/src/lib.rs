pub mod car;
pub mod handlers;

use log::{info, warn};
use shared_resources::config::SimulationConfig;
use shared_resources::error::LinkError;
use shared_resources::links::{NodeLinks, Subsystem};
use shared_resources::work_queue::MessageWorkQueue;

use crate::car::ElevatorCar;
use crate::handlers::{ElevatorCommandRouter, ElevatorFloorWorkHandler};

/// A running elevator subsystem: every car has its own queue behind the
/// command router.
pub struct ElevatorSubsystemNode {
    _scheduler_queue: MessageWorkQueue,
    _floor_queue: MessageWorkQueue,
}

impl ElevatorSubsystemNode {
    pub fn start(simulation: &SimulationConfig, mut links: NodeLinks) -> Result<Self, LinkError> {
        let to_scheduler = links.sender_to(Subsystem::Scheduler)?;
        let to_floor = links.sender_to(Subsystem::Floor)?;

        // INITIALIZE CARS
        let mut cars = Vec::with_capacity(simulation.num_elevators);
        for id in 0..simulation.num_elevators {
            let car = ElevatorCar::new(id, simulation, to_scheduler.clone(), to_floor.clone());
            if let Err(e) = car.report_position() {
                warn!("Car {} could not report its position: {}", id, e);
            }
            cars.push(MessageWorkQueue::spawn(format!("car-{}", id), car)?);
        }

        // INITIALIZE WORK QUEUE FOR SCHEDULER LINK
        let scheduler_queue =
            MessageWorkQueue::spawn("elevator-scheduler", ElevatorCommandRouter::new(cars))?;
        scheduler_queue.listen(Subsystem::Scheduler, links.take_inbound(Subsystem::Scheduler)?)?;

        // INITIALIZE WORK QUEUE FOR FLOOR LINK
        let floor_queue =
            MessageWorkQueue::spawn("elevator-floor", ElevatorFloorWorkHandler::new(to_scheduler))?;
        floor_queue.listen(Subsystem::Floor, links.take_inbound(Subsystem::Floor)?)?;

        info!(
            "Elevator subsystem started with {} car(s)",
            simulation.num_elevators
        );
        Ok(ElevatorSubsystemNode {
            _scheduler_queue: scheduler_queue,
            _floor_queue: floor_queue,
        })
    }
}
