use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use shared_resources::error::HandlerError;
use shared_resources::links::LinkSender;
use shared_resources::message::{DropOffRequest, FloorCommand, MotorState};
use shared_resources::work_queue::MessageHandler;
use shared_resources::Message;

use crate::floor::Building;

fn lock(building: &Mutex<Building>) -> MutexGuard<'_, Building> {
    building.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drains the elevator link: arrivals, approach chimes and departures.
pub struct FloorElevatorWorkHandler {
    building: Arc<Mutex<Building>>,
    elevator: LinkSender,
}

impl FloorElevatorWorkHandler {
    pub fn new(building: Arc<Mutex<Building>>, elevator: LinkSender) -> Self {
        FloorElevatorWorkHandler { building, elevator }
    }
}

impl MessageHandler for FloorElevatorWorkHandler {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::FloorArrival(arrival) => {
                let boarded = lock(&self.building).elevator_arrived(arrival.elevator_id, arrival.floor_id)?;
                for passenger in boarded {
                    self.elevator.send(Message::DropOffRequest(DropOffRequest {
                        elevator_id: arrival.elevator_id,
                        destination_floor: passenger.destination,
                        direction: passenger.travel_direction(),
                    }))?;
                }
                Ok(())
            }
            Message::FloorSignalRequest(signal) => {
                if signal.is_final_destination {
                    info!(
                        "Floor {}: elevator {} stopping",
                        signal.floor_id, signal.elevator_id
                    );
                } else if signal.motor_state != MotorState::Idle {
                    debug!(
                        "Floor {}: elevator {} passing {:?}",
                        signal.floor_id, signal.elevator_id, signal.motor_state
                    );
                }
                Ok(())
            }
            Message::ElevatorLeavingFloor(leaving) => {
                lock(&self.building).elevator_left(leaving.elevator_id);
                Ok(())
            }
            other => handle_control(other, "floor elevator handler"),
        }
    }
}

/// Drains the scheduler link.
pub struct FloorSchedulerWorkHandler {
    building: Arc<Mutex<Building>>,
}

impl FloorSchedulerWorkHandler {
    pub fn new(building: Arc<Mutex<Building>>) -> Self {
        FloorSchedulerWorkHandler { building }
    }
}

impl MessageHandler for FloorSchedulerWorkHandler {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::FloorCommand(command) => match command.command {
                FloorCommand::TurnOffFloorLamp => {
                    debug!(
                        "Floor {}: {} lamp off",
                        command.floor_id, command.direction
                    );
                    lock(&self.building).turn_off_lamp(command.floor_id, command.direction)
                }
            },
            other => handle_control(other, "floor scheduler handler"),
        }
    }
}

fn handle_control(message: Message, handler: &'static str) -> Result<(), HandlerError> {
    match message {
        Message::Acknowledgement => Ok(()),
        Message::Test { payload } => {
            debug!("[{}] test message: {}", handler, payload);
            Ok(())
        }
        Message::CommunicationFailure { reason } => {
            warn!("[{}] peer reported communication failure: {}", handler, reason);
            Ok(())
        }
        other => Err(HandlerError::UnexpectedMessage {
            kind: other.kind(),
            handler,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crossbeam_channel::unbounded;
    use shared_resources::links::Subsystem;
    use shared_resources::message::{ElevatorLeavingFloor, FloorArrival};
    use shared_resources::Direction;

    use crate::floor::{FloorLamp, Passenger};

    fn building_with_passenger() -> Arc<Mutex<Building>> {
        let mut building = Building::new(5);
        building
            .passenger_arrived(Passenger {
                arrival_time: Duration::ZERO,
                origin: 2,
                button: Direction::Down,
                destination: 0,
            })
            .expect("arrive");
        Arc::new(Mutex::new(building))
    }

    #[test]
    fn doors_opening_boards_and_requests_drop_off() {
        let building = building_with_passenger();
        let (elevator_tx, elevator_rx) = unbounded();
        let mut handler = FloorElevatorWorkHandler::new(
            Arc::clone(&building),
            LinkSender::new(Subsystem::Floor, Subsystem::Elevator, elevator_tx),
        );

        handler
            .handle_message(Message::FloorArrival(FloorArrival {
                elevator_id: 1,
                floor_id: 2,
            }))
            .expect("arrival");

        assert_eq!(
            elevator_rx.try_recv().expect("drop-off request"),
            Message::DropOffRequest(DropOffRequest {
                elevator_id: 1,
                destination_floor: 0,
                direction: Direction::Down,
            })
        );
        assert_eq!(lock(&building).riding_count(), 1);

        handler
            .handle_message(Message::ElevatorLeavingFloor(ElevatorLeavingFloor { elevator_id: 1 }))
            .expect("leaving");
        assert_eq!(
            lock(&building).floor(2).expect("floor").elevators_present().count(),
            0
        );
    }

    #[test]
    fn lamp_off_command_darkens_the_lamp() {
        let building = building_with_passenger();
        let mut handler = FloorSchedulerWorkHandler::new(Arc::clone(&building));
        handler
            .handle_message(Message::turn_off_floor_lamp(2, Direction::Down))
            .expect("lamp off");
        let guard = lock(&building);
        let lamp = guard.floor(2).and_then(|floor| floor.lamp(Direction::Down));
        assert!(!lamp.is_some_and(FloorLamp::is_on));
    }

    #[test]
    fn scheduler_link_refuses_elevator_traffic() {
        let mut handler = FloorSchedulerWorkHandler::new(building_with_passenger());
        assert!(matches!(
            handler.handle_message(Message::FloorArrival(FloorArrival {
                elevator_id: 0,
                floor_id: 0
            })),
            Err(HandlerError::UnexpectedMessage { .. })
        ));
    }
}
