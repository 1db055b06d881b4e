use log::{debug, warn};
use shared_resources::error::HandlerError;
use shared_resources::links::LinkSender;
use shared_resources::work_queue::{MessageHandler, MessageWorkQueue};
use shared_resources::Message;

/// Drains the scheduler link and hands each command to its car's queue, so a
/// car busy with a door cycle never holds up the others.
pub struct ElevatorCommandRouter {
    cars: Vec<MessageWorkQueue>,
}

impl ElevatorCommandRouter {
    pub fn new(cars: Vec<MessageWorkQueue>) -> Self {
        ElevatorCommandRouter { cars }
    }
}

impl MessageHandler for ElevatorCommandRouter {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::ElevatorCommand(command) => {
                let car = self
                    .cars
                    .get(command.elevator_id)
                    .ok_or(HandlerError::UnknownElevator(command.elevator_id))?;
                car.enqueue_message(Message::ElevatorCommand(command))?;
                Ok(())
            }
            other => handle_control(other, "elevator scheduler handler"),
        }
    }
}

/// Drains the floor link. Boarded passengers' destinations go on to the
/// scheduler.
pub struct ElevatorFloorWorkHandler {
    scheduler: LinkSender,
}

impl ElevatorFloorWorkHandler {
    pub fn new(scheduler: LinkSender) -> Self {
        ElevatorFloorWorkHandler { scheduler }
    }
}

impl MessageHandler for ElevatorFloorWorkHandler {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::DropOffRequest(request) => {
                debug!(
                    "Car {} button pressed for floor {}",
                    request.elevator_id, request.destination_floor
                );
                self.scheduler.send(Message::DropOffRequest(request))?;
                Ok(())
            }
            other => handle_control(other, "elevator floor handler"),
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
