use std::sync::Arc;

use log::{debug, trace, warn};
use shared_resources::error::HandlerError;
use shared_resources::work_queue::MessageHandler;
use shared_resources::Message;

use crate::dispatch::Dispatcher;

/// Drains the link from the elevator subsystem.
pub struct SchedulerElevatorWorkHandler {
    dispatcher: Arc<Dispatcher>,
}

impl SchedulerElevatorWorkHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        SchedulerElevatorWorkHandler { dispatcher }
    }
}

impl MessageHandler for SchedulerElevatorWorkHandler {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::ElevatorStatus(status) => self.dispatcher.handle_elevator_status(status),
            Message::DropOffRequest(request) => {
                debug!(
                    "Passenger in elevator {} going to floor {}",
                    request.elevator_id, request.destination_floor
                );
                self.dispatcher.handle_drop_off_request(request)
            }
            Message::FloorArrival(arrival) => {
                trace!(
                    "Elevator {} doors open at floor {}",
                    arrival.elevator_id,
                    arrival.floor_id
                );
                Ok(())
            }
            other => handle_control(other, "scheduler elevator handler"),
        }
    }
}

/// Drains the link from the floor subsystem.
pub struct SchedulerFloorWorkHandler {
    dispatcher: Arc<Dispatcher>,
}

impl SchedulerFloorWorkHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        SchedulerFloorWorkHandler { dispatcher }
    }
}

impl MessageHandler for SchedulerFloorWorkHandler {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::FloorRequest(request) => self.dispatcher.handle_floor_request(request),
            other => handle_control(other, "scheduler floor handler"),
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
