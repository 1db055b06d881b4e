use std::fmt;
use std::time::SystemTime;

use thiserror::Error;

use crate::direction::Direction;
use crate::links::Subsystem;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorCommand {
    MoveUp,
    MoveDown,
    Stop,
    OpenDoors,
}

impl fmt::Display for ElevatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElevatorCommand::MoveUp => "MOVE_UP",
            ElevatorCommand::MoveDown => "MOVE_DOWN",
            ElevatorCommand::Stop => "STOP",
            ElevatorCommand::OpenDoors => "OPEN_DOORS",
        };
        f.pad(s)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorCommand {
    TurnOffFloorLamp,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Up,
    Down,
    Idle,
}

impl From<Direction> for MotorState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MotorState::Up,
            Direction::Down => MotorState::Down,
            Direction::Idle => MotorState::Idle,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ElevatorFault {
    #[error("elevator stuck at floor")]
    StuckAtFloor,
    #[error("elevator doors stuck")]
    DoorStuck,
}

/// A passenger pressed a floor lamp button.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct FloorRequest {
    pub floor: u8,
    pub direction: Direction,
    pub timestamp: SystemTime,
}

impl FloorRequest {
    pub fn new(floor: u8, direction: Direction) -> Self {
        FloorRequest {
            floor,
            direction,
            timestamp: SystemTime::now(),
        }
    }
}

/// A boarded passenger pressed a car button.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct DropOffRequest {
    pub elevator_id: usize,
    pub destination_floor: u8,
    pub direction: Direction,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorStatus {
    pub elevator_id: usize,
    pub floor_number: u8,
    pub direction: Direction,
    pub error_state: Option<ElevatorFault>,
    pub resolving_error: bool,
    pub door_open: bool,
    /// Acknowledges one command and asks the scheduler for the next one.
    pub issue_next_command: bool,
    /// Only meant for the status monitor, the scheduler keeps its state.
    pub gui_only: bool,
    pub timestamp: SystemTime,
}

impl ElevatorStatus {
    pub fn new(elevator_id: usize, floor_number: u8, direction: Direction, door_open: bool) -> Self {
        ElevatorStatus {
            elevator_id,
            floor_number,
            direction,
            error_state: None,
            resolving_error: false,
            door_open,
            issue_next_command: true,
            gui_only: false,
            timestamp: SystemTime::now(),
        }
    }

    pub fn for_gui_only(mut self) -> Self {
        self.gui_only = true;
        self.issue_next_command = false;
        self
    }

    pub fn without_next_command(mut self) -> Self {
        self.issue_next_command = false;
        self
    }

    pub fn with_error(mut self, fault: ElevatorFault, resolving: bool) -> Self {
        self.error_state = Some(fault);
        self.resolving_error = resolving;
        self
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SchedulerElevatorCommand {
    pub command: ElevatorCommand,
    pub elevator_id: usize,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SchedulerFloorCommand {
    pub command: FloorCommand,
    pub floor_id: u8,
    pub direction: Direction,
}

/// Sent by a car once its doors are open at `floor_id`.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct FloorArrival {
    pub elevator_id: usize,
    pub floor_id: u8,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct FloorSignalRequest {
    pub elevator_id: usize,
    pub floor_id: u8,
    pub motor_state: MotorState,
    pub is_final_destination: bool,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorLeavingFloor {
    pub elevator_id: usize,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub enum Message {
    FloorRequest(FloorRequest),
    DropOffRequest(DropOffRequest),
    ElevatorStatus(ElevatorStatus),
    ElevatorCommand(SchedulerElevatorCommand),
    FloorCommand(SchedulerFloorCommand),
    FloorArrival(FloorArrival),
    FloorSignalRequest(FloorSignalRequest),
    ElevatorLeavingFloor(ElevatorLeavingFloor),
    Acknowledgement,
    CommunicationFailure { reason: String },
    Test { payload: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    FloorRequest,
    DropOffRequest,
    ElevatorStatus,
    ElevatorCommand,
    FloorCommand,
    FloorArrival,
    FloorSignalRequest,
    ElevatorLeavingFloor,
    Acknowledgement,
    CommunicationFailure,
    Test,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::FloorRequest => "FLOOR_REQUEST",
            MessageKind::DropOffRequest => "DROP_OFF_REQUEST",
            MessageKind::ElevatorStatus => "ELEVATOR_STATUS",
            MessageKind::ElevatorCommand => "ELEVATOR_COMMAND",
            MessageKind::FloorCommand => "FLOOR_COMMAND",
            MessageKind::FloorArrival => "FLOOR_ARRIVAL",
            MessageKind::FloorSignalRequest => "FLOOR_SIGNAL_REQUEST",
            MessageKind::ElevatorLeavingFloor => "ELEVATOR_LEAVING_FLOOR",
            MessageKind::Acknowledgement => "ACKNOWLEDGEMENT",
            MessageKind::CommunicationFailure => "COMMUNICATION_FAILURE",
            MessageKind::Test => "TEST",
        };
        f.pad(s)
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::FloorRequest(_) => MessageKind::FloorRequest,
            Message::DropOffRequest(_) => MessageKind::DropOffRequest,
            Message::ElevatorStatus(_) => MessageKind::ElevatorStatus,
            Message::ElevatorCommand(_) => MessageKind::ElevatorCommand,
            Message::FloorCommand(_) => MessageKind::FloorCommand,
            Message::FloorArrival(_) => MessageKind::FloorArrival,
            Message::FloorSignalRequest(_) => MessageKind::FloorSignalRequest,
            Message::ElevatorLeavingFloor(_) => MessageKind::ElevatorLeavingFloor,
            Message::Acknowledgement => MessageKind::Acknowledgement,
            Message::CommunicationFailure { .. } => MessageKind::CommunicationFailure,
            Message::Test { .. } => MessageKind::Test,
        }
    }

    pub fn elevator_command(elevator_id: usize, command: ElevatorCommand) -> Self {
        Message::ElevatorCommand(SchedulerElevatorCommand { command, elevator_id })
    }

    pub fn turn_off_floor_lamp(floor_id: u8, direction: Direction) -> Self {
        Message::FloorCommand(SchedulerFloorCommand {
            command: FloorCommand::TurnOffFloorLamp,
            floor_id,
            direction,
        })
    }
}

impl MessageKind {
    /// Whether a message of this kind may travel over the `from -> to` link.
    pub fn is_routable(self, from: Subsystem, to: Subsystem) -> bool {
        use Subsystem::*;

        match self {
            MessageKind::FloorRequest => (from, to) == (Floor, Scheduler),
            MessageKind::DropOffRequest => {
                matches!((from, to), (Floor, Elevator) | (Elevator, Scheduler))
            }
            MessageKind::ElevatorStatus => {
                matches!((from, to), (Elevator, Scheduler) | (Scheduler, Gui))
            }
            MessageKind::ElevatorCommand => (from, to) == (Scheduler, Elevator),
            MessageKind::FloorCommand => (from, to) == (Scheduler, Floor),
            MessageKind::FloorArrival => {
                matches!((from, to), (Elevator, Floor) | (Elevator, Scheduler))
            }
            MessageKind::FloorSignalRequest | MessageKind::ElevatorLeavingFloor => {
                (from, to) == (Elevator, Floor)
            }
            MessageKind::Acknowledgement
            | MessageKind::CommunicationFailure
            | MessageKind::Test => from != to,
        }
    }
}
