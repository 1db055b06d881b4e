//! A simulated elevator car. Commands block the car's own worker for as long
//! as the motion or door cycle takes.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use shared_resources::config::SimulationConfig;
use shared_resources::error::HandlerError;
use shared_resources::links::LinkSender;
use shared_resources::message::{
    ElevatorCommand, ElevatorFault, ElevatorLeavingFloor, ElevatorStatus, FloorArrival,
    FloorSignalRequest, MotorState,
};
use shared_resources::work_queue::MessageHandler;
use shared_resources::{Direction, Message};

pub struct ElevatorCar {
    id: usize,
    floor: u8,
    motor: MotorState,
    door_open: bool,
    top_floor: u8,
    travel_time: Duration,
    door_time: Duration,
    scheduler: LinkSender,
    floor_link: LinkSender,
}

impl ElevatorCar {
    /// A car parked at the ground floor with its doors closed.
    pub fn new(
        id: usize,
        simulation: &SimulationConfig,
        scheduler: LinkSender,
        floor_link: LinkSender,
    ) -> Self {
        ElevatorCar {
            id,
            floor: 0,
            motor: MotorState::Idle,
            door_open: false,
            top_floor: simulation.top_floor(),
            travel_time: simulation.floor_travel_time(),
            door_time: simulation.door_time(),
            scheduler,
            floor_link,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn motor(&self) -> MotorState {
        self.motor
    }

    pub fn door_open(&self) -> bool {
        self.door_open
    }

    /// Let the status monitor know where the car is without touching dispatch.
    pub fn report_position(&self) -> Result<(), HandlerError> {
        self.send_status(self.status().for_gui_only())
    }

    pub fn execute(&mut self, command: ElevatorCommand) -> Result<(), HandlerError> {
        debug!("Car {} executing {} at floor {}", self.id, command, self.floor);
        match command {
            ElevatorCommand::MoveUp => self.move_one_floor(Direction::Up),
            ElevatorCommand::MoveDown => self.move_one_floor(Direction::Down),
            ElevatorCommand::Stop => self.stop(),
            ElevatorCommand::OpenDoors => self.open_doors(),
        }
    }

    fn move_one_floor(&mut self, direction: Direction) -> Result<(), HandlerError> {
        let next = match direction {
            Direction::Up if self.floor < self.top_floor => self.floor + 1,
            Direction::Down if self.floor > 0 => self.floor - 1,
            _ => return self.refuse_move(direction),
        };

        if self.door_open {
            warn!("Car {} moving with open doors, closing them first", self.id);
            self.door_open = false;
        }
        self.floor_link
            .send(Message::ElevatorLeavingFloor(ElevatorLeavingFloor { elevator_id: self.id }))?;
        self.motor = MotorState::from(direction);

        thread::sleep(self.travel_time);
        self.floor = next;

        self.floor_link
            .send(Message::FloorSignalRequest(FloorSignalRequest {
                elevator_id: self.id,
                floor_id: self.floor,
                motor_state: self.motor,
                is_final_destination: false,
            }))?;
        self.send_status(self.status())
    }

    /// A move past the end of the shaft is reported as a fault that resolves
    /// immediately, since the car never left its floor.
    fn refuse_move(&mut self, direction: Direction) -> Result<(), HandlerError> {
        warn!(
            "Car {} refused to move {} from floor {}",
            self.id, direction, self.floor
        );
        self.motor = MotorState::Idle;
        self.send_status(
            self.status()
                .with_error(ElevatorFault::StuckAtFloor, true)
                .without_next_command(),
        )?;
        self.send_status(self.status())
    }

    fn stop(&mut self) -> Result<(), HandlerError> {
        self.motor = MotorState::Idle;
        self.floor_link
            .send(Message::FloorSignalRequest(FloorSignalRequest {
                elevator_id: self.id,
                floor_id: self.floor,
                motor_state: self.motor,
                is_final_destination: true,
            }))?;
        self.send_status(self.status().without_next_command())
    }

    fn open_doors(&mut self) -> Result<(), HandlerError> {
        self.door_open = true;
        info!("Car {} doors open at floor {}", self.id, self.floor);
        self.floor_link.send(Message::FloorArrival(FloorArrival {
            elevator_id: self.id,
            floor_id: self.floor,
        }))?;
        self.send_status(self.status().for_gui_only())?;

        thread::sleep(self.door_time);
        self.door_open = false;
        self.send_status(self.status())
    }

    fn status(&self) -> ElevatorStatus {
        let direction = match self.motor {
            MotorState::Up => Direction::Up,
            MotorState::Down => Direction::Down,
            MotorState::Idle => Direction::Idle,
        };
        ElevatorStatus::new(self.id, self.floor, direction, self.door_open)
    }

    fn send_status(&self, status: ElevatorStatus) -> Result<(), HandlerError> {
        self.scheduler.send(Message::ElevatorStatus(status))?;
        Ok(())
    }
}

impl MessageHandler for ElevatorCar {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        match message {
            Message::ElevatorCommand(command) if command.elevator_id == self.id => {
                self.execute(command.command)
            }
            Message::ElevatorCommand(command) => Err(HandlerError::UnknownElevator(command.elevator_id)),
            other => Err(HandlerError::UnexpectedMessage {
                kind: other.kind(),
                handler: "elevator car",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};
    use shared_resources::links::Subsystem;

    struct Harness {
        car: ElevatorCar,
        scheduler_rx: Receiver<Message>,
        floor_rx: Receiver<Message>,
    }

    fn harness() -> Harness {
        let simulation = SimulationConfig {
            num_floors: 4,
            door_time_ms: 10,
            time_scale: 0.001,
            ..SimulationConfig::default()
        };
        let (scheduler_tx, scheduler_rx) = unbounded();
        let (floor_tx, floor_rx) = unbounded();
        let car = ElevatorCar::new(
            1,
            &simulation,
            LinkSender::new(Subsystem::Elevator, Subsystem::Scheduler, scheduler_tx),
            LinkSender::new(Subsystem::Elevator, Subsystem::Floor, floor_tx),
        );
        Harness {
            car,
            scheduler_rx,
            floor_rx,
        }
    }

    fn statuses(rx: &Receiver<Message>) -> Vec<ElevatorStatus> {
        rx.try_iter()
            .map(|msg| match msg {
                Message::ElevatorStatus(status) => status,
                other => panic!("unexpected message to scheduler: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn move_up_leaves_signals_and_reports() {
        let mut h = harness();
        h.car.execute(ElevatorCommand::MoveUp).expect("move");
        assert_eq!(h.car.floor(), 1);

        let to_floor: Vec<Message> = h.floor_rx.try_iter().collect();
        assert_eq!(
            to_floor,
            vec![
                Message::ElevatorLeavingFloor(ElevatorLeavingFloor { elevator_id: 1 }),
                Message::FloorSignalRequest(FloorSignalRequest {
                    elevator_id: 1,
                    floor_id: 1,
                    motor_state: MotorState::Up,
                    is_final_destination: false,
                }),
            ]
        );

        let reports = statuses(&h.scheduler_rx);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].floor_number, 1);
        assert_eq!(reports[0].direction, Direction::Up);
        assert!(reports[0].issue_next_command);
    }

    #[test]
    fn stop_and_open_cycle_the_doors() {
        let mut h = harness();
        h.car.execute(ElevatorCommand::Stop).expect("stop");
        h.car.execute(ElevatorCommand::OpenDoors).expect("open");
        assert!(!h.car.door_open());
        assert_eq!(h.car.motor(), MotorState::Idle);

        let to_floor: Vec<Message> = h.floor_rx.try_iter().collect();
        assert!(matches!(
            to_floor[0],
            Message::FloorSignalRequest(FloorSignalRequest {
                is_final_destination: true,
                ..
            })
        ));
        assert_eq!(
            to_floor[1],
            Message::FloorArrival(FloorArrival {
                elevator_id: 1,
                floor_id: 0
            })
        );

        let reports = statuses(&h.scheduler_rx);
        assert_eq!(reports.len(), 3);
        assert!(!reports[0].issue_next_command && !reports[0].gui_only);
        assert!(reports[1].gui_only && reports[1].door_open);
        assert!(reports[2].issue_next_command && !reports[2].door_open);
    }

    #[test]
    fn moving_below_ground_is_reported_as_a_fault() {
        let mut h = harness();
        h.car.execute(ElevatorCommand::MoveDown).expect("refused move still reports");
        assert_eq!(h.car.floor(), 0);
        assert!(h.floor_rx.try_iter().next().is_none());

        let reports = statuses(&h.scheduler_rx);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].error_state, Some(ElevatorFault::StuckAtFloor));
        assert!(!reports[0].issue_next_command);
        assert_eq!(reports[1].error_state, None);
        assert!(reports[1].issue_next_command);
    }

    #[test]
    fn commands_for_other_cars_are_rejected() {
        let mut h = harness();
        let err = h
            .car
            .handle_message(Message::elevator_command(0, ElevatorCommand::MoveUp))
            .expect_err("wrong car");
        assert!(matches!(err, HandlerError::UnknownElevator(0)));
        assert_eq!(h.car.floor(), 0);
    }
}
