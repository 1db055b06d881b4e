//! The scheduler's dispatch engine.
//!
//! All elevator bookkeeping lives behind one lock, and commands are sent
//! while holding it, so the state a command was computed from is the state
//! the command is sent with.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use shared_resources::error::{HandlerError, LinkError};
use shared_resources::links::LinkSender;
use shared_resources::message::{DropOffRequest, ElevatorCommand, ElevatorStatus, FloorRequest};
use shared_resources::{Direction, Message};
use thiserror::Error;

use crate::assignment;
use crate::job::Job;
use crate::job_management::ElevatorJobManagement;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("elevator {elevator_id} has primary jobs but no target floor heading {direction}")]
    NoTargetFloor {
        elevator_id: usize,
        direction: Direction,
    },
    #[error("failed to send {what} for elevator {elevator_id}: {source}")]
    Send {
        elevator_id: usize,
        what: String,
        #[source]
        source: LinkError,
    },
}

pub struct Dispatcher {
    elevators: Mutex<Vec<ElevatorJobManagement>>,
    num_floors: u8,
    elevator_link: LinkSender,
    floor_link: LinkSender,
    gui_link: Option<LinkSender>,
}

impl Dispatcher {
    /// Every car starts idle at the ground floor.
    pub fn new(
        num_elevators: usize,
        num_floors: u8,
        elevator_link: LinkSender,
        floor_link: LinkSender,
        gui_link: Option<LinkSender>,
    ) -> Self {
        Dispatcher {
            elevators: Mutex::new(
                (0..num_elevators)
                    .map(|id| ElevatorJobManagement::new(id, 0))
                    .collect(),
            ),
            num_floors,
            elevator_link,
            floor_link,
            gui_link,
        }
    }

    pub fn num_floors(&self) -> u8 {
        self.num_floors
    }

    pub fn handle_elevator_status(&self, status: ElevatorStatus) -> Result<(), HandlerError> {
        let mut elevators = self.lock();

        if let Some(gui) = &self.gui_link {
            if let Err(e) = gui.send(Message::ElevatorStatus(status.clone())) {
                debug!("Status monitor unavailable: {}", e);
            }
        }
        if status.gui_only {
            return Ok(());
        }

        let jm = elevators
            .get_mut(status.elevator_id)
            .ok_or(HandlerError::UnknownElevator(status.elevator_id))?;
        jm.set_current_floor(status.floor_number);
        if let Some(fault) = status.error_state {
            warn!(
                "Elevator {} reported fault at floor {}: {} (resolving: {})",
                status.elevator_id, status.floor_number, fault, status.resolving_error
            );
        }
        jm.set_error_state(status.error_state, status.resolving_error);

        if !status.issue_next_command {
            return Ok(());
        }
        jm.command_acknowledged();
        if !jm.is_running_command() && jm.is_ready_for_job() && jm.is_running_job() {
            self.dispatch(jm);
        }
        Ok(())
    }

    pub fn handle_drop_off_request(&self, request: DropOffRequest) -> Result<(), HandlerError> {
        self.check_floor(request.destination_floor)?;
        let mut elevators = self.lock();
        let jm = elevators
            .get_mut(request.elevator_id)
            .ok_or(HandlerError::UnknownElevator(request.elevator_id))?;

        if !jm.is_running_job() {
            let towards = Direction::towards(jm.committed_floor(), request.destination_floor);
            jm.set_direction(match towards {
                Direction::Idle => request.direction,
                towards => towards,
            });
        }
        jm.add_job(Job::drop_off(request.destination_floor, request.direction));

        if jm.is_ready_for_job() && !jm.is_running_command() {
            self.dispatch(jm);
        }
        Ok(())
    }

    pub fn handle_floor_request(&self, request: FloorRequest) -> Result<(), HandlerError> {
        self.check_floor(request.floor)?;
        let mut elevators = self.lock();
        let index = assignment::choose_elevator(&elevators, request.floor, self.num_floors)
            .ok_or(HandlerError::NoElevators)?;
        let jm = &mut elevators[index];

        info!(
            "Floor {} ({}) assigned to elevator {}",
            request.floor,
            request.direction,
            jm.elevator_id()
        );
        jm.add_job(Job::pick_up(request.floor, request.direction));

        if jm.is_ready_for_job() && !jm.is_running_command() {
            self.dispatch(jm);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<ElevatorJobManagement> {
        self.lock().clone()
    }

    /// No jobs queued and no commands outstanding on any car.
    pub fn is_idle(&self) -> bool {
        self.lock()
            .iter()
            .all(|jm| !jm.is_running_job() && !jm.is_running_command())
    }

    fn dispatch(&self, jm: &mut ElevatorJobManagement) {
        if let Err(e) = self.execute_next_elevator_command(jm) {
            error!("Dispatch for elevator {} aborted: {}", jm.elevator_id(), e);
        }
    }

    /// Issue whatever the car should do next: one floor of motion towards the
    /// nearest target, or the arrival sequence when it is already there.
    /// After an arrival empties the sweep the car reverses at most once.
    pub fn execute_next_elevator_command(
        &self,
        jm: &mut ElevatorJobManagement,
    ) -> Result<(), DispatchError> {
        let mut reversed = false;
        if !jm.has_primary_jobs() && jm.has_secondary_jobs() {
            jm.load_secondary_jobs();
            reversed = true;
        }

        loop {
            let target = match jm.nearest_target_floor() {
                Some(target) => target,
                None if jm.has_primary_jobs() => {
                    return Err(DispatchError::NoTargetFloor {
                        elevator_id: jm.elevator_id(),
                        direction: jm.direction(),
                    })
                }
                None => return Ok(()),
            };

            let current = jm.current_floor();
            if current > target {
                return self.send_command(jm, ElevatorCommand::MoveDown);
            }
            if current < target {
                return self.send_command(jm, ElevatorCommand::MoveUp);
            }

            let serviced = jm.primary_jobs_at_floor(target);
            if serviced.iter().any(|job| job.is_pick_up()) {
                self.floor_link
                    .send(Message::turn_off_floor_lamp(target, jm.direction()))
                    .map_err(|source| DispatchError::Send {
                        elevator_id: jm.elevator_id(),
                        what: format!("lamp off at floor {}", target),
                        source,
                    })?;
            }
            self.send_command(jm, ElevatorCommand::Stop)?;
            self.send_command(jm, ElevatorCommand::OpenDoors)?;
            jm.remove_jobs(&serviced);
            info!(
                "Elevator {} serviced {} job(s) at floor {}",
                jm.elevator_id(),
                serviced.len(),
                target
            );

            if jm.has_primary_jobs() || !jm.has_secondary_jobs() || reversed {
                return Ok(());
            }
            jm.load_secondary_jobs();
            reversed = true;
        }
    }

    fn send_command(
        &self,
        jm: &mut ElevatorJobManagement,
        command: ElevatorCommand,
    ) -> Result<(), DispatchError> {
        self.elevator_link
            .send(Message::elevator_command(jm.elevator_id(), command))
            .map_err(|source| DispatchError::Send {
                elevator_id: jm.elevator_id(),
                what: command.to_string(),
                source,
            })?;
        jm.command_issued(command);
        debug!(
            "Elevator {} <- {} at floor {}",
            jm.elevator_id(),
            command,
            jm.current_floor()
        );
        Ok(())
    }

    fn check_floor(&self, floor: u8) -> Result<(), HandlerError> {
        if floor >= self.num_floors {
            return Err(HandlerError::FloorOutOfRange {
                floor,
                num_floors: self.num_floors,
            });
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ElevatorJobManagement>> {
        self.elevators.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
