//! Per-elevator job bookkeeping for the SCAN sweep.
//!
//! Jobs travelling the car's way are primary, jobs travelling the other way
//! are secondary and wait for the sweep to reverse.

use std::collections::VecDeque;

use log::{debug, trace};
use shared_resources::message::{ElevatorCommand, ElevatorFault};
use shared_resources::Direction;

use crate::job::Job;

#[derive(Debug, Clone)]
pub struct ElevatorJobManagement {
    elevator_id: usize,
    current_floor: u8,
    direction: Direction,
    primary_jobs: Vec<Job>,
    secondary_jobs: Vec<Job>,
    /// Commands sent but not yet acknowledged, oldest first. `STOP` is never
    /// acknowledged on its own and is not tracked.
    in_flight: VecDeque<ElevatorCommand>,
    error_state: Option<ElevatorFault>,
    resolving_error: bool,
}

impl ElevatorJobManagement {
    pub fn new(elevator_id: usize, current_floor: u8) -> Self {
        ElevatorJobManagement {
            elevator_id,
            current_floor,
            direction: Direction::Idle,
            primary_jobs: Vec::new(),
            secondary_jobs: Vec::new(),
            in_flight: VecDeque::new(),
            error_state: None,
            resolving_error: false,
        }
    }

    pub fn elevator_id(&self) -> usize {
        self.elevator_id
    }

    pub fn current_floor(&self) -> u8 {
        self.current_floor
    }

    pub fn set_current_floor(&mut self, floor: u8) {
        self.current_floor = floor;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn primary_jobs(&self) -> &[Job] {
        &self.primary_jobs
    }

    pub fn secondary_jobs(&self) -> &[Job] {
        &self.secondary_jobs
    }

    pub fn job_count(&self) -> usize {
        self.primary_jobs.len() + self.secondary_jobs.len()
    }

    pub fn error_state(&self) -> Option<ElevatorFault> {
        self.error_state
    }

    pub fn resolving_error(&self) -> bool {
        self.resolving_error
    }

    /// A fault report abandons whatever the car was doing.
    pub fn set_error_state(&mut self, error_state: Option<ElevatorFault>, resolving_error: bool) {
        if error_state.is_some() && !self.in_flight.is_empty() {
            debug!(
                "Elevator {} faulted, dropping {} in-flight command(s)",
                self.elevator_id,
                self.in_flight.len()
            );
            self.in_flight.clear();
        }
        self.error_state = error_state;
        self.resolving_error = resolving_error;
    }

    pub fn is_ready_for_job(&self) -> bool {
        self.error_state.is_none() && !self.resolving_error
    }

    pub fn is_running_job(&self) -> bool {
        self.has_primary_jobs() || self.has_secondary_jobs()
    }

    pub fn is_running_command(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn command_issued(&mut self, command: ElevatorCommand) {
        if command != ElevatorCommand::Stop {
            self.in_flight.push_back(command);
        }
    }

    /// The car finished the oldest outstanding command.
    pub fn command_acknowledged(&mut self) {
        if let Some(command) = self.in_flight.pop_front() {
            trace!("Elevator {} acknowledged {}", self.elevator_id, command);
        }
    }

    /// Floor the car will be at once every in-flight move has completed.
    pub fn committed_floor(&self) -> u8 {
        self.in_flight
            .iter()
            .fold(self.current_floor, |floor, command| match command {
                ElevatorCommand::MoveUp => floor.saturating_add(1),
                ElevatorCommand::MoveDown => floor.saturating_sub(1),
                _ => floor,
            })
    }

    /// Queue `job` as primary when it travels the car's way (or the car is
    /// idle) and as secondary otherwise. An idle car turns towards the job's
    /// floor. Returns `false` for duplicates.
    pub fn add_job(&mut self, job: Job) -> bool {
        if self.primary_jobs.contains(&job) || self.secondary_jobs.contains(&job) {
            trace!("Elevator {} already has {}", self.elevator_id, job);
            return false;
        }

        if self.direction == Direction::Idle {
            self.direction = match Direction::towards(self.committed_floor(), job.floor) {
                Direction::Idle if job.direction != Direction::Idle => job.direction,
                Direction::Idle => Direction::Up,
                towards => towards,
            };
            self.primary_jobs.push(job);
        } else if job.direction == self.direction {
            self.primary_jobs.push(job);
        } else {
            self.secondary_jobs.push(job);
        }
        debug!(
            "Elevator {} queued {}, heading {}",
            self.elevator_id, job, self.direction
        );
        true
    }

    /// Nearest primary floor at or above the current floor.
    pub fn smallest_destination_floor_in_elevator_direction(&self) -> Option<u8> {
        self.primary_jobs
            .iter()
            .map(|job| job.floor)
            .filter(|floor| *floor >= self.current_floor)
            .min()
    }

    /// Nearest primary floor at or below the current floor.
    pub fn largest_destination_floor_in_elevator_direction(&self) -> Option<u8> {
        self.primary_jobs
            .iter()
            .map(|job| job.floor)
            .filter(|floor| *floor <= self.current_floor)
            .max()
    }

    pub fn nearest_target_floor(&self) -> Option<u8> {
        match self.direction {
            Direction::Up => self.smallest_destination_floor_in_elevator_direction(),
            Direction::Down => self.largest_destination_floor_in_elevator_direction(),
            Direction::Idle => None,
        }
    }

    pub fn primary_jobs_at_floor(&self, floor: u8) -> Vec<Job> {
        self.primary_jobs
            .iter()
            .filter(|job| job.floor == floor)
            .copied()
            .collect()
    }

    /// Retire serviced jobs from the primary set. Jobs that are not queued
    /// are ignored.
    pub fn remove_jobs(&mut self, jobs: &[Job]) {
        self.primary_jobs
            .retain(|queued| !jobs.iter().any(|job| job.same_stop(queued)));
        if !self.is_running_job() {
            self.direction = Direction::Idle;
        }
    }

    pub fn has_primary_jobs(&self) -> bool {
        !self.primary_jobs.is_empty()
    }

    pub fn has_secondary_jobs(&self) -> bool {
        !self.secondary_jobs.is_empty()
    }

    /// Reverse the sweep: secondary jobs become primary.
    pub fn load_secondary_jobs(&mut self) {
        std::mem::swap(&mut self.primary_jobs, &mut self.secondary_jobs);
        self.direction = self.direction.opposite();
        debug!(
            "Elevator {} reversed to {} with {} job(s)",
            self.elevator_id,
            self.direction,
            self.primary_jobs.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobKind;

    fn in_exactly_one_set(jm: &ElevatorJobManagement, job: &Job) -> bool {
        jm.primary_jobs().contains(job) ^ jm.secondary_jobs().contains(job)
    }

    #[test]
    fn idle_elevator_heads_towards_first_job() {
        let mut jm = ElevatorJobManagement::new(0, 2);
        jm.add_job(Job::drop_off(0, Direction::Down));
        assert_eq!(jm.direction(), Direction::Down);
        assert_eq!(jm.primary_jobs(), &[Job::drop_off(0, Direction::Down)]);
    }

    #[test]
    fn job_at_current_floor_uses_passenger_direction() {
        let mut jm = ElevatorJobManagement::new(0, 2);
        jm.add_job(Job::pick_up(2, Direction::Down));
        assert_eq!(jm.direction(), Direction::Down);
        assert_eq!(jm.nearest_target_floor(), Some(2));
    }

    #[test]
    fn opposite_direction_pickup_is_deferred() {
        let mut jm = ElevatorJobManagement::new(0, 2);
        jm.add_job(Job::drop_off(5, Direction::Up));
        jm.add_job(Job::pick_up(4, Direction::Down));
        jm.add_job(Job::pick_up(3, Direction::Up));

        assert_eq!(jm.direction(), Direction::Up);
        assert_eq!(
            jm.primary_jobs(),
            &[Job::drop_off(5, Direction::Up), Job::pick_up(3, Direction::Up)]
        );
        assert_eq!(jm.secondary_jobs(), &[Job::pick_up(4, Direction::Down)]);
        assert_eq!(jm.nearest_target_floor(), Some(3));
    }

    #[test]
    fn same_direction_job_behind_the_car_has_no_target() {
        let mut jm = ElevatorJobManagement::new(0, 4);
        jm.add_job(Job::drop_off(5, Direction::Up));
        jm.add_job(Job::pick_up(1, Direction::Up));
        assert!(!jm.has_secondary_jobs());

        jm.set_current_floor(5);
        let serviced = jm.primary_jobs_at_floor(5);
        jm.remove_jobs(&serviced);
        assert!(jm.has_primary_jobs());
        assert_eq!(jm.nearest_target_floor(), None);
    }

    #[test]
    fn every_job_lands_in_exactly_one_set() {
        let mut jm = ElevatorJobManagement::new(0, 3);
        let jobs: Vec<Job> = [7, 0, 3, 5, 1, 6, 2, 4]
            .iter()
            .enumerate()
            .map(|(i, floor)| {
                if i % 2 == 0 {
                    Job::pick_up(*floor, Direction::Up)
                } else {
                    Job::drop_off(*floor, Direction::Down)
                }
            })
            .collect();

        for job in &jobs {
            jm.add_job(*job);
            jm.set_current_floor((jm.current_floor() + 1) % 8);
        }
        for job in &jobs {
            assert!(in_exactly_one_set(&jm, job), "{} misplaced", job);
        }
        assert_eq!(jm.job_count(), jobs.len());
    }

    #[test]
    fn duplicate_jobs_are_ignored() {
        let mut jm = ElevatorJobManagement::new(0, 0);
        assert!(jm.add_job(Job::pick_up(3, Direction::Up)));
        assert!(!jm.add_job(Job::pick_up(3, Direction::Up)));
        assert_eq!(jm.job_count(), 1);
    }

    #[test]
    fn upward_sweep_visits_floors_in_increasing_order() {
        let mut jm = ElevatorJobManagement::new(0, 0);
        for floor in [4, 1, 3, 2] {
            jm.add_job(Job::drop_off(floor, Direction::Up));
        }

        let mut visited = Vec::new();
        while let Some(target) = jm.nearest_target_floor() {
            jm.set_current_floor(target);
            let jobs = jm.primary_jobs_at_floor(target);
            jm.remove_jobs(&jobs);
            visited.push(target);
        }
        assert_eq!(visited, vec![1, 2, 3, 4]);
        assert_eq!(jm.direction(), Direction::Idle);
    }

    #[test]
    fn downward_sweep_visits_floors_in_decreasing_order() {
        let mut jm = ElevatorJobManagement::new(0, 6);
        for floor in [0, 5, 2] {
            jm.add_job(Job::drop_off(floor, Direction::Down));
        }

        let mut visited = Vec::new();
        while let Some(target) = jm.nearest_target_floor() {
            jm.set_current_floor(target);
            let jobs = jm.primary_jobs_at_floor(target);
            jm.remove_jobs(&jobs);
            visited.push(target);
        }
        assert_eq!(visited, vec![5, 2, 0]);
    }

    #[test]
    fn reversal_promotes_secondary_jobs() {
        let mut jm = ElevatorJobManagement::new(0, 2);
        jm.add_job(Job::drop_off(5, Direction::Up));
        jm.add_job(Job::pick_up(1, Direction::Down));
        assert_eq!(jm.secondary_jobs().len(), 1);

        jm.set_current_floor(5);
        let serviced = jm.primary_jobs_at_floor(5);
        jm.remove_jobs(&serviced);
        assert!(!jm.has_primary_jobs());
        assert!(jm.has_secondary_jobs());
        assert_eq!(jm.direction(), Direction::Up);

        jm.load_secondary_jobs();
        assert_eq!(jm.direction(), Direction::Down);
        assert_eq!(jm.nearest_target_floor(), Some(1));
        assert!(!jm.has_secondary_jobs());
    }

    #[test]
    fn retirement_is_idempotent() {
        let mut jm = ElevatorJobManagement::new(0, 0);
        jm.add_job(Job::drop_off(2, Direction::Up));
        jm.add_job(Job::drop_off(4, Direction::Up));

        jm.remove_jobs(&[Job::pick_up(3, Direction::Up)]);
        assert_eq!(jm.job_count(), 2);

        let done = [Job::drop_off(2, Direction::Up)];
        jm.remove_jobs(&done);
        jm.remove_jobs(&done);
        assert_eq!(jm.primary_jobs(), &[Job::drop_off(4, Direction::Up)]);
    }

    #[test]
    fn retirement_matches_floor_and_kind() {
        let mut jm = ElevatorJobManagement::new(0, 0);
        jm.add_job(Job::pick_up(2, Direction::Up));
        jm.add_job(Job::drop_off(2, Direction::Up));

        jm.remove_jobs(&[Job::pick_up(2, Direction::Down)]);
        assert_eq!(jm.primary_jobs().len(), 1);
        assert_eq!(jm.primary_jobs()[0].kind, JobKind::DropOff);
    }

    #[test]
    fn empty_elevator_is_idle_with_no_target() {
        let mut jm = ElevatorJobManagement::new(0, 3);
        jm.add_job(Job::drop_off(3, Direction::Up));
        let jobs = jm.primary_jobs_at_floor(3);
        jm.remove_jobs(&jobs);

        assert_eq!(jm.direction(), Direction::Idle);
        assert!(!jm.is_running_job());
        assert_eq!(jm.nearest_target_floor(), None);
    }

    #[test]
    fn idle_car_turns_from_where_in_flight_moves_leave_it() {
        let mut jm = ElevatorJobManagement::new(0, 3);
        jm.command_issued(ElevatorCommand::MoveUp);
        jm.command_issued(ElevatorCommand::MoveUp);
        assert_eq!(jm.committed_floor(), 5);

        jm.add_job(Job::pick_up(4, Direction::Up));
        assert_eq!(jm.direction(), Direction::Down);
        assert_eq!(jm.primary_jobs(), &[Job::pick_up(4, Direction::Up)]);
    }

    #[test]
    fn acknowledgements_drain_in_flight_commands() {
        let mut jm = ElevatorJobManagement::new(0, 0);
        jm.command_issued(ElevatorCommand::Stop);
        assert!(!jm.is_running_command());

        jm.command_issued(ElevatorCommand::OpenDoors);
        jm.command_issued(ElevatorCommand::MoveUp);
        jm.command_acknowledged();
        assert!(jm.is_running_command());
        jm.command_acknowledged();
        assert!(!jm.is_running_command());
        jm.command_acknowledged();
        assert!(!jm.is_running_command());
    }

    #[test]
    fn fault_excludes_elevator_and_abandons_commands() {
        let mut jm = ElevatorJobManagement::new(0, 0);
        jm.command_issued(ElevatorCommand::MoveUp);
        jm.set_error_state(Some(ElevatorFault::StuckAtFloor), true);
        assert!(!jm.is_ready_for_job());
        assert!(!jm.is_running_command());

        jm.set_error_state(None, false);
        assert!(jm.is_ready_for_job());
    }
}
