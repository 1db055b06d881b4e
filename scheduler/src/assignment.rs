use shared_resources::Direction;

use crate::job_management::ElevatorJobManagement;

/// Cost of sending `jm` to pick up a passenger at `floor`.
///
/// Idle cars and cars already heading towards the floor pay the distance.
/// Anything else pays for a full sweep on top, plus its backlog.
pub fn pickup_cost(jm: &ElevatorJobManagement, floor: u8, num_floors: u8) -> usize {
    let from = jm.committed_floor();
    let distance = usize::from(from.abs_diff(floor));
    let heading_towards = match jm.direction() {
        Direction::Idle => true,
        Direction::Up => from <= floor,
        Direction::Down => from >= floor,
    };

    if heading_towards {
        distance
    } else {
        distance + 2 * usize::from(num_floors) + jm.job_count()
    }
}

/// Index of the elevator that should take a pickup at `floor`, or `None` when
/// there are no elevators at all. Faulted cars are only chosen when every car
/// is faulted, in which case the job waits with the least loaded one.
pub fn choose_elevator(elevators: &[ElevatorJobManagement], floor: u8, num_floors: u8) -> Option<usize> {
    let ready = elevators
        .iter()
        .enumerate()
        .filter(|(_, jm)| jm.is_ready_for_job())
        .min_by_key(|(i, jm)| (pickup_cost(jm, floor, num_floors), *i))
        .map(|(i, _)| i);

    ready.or_else(|| {
        elevators
            .iter()
            .enumerate()
            .min_by_key(|(i, jm)| (jm.job_count(), *i))
            .map(|(i, _)| i)
    })
}
