//! Scenario replay. One thread paces the records by arrival time and hands
//! them over a single-slot channel to the thread that talks to the scheduler.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, error, info};
use shared_resources::config::SimulationConfig;
use shared_resources::links::LinkSender;
use shared_resources::message::FloorRequest;
use shared_resources::message_channel::MessageChannel;
use shared_resources::Message;

use crate::floor::{Building, Passenger};
use crate::input::SimulationFloorInputData;

/// `None` marks the end of the scenario.
pub type RecordChannel = MessageChannel<Option<SimulationFloorInputData>>;

pub fn spawn_replay(
    records: Vec<SimulationFloorInputData>,
    simulation: &SimulationConfig,
    channel: Arc<RecordChannel>,
) -> io::Result<JoinHandle<()>> {
    let simulation = simulation.clone();
    thread::Builder::new()
        .name("floor-replay".to_string())
        .spawn(move || {
            let start = Instant::now();
            let first = records.first().map(|data| data.arrival_time).unwrap_or_default();

            for data in records {
                let due = simulation.scaled(data.arrival_time.saturating_sub(first));
                if let Some(wait) = due.checked_sub(start.elapsed()) {
                    thread::sleep(wait);
                }
                channel.put(Some(data));
            }
            channel.put(None);
            debug!("Scenario replay finished");
        })
}

pub fn spawn_request_sender(
    channel: Arc<RecordChannel>,
    building: Arc<Mutex<Building>>,
    scheduler: LinkSender,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("floor-requests".to_string())
        .spawn(move || {
            while let Some(data) = channel.get() {
                info!(
                    "Passenger at floor {} pressed {} for floor {}",
                    data.floor, data.direction, data.destination_floor
                );
                let registered = building
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .passenger_arrived(Passenger::from(&data));
                if let Err(e) = registered {
                    error!("Dropping passenger at floor {}: {}", data.floor, e);
                    continue;
                }

                let request = FloorRequest::new(data.floor, data.direction);
                if let Err(e) = scheduler.send(Message::FloorRequest(request)) {
                    error!("Floor request for floor {} not sent: {}", data.floor, e);
                }
            }
            debug!("All floor requests sent");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crossbeam_channel::unbounded;
    use shared_resources::links::Subsystem;
    use shared_resources::Direction;

    fn record(millis: u64, floor: u8, destination_floor: u8) -> SimulationFloorInputData {
        SimulationFloorInputData {
            arrival_time: Duration::from_millis(millis),
            floor,
            direction: Direction::towards(floor, destination_floor),
            destination_floor,
        }
    }

    #[test]
    fn replayed_records_become_waiting_passengers_and_requests() {
        let simulation = SimulationConfig {
            time_scale: 0.01,
            ..SimulationConfig::default()
        };
        let channel = Arc::new(RecordChannel::new());
        let building = Arc::new(Mutex::new(Building::new(5)));
        let (scheduler_tx, scheduler_rx) = unbounded();

        let replay = spawn_replay(
            vec![record(1000, 0, 3), record(1500, 4, 1)],
            &simulation,
            Arc::clone(&channel),
        )
        .expect("spawn replay");
        let sender = spawn_request_sender(
            channel,
            Arc::clone(&building),
            LinkSender::new(Subsystem::Floor, Subsystem::Scheduler, scheduler_tx),
        )
        .expect("spawn sender");

        replay.join().expect("replay thread");
        sender.join().expect("sender thread");

        let floors: Vec<(u8, Direction)> = scheduler_rx
            .try_iter()
            .map(|msg| match msg {
                Message::FloorRequest(request) => (request.floor, request.direction),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(floors, vec![(0, Direction::Up), (4, Direction::Down)]);
        assert_eq!(building.lock().expect("building").waiting_count(), 2);
    }

    #[test]
    fn empty_scenario_ends_the_sender() {
        let channel = Arc::new(RecordChannel::new());
        let (scheduler_tx, _scheduler_rx) = unbounded();
        let replay = spawn_replay(Vec::new(), &SimulationConfig::default(), Arc::clone(&channel))
            .expect("spawn replay");
        let sender = spawn_request_sender(
            channel,
            Arc::new(Mutex::new(Building::new(2))),
            LinkSender::new(Subsystem::Floor, Subsystem::Scheduler, scheduler_tx),
        )
        .expect("spawn sender");
        replay.join().expect("replay thread");
        sender.join().expect("sender thread");
    }
}
