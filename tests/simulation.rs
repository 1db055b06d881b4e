use std::time::Duration;

use elevator_sim::Simulation;
use floor::input::parse_input;
use shared_resources::config::SimulationConfig;
use shared_resources::Message;

fn fast_building() -> SimulationConfig {
    SimulationConfig {
        num_floors: 5,
        num_elevators: 2,
        time_scale: 0.01,
        ..SimulationConfig::default()
    }
}

#[test]
fn every_passenger_is_delivered_and_the_scheduler_goes_idle() {
    let simulation = fast_building();
    let records = parse_input(
        "\
00:00:00.000 0 Up 3
00:00:00.500 4 Down 1
00:00:01.000 2 Up 4
00:00:01.000 3 Down 0
",
        simulation.num_floors,
    );
    assert_eq!(records.len(), 4);

    let run = Simulation::start(&simulation, records).expect("start");
    assert!(
        run.wait_until_finished(Duration::from_secs(30)),
        "delivered {}/{}",
        run.delivered_count(),
        run.expected_count()
    );
    assert_eq!(run.delivered_count(), 4);
    assert!(run.scheduler().is_idle());
}

#[test]
fn a_single_car_serves_requests_in_both_directions() {
    let simulation = SimulationConfig {
        num_elevators: 1,
        ..fast_building()
    };
    let records = parse_input(
        "\
00:00:00.000 2 Down 0
00:00:00.000 1 Up 4
",
        simulation.num_floors,
    );

    let run = Simulation::start(&simulation, records).expect("start");
    assert!(run.wait_until_finished(Duration::from_secs(30)));
    assert_eq!(run.delivered_count(), 2);
}

#[test]
fn status_feed_mirrors_car_positions() {
    let simulation = fast_building();
    let records = parse_input("00:00:00.000 0 Up 2\n", simulation.num_floors);

    let mut run = Simulation::start(&simulation, records).expect("start");
    let feed = run.take_status_feed().expect("status feed");
    assert!(run.take_status_feed().is_none());
    assert!(run.wait_until_finished(Duration::from_secs(30)));

    let floors: Vec<(usize, u8)> = feed
        .try_iter()
        .filter_map(|message| match message {
            Message::ElevatorStatus(status) => Some((status.elevator_id, status.floor_number)),
            _ => None,
        })
        .collect();
    assert!(floors.contains(&(0, 0)));
    assert!(floors.contains(&(1, 0)));
    assert!(floors.iter().any(|&(_, floor)| floor == 2));
}

#[test]
fn an_empty_scenario_finishes_immediately() {
    let run = Simulation::start(&fast_building(), Vec::new()).expect("start");
    assert!(run.wait_until_finished(Duration::from_secs(5)));
    assert_eq!(run.delivered_count(), 0);
}
