//! Status sink: receives the scheduler's copy of every elevator status.

use std::collections::BTreeMap;
use std::io::{self, stdout, Stdout, Write};
use std::time::SystemTime;

use crossbeam_channel::Receiver;
use crossterm::{cursor, terminal, ExecutableCommand};
use log::{debug, info, warn};
use shared_resources::message::ElevatorStatus;
use shared_resources::Message;

const HEADER_LINES: u16 = 4;

pub fn main(status_rx: Receiver<Message>, render: bool) -> io::Result<()> {
    let mut stdout = stdout();
    let mut latest: BTreeMap<usize, ElevatorStatus> = BTreeMap::new();

    for message in status_rx.iter() {
        let status = match message {
            Message::ElevatorStatus(status) => status,
            other => {
                warn!("Status monitor ignoring {}", other.kind());
                continue;
            }
        };

        let changed_floor = latest
            .get(&status.elevator_id)
            .map_or(true, |previous| previous.floor_number != status.floor_number);
        if changed_floor {
            info!(
                "Elevator {} at floor {} heading {}",
                status.elevator_id, status.floor_number, status.direction
            );
        } else {
            debug!("{}", status_row(&status));
        }
        latest.insert(status.elevator_id, status);

        if render {
            print_status(&mut stdout, &latest)?;
        }
    }
    Ok(())
}

fn status_row(status: &ElevatorStatus) -> String {
    let age = SystemTime::now()
        .duration_since(status.timestamp)
        .unwrap_or_default()
        .as_millis();
    let fault = match status.error_state {
        Some(fault) if status.resolving_error => format!("{} (resolving)", fault),
        Some(fault) => fault.to_string(),
        None => "-".to_string(),
    };
    format!(
        "| {0:<10} | {1:<10} | {2:<10} | {3:<10} | {4:>8}ms | {5:<30} |",
        status.elevator_id,
        status.floor_number,
        status.direction,
        if status.door_open { "OPEN" } else { "CLOSED" },
        age,
        fault
    )
}

fn print_status(stdout: &mut Stdout, latest: &BTreeMap<usize, ElevatorStatus>) -> io::Result<()> {
    stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

    let separator = "+------------+------------+------------+------------+------------+--------------------------------+";
    writeln!(stdout, "{}", separator)?;
    writeln!(
        stdout,
        "| {0:<10} | {1:<10} | {2:<10} | {3:<10} | {4:<10} | {5:<30} |",
        "ELEVATOR", "FLOOR", "DIRECTION", "DOORS", "LAST SEEN", "FAULT"
    )?;
    writeln!(stdout, "{}", separator)?;
    for status in latest.values() {
        writeln!(stdout, "{}", status_row(status))?;
    }
    writeln!(stdout, "{}", separator)?;

    stdout.execute(cursor::MoveUp(HEADER_LINES + latest.len() as u16))?;
    Ok(())
}
