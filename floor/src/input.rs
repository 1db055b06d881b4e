//! Scenario input: one passenger per line, `hh:mm:ss.mmm floor Up|Down destination`.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn};
use shared_resources::direction::ParseDirectionError;
use shared_resources::Direction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid arrival time '{0}'")]
    Time(String),
    #[error("invalid floor number '{0}'")]
    Floor(String),
    #[error(transparent)]
    Direction(#[from] ParseDirectionError),
    #[error("passenger must press Up or Down")]
    IdleButton,
    #[error("floor {floor} outside 0..{num_floors}")]
    FloorOutOfRange { floor: u8, num_floors: u8 },
    #[error("destination is the passenger's own floor {0}")]
    SameFloor(u8),
    #[error("pressed {button} at floor {floor} to reach floor {destination}")]
    ButtonMismatch {
        floor: u8,
        button: Direction,
        destination: u8,
    },
}

/// One scenario line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFloorInputData {
    /// Time of day the passenger shows up.
    pub arrival_time: Duration,
    pub floor: u8,
    pub direction: Direction,
    pub destination_floor: u8,
}

impl SimulationFloorInputData {
    pub fn validate(&self, num_floors: u8) -> Result<(), InputError> {
        for floor in [self.floor, self.destination_floor] {
            if floor >= num_floors {
                return Err(InputError::FloorOutOfRange { floor, num_floors });
            }
        }
        if self.floor == self.destination_floor {
            return Err(InputError::SameFloor(self.floor));
        }
        if Direction::towards(self.floor, self.destination_floor) != self.direction {
            return Err(InputError::ButtonMismatch {
                floor: self.floor,
                button: self.direction,
                destination: self.destination_floor,
            });
        }
        Ok(())
    }
}

impl FromStr for SimulationFloorInputData {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(InputError::FieldCount(fields.len()));
        }

        let direction: Direction = fields[2].parse()?;
        if direction == Direction::Idle {
            return Err(InputError::IdleButton);
        }

        Ok(SimulationFloorInputData {
            arrival_time: parse_arrival_time(fields[0])?,
            floor: parse_floor(fields[1])?,
            direction,
            destination_floor: parse_floor(fields[3])?,
        })
    }
}

fn parse_floor(s: &str) -> Result<u8, InputError> {
    s.parse().map_err(|_| InputError::Floor(s.to_string()))
}

/// `hh:mm:ss.mmm`, milliseconds optional.
pub fn parse_arrival_time(s: &str) -> Result<Duration, InputError> {
    let invalid = || InputError::Time(s.to_string());

    let mut parts = s.split(':');
    let (Some(hours), Some(minutes), Some(rest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let (seconds, millis) = match rest.split_once('.') {
        Some((seconds, millis)) if !millis.is_empty() && millis.len() <= 3 => {
            // "5" after the dot is half a second, not five milliseconds.
            let padded = format!("{:0<3}", millis);
            (seconds, padded.parse::<u64>().map_err(|_| invalid())?)
        }
        Some(_) => return Err(invalid()),
        None => (rest, 0),
    };

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    Ok(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}

/// Parse every line, skipping blank lines, `#` comments and anything
/// malformed. Records come back ordered by arrival time.
pub fn parse_input(contents: &str, num_floors: u8) -> Vec<SimulationFloorInputData> {
    let mut records: Vec<SimulationFloorInputData> = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .filter_map(|(index, line)| {
            match line
                .parse::<SimulationFloorInputData>()
                .and_then(|data| data.validate(num_floors).map(|_| data))
            {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!("Skipping input line {} '{}': {}", index + 1, line.trim(), e);
                    None
                }
            }
        })
        .collect();
    records.sort_by_key(|data| data.arrival_time);
    records
}

pub fn read_input_file(
    path: impl AsRef<Path>,
    num_floors: u8,
) -> Result<Vec<SimulationFloorInputData>, InputError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_input(&contents, num_floors);
    info!("Read {} passenger(s) from {}", records.len(), path.display());
    Ok(records)
}
