use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};

use crate::error::ConfigError;
use crate::links::Subsystem;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Receiving ports, one per directed link, named `<receiver>_from_<sender>`.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub scheduler_from_floor: u16,
    pub scheduler_from_elevator: u16,
    pub elevator_from_scheduler: u16,
    pub elevator_from_floor: u16,
    pub floor_from_scheduler: u16,
    pub floor_from_elevator: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            host: "127.0.0.1".to_string(),
            scheduler_from_floor: 20001,
            scheduler_from_elevator: 20002,
            elevator_from_scheduler: 20003,
            elevator_from_floor: 20004,
            floor_from_scheduler: 20005,
            floor_from_elevator: 20006,
        }
    }
}

impl NetworkConfig {
    /// Port `to` listens on for traffic sent by `from`.
    pub fn port(&self, from: Subsystem, to: Subsystem) -> Option<u16> {
        use Subsystem::*;

        match (to, from) {
            (Scheduler, Floor) => Some(self.scheduler_from_floor),
            (Scheduler, Elevator) => Some(self.scheduler_from_elevator),
            (Elevator, Scheduler) => Some(self.elevator_from_scheduler),
            (Elevator, Floor) => Some(self.elevator_from_floor),
            (Floor, Scheduler) => Some(self.floor_from_scheduler),
            (Floor, Elevator) => Some(self.floor_from_elevator),
            _ => None,
        }
    }

    fn ports(&self) -> [u16; 6] {
        [
            self.scheduler_from_floor,
            self.scheduler_from_elevator,
            self.elevator_from_scheduler,
            self.elevator_from_floor,
            self.floor_from_scheduler,
            self.floor_from_elevator,
        ]
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_floors: u8,
    pub num_elevators: usize,
    /// Metres between two adjacent floors.
    pub floor_to_floor_distance: f64,
    /// Metres per second.
    pub elevator_speed: f64,
    pub door_time_ms: u64,
    /// Multiplier applied to every simulated delay. 0.1 runs ten times faster.
    pub time_scale: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_floors: 5,
            num_elevators: 2,
            floor_to_floor_distance: 4.5,
            elevator_speed: 1.5,
            door_time_ms: 2000,
            time_scale: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn floor_travel_time(&self) -> Duration {
        self.scaled(Duration::from_secs_f64(
            self.floor_to_floor_distance / self.elevator_speed,
        ))
    }

    pub fn door_time(&self) -> Duration {
        self.scaled(Duration::from_millis(self.door_time_ms))
    }

    pub fn scaled(&self, d: Duration) -> Duration {
        d.mul_f64(self.time_scale)
    }

    pub fn top_floor(&self) -> u8 {
        self.num_floors.saturating_sub(1)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub simulation: SimulationConfig,
    pub input_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            network: NetworkConfig::default(),
            simulation: SimulationConfig::default(),
            input_file: "input.txt".to_string(),
        }
    }
}

impl Config {
    /// Read and validate the configuration at `path`. A missing file falls back
    /// to the built-in defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "No configuration file at {}, using default settings...",
                    path.display()
                );
                Config::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        config.validate()?;
        info!("Loaded configuration: {:?}", config.simulation);
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !sim.floor_to_floor_distance.is_finite() || sim.floor_to_floor_distance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "floor_to_floor_distance must be a positive number, got {}",
                sim.floor_to_floor_distance
            )));
        }
        if !sim.elevator_speed.is_finite() || sim.elevator_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "elevator_speed must be a positive number, got {}",
                sim.elevator_speed
            )));
        }
        if !sim.time_scale.is_finite() || sim.time_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be a positive number, got {}",
                sim.time_scale
            )));
        }
        if sim.num_floors < 2 {
            return Err(ConfigError::Invalid(format!(
                "a building needs at least two floors, got {}",
                sim.num_floors
            )));
        }
        if sim.num_elevators == 0 {
            return Err(ConfigError::Invalid("num_elevators must be at least 1".to_string()));
        }

        let mut ports = self.network.ports();
        ports.sort_unstable();
        if ports.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::Invalid(
                "every directed link needs its own port".to_string(),
            ));
        }
        Ok(())
    }
}
