//! Floor-side state: lamps, waiting passengers and who is riding which car.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use log::{debug, info};
use shared_resources::error::HandlerError;
use shared_resources::Direction;

use crate::input::SimulationFloorInputData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorLamp {
    direction: Direction,
    on: bool,
}

impl FloorLamp {
    fn new(direction: Direction) -> Self {
        FloorLamp {
            direction,
            on: false,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub arrival_time: Duration,
    pub origin: u8,
    pub button: Direction,
    pub destination: u8,
}

impl Passenger {
    /// Direction the passenger actually needs to travel.
    pub fn travel_direction(&self) -> Direction {
        Direction::towards(self.origin, self.destination)
    }
}

impl From<&SimulationFloorInputData> for Passenger {
    fn from(data: &SimulationFloorInputData) -> Self {
        Passenger {
            arrival_time: data.arrival_time,
            origin: data.floor,
            button: data.direction,
            destination: data.destination_floor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Floor {
    number: u8,
    up_lamp: FloorLamp,
    down_lamp: FloorLamp,
    elevators_present: BTreeSet<usize>,
    waiting: Vec<Passenger>,
}

impl Floor {
    pub fn new(number: u8) -> Self {
        Floor {
            number,
            up_lamp: FloorLamp::new(Direction::Up),
            down_lamp: FloorLamp::new(Direction::Down),
            elevators_present: BTreeSet::new(),
            waiting: Vec::new(),
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn lamp(&self, direction: Direction) -> Option<&FloorLamp> {
        match direction {
            Direction::Up => Some(&self.up_lamp),
            Direction::Down => Some(&self.down_lamp),
            Direction::Idle => None,
        }
    }

    fn lamp_mut(&mut self, direction: Direction) -> Option<&mut FloorLamp> {
        match direction {
            Direction::Up => Some(&mut self.up_lamp),
            Direction::Down => Some(&mut self.down_lamp),
            Direction::Idle => None,
        }
    }

    pub fn press_floor_button(&mut self, direction: Direction) {
        if let Some(lamp) = self.lamp_mut(direction) {
            lamp.on = true;
        }
    }

    pub fn turn_off_lamp(&mut self, direction: Direction) {
        if let Some(lamp) = self.lamp_mut(direction) {
            lamp.on = false;
        }
    }

    pub fn waiting(&self) -> &[Passenger] {
        &self.waiting
    }

    pub fn elevators_present(&self) -> impl Iterator<Item = usize> + '_ {
        self.elevators_present.iter().copied()
    }

    /// Everyone waiting gets on. Both lamps go dark since nobody is left.
    fn board_all(&mut self) -> Vec<Passenger> {
        self.turn_off_lamp(Direction::Up);
        self.turn_off_lamp(Direction::Down);
        std::mem::take(&mut self.waiting)
    }

    pub fn status_line(&self) -> String {
        format!(
            "Floor {}: up lamp {}, down lamp {}, {} waiting, elevators {:?}",
            self.number,
            if self.up_lamp.on { "ON" } else { "off" },
            if self.down_lamp.on { "ON" } else { "off" },
            self.waiting.len(),
            self.elevators_present
        )
    }
}

pub struct Building {
    floors: Vec<Floor>,
    riders: HashMap<usize, Vec<Passenger>>,
    delivered: usize,
}

impl Building {
    pub fn new(num_floors: u8) -> Self {
        Building {
            floors: (0..num_floors).map(Floor::new).collect(),
            riders: HashMap::new(),
            delivered: 0,
        }
    }

    pub fn floor(&self, number: u8) -> Option<&Floor> {
        self.floors.get(usize::from(number))
    }

    fn floor_mut(&mut self, number: u8) -> Result<&mut Floor, HandlerError> {
        let num_floors = self.floors.len() as u8;
        self.floors
            .get_mut(usize::from(number))
            .ok_or(HandlerError::FloorOutOfRange {
                floor: number,
                num_floors,
            })
    }

    /// A passenger walks up and presses the lamp button.
    pub fn passenger_arrived(&mut self, passenger: Passenger) -> Result<(), HandlerError> {
        let floor = self.floor_mut(passenger.origin)?;
        floor.press_floor_button(passenger.button);
        floor.waiting.push(passenger);
        debug!("{}", floor.status_line());
        Ok(())
    }

    /// Doors of `elevator_id` opened at `floor`: riders bound here get off,
    /// everyone waiting gets on. Returns the passengers who boarded.
    pub fn elevator_arrived(
        &mut self,
        elevator_id: usize,
        floor: u8,
    ) -> Result<Vec<Passenger>, HandlerError> {
        let boarded = {
            let at = self.floor_mut(floor)?;
            at.elevators_present.insert(elevator_id);
            at.board_all()
        };

        let riders = self.riders.entry(elevator_id).or_default();
        let before = riders.len();
        riders.retain(|rider| rider.destination != floor);
        let alighted = before - riders.len();
        riders.extend(boarded.iter().cloned());
        self.delivered += alighted;

        if alighted > 0 || !boarded.is_empty() {
            info!(
                "Elevator {} at floor {}: {} off, {} on ({} delivered so far)",
                elevator_id,
                floor,
                alighted,
                boarded.len(),
                self.delivered
            );
        }
        Ok(boarded)
    }

    pub fn elevator_left(&mut self, elevator_id: usize) {
        for floor in &mut self.floors {
            floor.elevators_present.remove(&elevator_id);
        }
    }

    pub fn turn_off_lamp(&mut self, floor: u8, direction: Direction) -> Result<(), HandlerError> {
        self.floor_mut(floor)?.turn_off_lamp(direction);
        Ok(())
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered
    }

    pub fn waiting_count(&self) -> usize {
        self.floors.iter().map(|floor| floor.waiting.len()).sum()
    }

    pub fn riding_count(&self) -> usize {
        self.riders.values().map(Vec::len).sum()
    }
}
