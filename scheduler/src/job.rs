use std::fmt;

use shared_resources::Direction;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    PickUp,
    DropOff,
}

/// A stop an elevator has to make. Jobs are compared on `(floor, kind)` when
/// they are retired.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Job {
    pub floor: u8,
    pub kind: JobKind,
    /// Where the passenger wants to go from `floor`.
    pub direction: Direction,
}

impl Job {
    pub fn pick_up(floor: u8, direction: Direction) -> Self {
        Job {
            floor,
            kind: JobKind::PickUp,
            direction,
        }
    }

    pub fn drop_off(floor: u8, direction: Direction) -> Self {
        Job {
            floor,
            kind: JobKind::DropOff,
            direction,
        }
    }

    pub fn is_pick_up(&self) -> bool {
        self.kind == JobKind::PickUp
    }

    pub fn same_stop(&self, other: &Job) -> bool {
        self.floor == other.floor && self.kind == other.kind
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            JobKind::PickUp => "pick up",
            JobKind::DropOff => "drop off",
        };
        write!(f, "{} at floor {} ({})", kind, self.floor, self.direction)
    }
}
