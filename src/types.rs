//! Shared identifiers and the traffic model used across the system.

use std::fmt;
use std::time::Duration;

/// Unique identifier for a car thread.
pub type CarId = usize;

/// Side of the construction zone a car is travelling from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

impl Direction {
    /// The direction traffic flows after a flip.
    pub fn opposite(self) -> Self {
        match self {
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
        }
    }

    /// Arrow label used in status lines.
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::LeftToRight => "LEFT->RIGHT",
            Direction::RightToLeft => "RIGHT->LEFT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arrow())
    }
}

/// Per-car parameters supplied by the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarSpec {
    /// Side the car starts from.
    pub initial_direction: Direction,
    /// Number of crossings before the car is done.
    pub crossings: u32,
    /// Pause after each crossing before heading back.
    pub time_between_trips: Duration,
}

impl CarSpec {
    pub fn new(initial_direction: Direction, crossings: u32, time_between_trips: Duration) -> Self {
        Self {
            initial_direction,
            crossings,
            time_between_trips,
        }
    }
}
