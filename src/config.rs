//! Simulation parameters and the plain-text parameter file format.
//!
//! The file is a whitespace-separated list of non-negative integers:
//!
//! ```text
//! left_cars right_cars crossing_time flow_time capacity
//! crossing_count wait_time      (one pair per car, left cars first)
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;

use crate::error::ConfigError;
use crate::types::{CarSpec, Direction};

/// Unit for the times in a parameter file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TimeUnit {
    /// Microseconds.
    #[default]
    #[value(name = "us")]
    Micros,
    /// Milliseconds.
    #[value(name = "ms")]
    Millis,
}

impl TimeUnit {
    pub fn duration(self, value: u64) -> Duration {
        match self {
            TimeUnit::Micros => Duration::from_micros(value),
            TimeUnit::Millis => Duration::from_millis(value),
        }
    }
}

/// Everything the driver needs to build the flagger and the cars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Maximum cars inside the zone at once.
    pub capacity: usize,
    /// How long the flagger keeps one direction open.
    pub flow_duration: Duration,
    /// Transit time through the zone, the same for every car.
    pub time_to_cross: Duration,
    pub cars: Vec<CarSpec>,
}

impl SimulationConfig {
    pub fn new(capacity: usize, flow_duration: Duration, time_to_cross: Duration) -> Self {
        Self {
            capacity,
            flow_duration,
            time_to_cross,
            cars: Vec::new(),
        }
    }

    pub fn with_car(mut self, car: CarSpec) -> Self {
        self.cars.push(car);
        self
    }

    /// Reject configurations that could never run to completion.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.cars.is_empty() {
            return Err(ConfigError::NoCars);
        }
        if let Some(car) = self.cars.iter().position(|car| car.crossings == 0) {
            return Err(ConfigError::ZeroCrossings { car });
        }
        Ok(())
    }

    /// Total crossings the whole fleet will make.
    pub fn total_crossings(&self) -> u64 {
        self.cars.iter().map(|car| u64::from(car.crossings)).sum()
    }

    pub fn cars_from(&self, direction: Direction) -> usize {
        self.cars
            .iter()
            .filter(|car| car.initial_direction == direction)
            .count()
    }

    /// Read and validate a parameter file.
    pub fn load(path: &Path, unit: TimeUnit) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, unit)
    }

    /// Parse and validate parameter text.
    pub fn parse(text: &str, unit: TimeUnit) -> Result<Self, ConfigError> {
        let mut tokens = Tokens::new(text);
        let left_cars = tokens.next_usize("left_cars")?;
        let right_cars = tokens.next_usize("right_cars")?;
        let crossing_time = tokens.next_u64("crossing_time")?;
        let flow_time = tokens.next_u64("flow_time")?;
        let capacity = tokens.next_usize("capacity")?;

        let mut config = Self::new(capacity, unit.duration(flow_time), unit.duration(crossing_time));
        let sides = [
            (Direction::LeftToRight, left_cars),
            (Direction::RightToLeft, right_cars),
        ];
        for (direction, count) in sides {
            for _ in 0..count {
                let id = config.cars.len();
                let crossings = tokens.next_u32(&format!("car {id} crossing_count"))?;
                let wait = tokens.next_u64(&format!("car {id} wait_time"))?;
                config = config.with_car(CarSpec::new(direction, crossings, unit.duration(wait)));
            }
        }

        let extra = tokens.remaining();
        if extra > 0 {
            tracing::warn!(extra, "ignoring trailing values in parameter file");
        }
        config.validate()?;
        Ok(config)
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn next_raw(&mut self, field: &str) -> Result<&'a str, ConfigError> {
        self.inner.next().ok_or_else(|| ConfigError::MissingValue {
            field: field.to_string(),
        })
    }

    fn next_u64(&mut self, field: &str) -> Result<u64, ConfigError> {
        let raw = self.next_raw(field)?;
        raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    fn next_u32(&mut self, field: &str) -> Result<u32, ConfigError> {
        let raw = self.next_raw(field)?;
        raw.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    fn next_usize(&mut self, field: &str) -> Result<usize, ConfigError> {
        let raw = self.next_raw(field)?;
        raw.parse::<usize>().map_err(|_| ConfigError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    fn remaining(self) -> usize {
        self.inner.count()
    }
}
