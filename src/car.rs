//! Car worker: crosses the zone back and forth until its quota is spent.

use std::thread;
use std::time::Duration;

use crate::types::{CarId, CarSpec, Direction};
use crate::zone::ConstructionZone;

/// Where a car is in its trip loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarPhase {
    WaitingForDirection,
    Crossing,
    Cooldown,
    Done,
}

/// One vehicle. Its trip state is owned by its own thread.
#[derive(Clone, Debug)]
pub struct Car {
    id: CarId,
    direction: Direction,
    remaining: u32,
    time_to_cross: Duration,
    time_between_trips: Duration,
}

impl Car {
    pub fn new(id: CarId, spec: &CarSpec, time_to_cross: Duration) -> Self {
        debug_assert!(spec.crossings > 0, "crossings must be > 0");
        Self {
            id,
            direction: spec.initial_direction,
            remaining: spec.crossings,
            time_to_cross,
            time_between_trips: spec.time_between_trips,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one phase and return the next one.
    pub fn step(&mut self, phase: CarPhase, zone: &ConstructionZone) -> CarPhase {
        match phase {
            CarPhase::WaitingForDirection => {
                tracing::trace!(car = self.id, direction = %self.direction, "waiting for clearance");
                zone.enter(self.id, self.direction, self.remaining - 1);
                CarPhase::Crossing
            }
            CarPhase::Crossing => {
                thread::sleep(self.time_to_cross);
                self.remaining -= 1;
                let finished = self.remaining == 0;
                zone.exit(self.id, self.direction, finished);
                if finished {
                    CarPhase::Done
                } else {
                    CarPhase::Cooldown
                }
            }
            CarPhase::Cooldown => {
                thread::sleep(self.time_between_trips);
                self.direction = self.direction.opposite();
                CarPhase::WaitingForDirection
            }
            CarPhase::Done => CarPhase::Done,
        }
    }

    /// Run every crossing to completion. Returns the number of crossings made.
    pub fn run(mut self, zone: &ConstructionZone) -> u32 {
        let mut crossings = 0;
        let mut phase = CarPhase::WaitingForDirection;
        while phase != CarPhase::Done {
            let next = self.step(phase, zone);
            if phase == CarPhase::Crossing {
                crossings += 1;
            }
            phase = next;
        }
        tracing::debug!(car = self.id, crossings, "car done");
        crossings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, EventSink, ZoneEvent};
    use std::sync::Arc;

    fn spec(crossings: u32) -> CarSpec {
        CarSpec::new(Direction::LeftToRight, crossings, Duration::ZERO)
    }

    #[test]
    fn phases_follow_trip_loop() {
        let zone = ConstructionZone::new(1, 1, Arc::new(crate::events::NullSink));
        let mut car = Car::new(0, &spec(2), Duration::ZERO);

        zone.open(Direction::LeftToRight);
        let phase = car.step(CarPhase::WaitingForDirection, &zone);
        assert_eq!(phase, CarPhase::Crossing);
        let phase = car.step(phase, &zone);
        assert_eq!(phase, CarPhase::Cooldown);
        assert_eq!(car.remaining(), 1);
        let phase = car.step(phase, &zone);
        assert_eq!(phase, CarPhase::WaitingForDirection);
        assert_eq!(car.direction(), Direction::RightToLeft);

        zone.close();
        zone.open(Direction::RightToLeft);
        let phase = car.step(phase, &zone);
        let phase = car.step(phase, &zone);
        assert_eq!(phase, CarPhase::Done);
        assert_eq!(car.remaining(), 0);
        assert!(zone.all_cars_finished());
    }

    #[test]
    fn single_crossing_finishes_without_cooldown() {
        let log = Arc::new(EventLog::new());
        let zone = ConstructionZone::new(1, 1, Arc::clone(&log) as Arc<dyn EventSink>);
        zone.open(Direction::LeftToRight);

        let crossings = Car::new(9, &spec(1), Duration::from_millis(1)).run(&zone);

        assert_eq!(crossings, 1);
        let events = log.events();
        assert_eq!(
            events.last(),
            Some(&ZoneEvent::CarFinished(9)),
            "finish must follow the only exit"
        );
        assert!(events.contains(&ZoneEvent::CarEntered {
            car: 9,
            direction: Direction::LeftToRight,
            remaining: 0,
        }));
    }
}
