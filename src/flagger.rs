//! Flagger controller: alternates right-of-way and drains between flips.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::events::{EventSink, ZoneEvent};
use crate::types::Direction;
use crate::zone::ConstructionZone;

/// Flagger state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlaggerPhase {
    Flowing(Direction),
    Draining(Direction),
    Terminated,
}

/// The single controller thread's logic.
pub struct Flagger {
    zone: Arc<ConstructionZone>,
    flow_duration: Duration,
    events: Arc<dyn EventSink>,
}

impl Flagger {
    pub fn new(zone: Arc<ConstructionZone>, flow_duration: Duration, events: Arc<dyn EventSink>) -> Self {
        Self {
            zone,
            flow_duration,
            events,
        }
    }

    /// Start a flow phase, or terminate if no car needs the zone any more.
    fn begin_flow(&self, direction: Direction) -> FlaggerPhase {
        if self.zone.all_cars_finished() {
            return FlaggerPhase::Terminated;
        }
        self.zone.open(direction);
        FlaggerPhase::Flowing(direction)
    }

    /// Advance one phase and return the next one.
    pub fn step(&self, phase: FlaggerPhase) -> FlaggerPhase {
        match phase {
            FlaggerPhase::Flowing(direction) => {
                thread::sleep(self.flow_duration);
                FlaggerPhase::Draining(direction)
            }
            FlaggerPhase::Draining(direction) => {
                self.zone.close();
                self.zone.wait_until_drained();
                tracing::debug!(%direction, "zone drained");
                self.begin_flow(direction.opposite())
            }
            FlaggerPhase::Terminated => FlaggerPhase::Terminated,
        }
    }

    /// Run until every car is done. Returns the number of flow phases served.
    pub fn run(self) -> usize {
        let mut cycles = 0;
        let mut phase = self.begin_flow(Direction::LeftToRight);
        while phase != FlaggerPhase::Terminated {
            if let FlaggerPhase::Flowing(_) = phase {
                cycles += 1;
            }
            phase = self.step(phase);
        }
        tracing::debug!(cycles, "flagger terminated");
        self.events.record(&ZoneEvent::FlaggerFinished);
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, NullSink};

    #[test]
    fn terminates_immediately_when_no_car_is_pending() {
        let log = Arc::new(EventLog::new());
        let zone = Arc::new(ConstructionZone::new(1, 0, Arc::new(NullSink)));
        let flagger = Flagger::new(zone, Duration::from_millis(5), Arc::clone(&log) as Arc<dyn EventSink>);
        assert_eq!(flagger.run(), 0);
        assert_eq!(log.events(), vec![ZoneEvent::FlaggerFinished]);
    }

    #[test]
    fn flips_direction_after_drain() {
        let log = Arc::new(EventLog::new());
        let zone = Arc::new(ConstructionZone::new(
            1,
            1,
            Arc::clone(&log) as Arc<dyn EventSink>,
        ));
        let flagger = Flagger::new(Arc::clone(&zone), Duration::from_millis(1), Arc::new(NullSink));

        let phase = flagger.begin_flow(Direction::LeftToRight);
        assert_eq!(phase, FlaggerPhase::Flowing(Direction::LeftToRight));
        let phase = flagger.step(phase);
        assert_eq!(phase, FlaggerPhase::Draining(Direction::LeftToRight));
        let phase = flagger.step(phase);
        assert_eq!(phase, FlaggerPhase::Flowing(Direction::RightToLeft));
        assert_eq!(zone.snapshot().permitted, Some(Direction::RightToLeft));

        assert_eq!(
            log.events(),
            vec![
                ZoneEvent::GateOpened(Direction::LeftToRight),
                ZoneEvent::GateClosed,
                ZoneEvent::GateOpened(Direction::RightToLeft),
            ]
        );
    }

    #[test]
    fn terminates_at_flow_boundary_once_cars_are_done() {
        let zone = Arc::new(ConstructionZone::new(1, 1, Arc::new(NullSink)));
        let flagger = Flagger::new(Arc::clone(&zone), Duration::from_millis(1), Arc::new(NullSink));

        let phase = flagger.begin_flow(Direction::LeftToRight);
        zone.enter(0, Direction::LeftToRight, 0);
        zone.exit(0, Direction::LeftToRight, true);
        let phase = flagger.step(phase);
        assert_eq!(flagger.step(phase), FlaggerPhase::Terminated);
        assert_eq!(zone.snapshot().permitted, None);
    }
}
