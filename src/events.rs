//! Simulation events and the sinks that consume them.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::types::{CarId, Direction};

/// Something observable that happened in the zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoneEvent {
    GateOpened(Direction),
    GateClosed,
    CarEntered {
        car: CarId,
        direction: Direction,
        /// Crossings left once this one completes.
        remaining: u32,
    },
    CarExited {
        car: CarId,
        direction: Direction,
    },
    CarFinished(CarId),
    FlaggerFinished,
}

impl fmt::Display for ZoneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneEvent::GateOpened(direction) => {
                write!(f, "Flagger indicating safe to drive {direction}")
            }
            ZoneEvent::GateClosed => f.write_str("Flagger indicating unsafe to drive"),
            ZoneEvent::CarEntered {
                car,
                direction,
                remaining,
            } => write!(
                f,
                "Car {car} entering construction zone traveling: {direction} Crossings remaining: {remaining}"
            ),
            ZoneEvent::CarExited { car, direction } => {
                write!(f, "Car {car} leaving construction zone traveling: {direction}")
            }
            ZoneEvent::CarFinished(car) => write!(f, "Car {car} has finished all crossings"),
            ZoneEvent::FlaggerFinished => f.write_str("Flagger has finished"),
        }
    }
}

/// Consumer of zone events.
///
/// Gate and car events are recorded while the zone lock is held, so a sink
/// sees them in the order they took effect. Implementations must not call
/// back into the zone.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ZoneEvent);
}

/// Prints each event as a status line on stdout.
#[derive(Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn record(&self, event: &ZoneEvent) {
        println!("{event}");
    }
}

/// Discards every event.
#[derive(Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &ZoneEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<ZoneEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ZoneEvent> {
        self.events.lock().expect("event log mutex poisoned").clone()
    }
}

impl EventSink for EventLog {
    fn record(&self, event: &ZoneEvent) {
        self.events
            .lock()
            .expect("event log mutex poisoned")
            .push(event.clone());
    }
}

/// Forwards every event to each wrapped sink in turn.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for Fanout {
    fn record(&self, event: &ZoneEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
