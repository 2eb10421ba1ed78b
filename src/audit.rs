//! Replays zone events and checks the safety invariants as they happen.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use thiserror::Error;

use crate::events::{EventSink, ZoneEvent};
use crate::types::{CarId, Direction};

/// A broken safety invariant observed in the event stream.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("capacity exceeded: {occupancy} cars inside, capacity {capacity}")]
    CapacityExceeded { occupancy: usize, capacity: usize },

    #[error("car {car} entered {direction} while traffic from the other side was inside")]
    OppositeDirections { car: CarId, direction: Direction },

    #[error("car {car} entered {direction} while the gate was {gate:?}")]
    EnteredAgainstGate {
        car: CarId,
        direction: Direction,
        gate: Option<Direction>,
    },

    #[error("gate reopened with {occupancy} car(s) still inside")]
    ReopenedBeforeDrain { occupancy: usize },

    #[error("car {car} exited without entering")]
    ExitWithoutEntry { car: CarId },

    #[error("car {car} finished more than once")]
    DuplicateFinish { car: CarId },

    #[error("flagger finished with {finished} of {total} cars done")]
    PrematureTermination { finished: usize, total: usize },
}

/// What the audit saw over a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub crossings: u64,
    pub gate_cycles: usize,
    pub max_occupancy: usize,
    pub finished_cars: usize,
    pub flagger_finished: bool,
    pub violations: Vec<Violation>,
}

impl AuditSummary {
    pub fn capacity_violation(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::CapacityExceeded { .. }))
    }

    pub fn direction_violation(&self) -> bool {
        self.violations.iter().any(|v| {
            matches!(
                v,
                Violation::OppositeDirections { .. } | Violation::EnteredAgainstGate { .. }
            )
        })
    }

    pub fn drain_violation(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::ReopenedBeforeDrain { .. }))
    }
}

struct AuditState {
    gate: Option<Direction>,
    inside: HashMap<CarId, Direction>,
    finished: HashSet<CarId>,
    summary: AuditSummary,
}

/// Event sink that validates every transition against the zone invariants.
pub struct ZoneAudit {
    capacity: usize,
    total_cars: usize,
    state: Mutex<AuditState>,
}

impl ZoneAudit {
    pub fn new(capacity: usize, total_cars: usize) -> Self {
        Self {
            capacity,
            total_cars,
            state: Mutex::new(AuditState {
                gate: None,
                inside: HashMap::new(),
                finished: HashSet::new(),
                summary: AuditSummary::default(),
            }),
        }
    }

    pub fn summary(&self) -> AuditSummary {
        self.state
            .lock()
            .expect("audit mutex poisoned")
            .summary
            .clone()
    }

    fn flag(state: &mut AuditState, violation: Violation) {
        tracing::warn!(%violation, "safety violation");
        state.summary.violations.push(violation);
    }
}

impl EventSink for ZoneAudit {
    fn record(&self, event: &ZoneEvent) {
        let mut guard = self.state.lock().expect("audit mutex poisoned");
        let state = &mut *guard;
        match *event {
            ZoneEvent::GateOpened(direction) => {
                if !state.inside.is_empty() {
                    let occupancy = state.inside.len();
                    Self::flag(state, Violation::ReopenedBeforeDrain { occupancy });
                }
                state.gate = Some(direction);
                state.summary.gate_cycles += 1;
            }
            ZoneEvent::GateClosed => state.gate = None,
            ZoneEvent::CarEntered { car, direction, .. } => {
                if state.gate != Some(direction) {
                    let gate = state.gate;
                    Self::flag(state, Violation::EnteredAgainstGate { car, direction, gate });
                }
                if state.inside.values().any(|&inside| inside != direction) {
                    Self::flag(state, Violation::OppositeDirections { car, direction });
                }
                state.inside.insert(car, direction);
                let occupancy = state.inside.len();
                if occupancy > self.capacity {
                    let capacity = self.capacity;
                    Self::flag(state, Violation::CapacityExceeded { occupancy, capacity });
                }
                state.summary.max_occupancy = state.summary.max_occupancy.max(occupancy);
                state.summary.crossings += 1;
            }
            ZoneEvent::CarExited { car, .. } => {
                if state.inside.remove(&car).is_none() {
                    Self::flag(state, Violation::ExitWithoutEntry { car });
                }
            }
            ZoneEvent::CarFinished(car) => {
                if !state.finished.insert(car) {
                    Self::flag(state, Violation::DuplicateFinish { car });
                }
                state.summary.finished_cars = state.finished.len();
            }
            ZoneEvent::FlaggerFinished => {
                let finished = state.finished.len();
                if finished != self.total_cars {
                    let total = self.total_cars;
                    Self::flag(state, Violation::PrematureTermination { finished, total });
                }
                state.summary.flagger_finished = true;
            }
        }
    }
}
