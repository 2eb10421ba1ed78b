//! Direction gate: which side of the zone may currently proceed.

use std::sync::{Condvar, MutexGuard};

use crate::types::Direction;
use crate::zone::ZoneState;

/// Wait/notify half of the direction gate.
///
/// The permitted direction itself is stored in [`ZoneState`] so it shares a
/// lock with occupancy; a car checks the gate and takes a slot atomically.
pub struct DirectionGate {
    changed: Condvar,
}

impl DirectionGate {
    pub fn new() -> Self {
        Self {
            changed: Condvar::new(),
        }
    }

    /// Let traffic flow in `direction` and wake every waiting car.
    pub fn open(&self, state: &mut ZoneState, direction: Direction) {
        state.permitted = Some(direction);
        self.changed.notify_all();
    }

    /// Mark the zone unsafe in both directions.
    pub fn close(&self, state: &mut ZoneState) {
        state.permitted = None;
        // Waiters re-check and go back to sleep.
        self.changed.notify_all();
    }

    /// Block until the gate is open for `direction`.
    pub fn await_direction<'a>(
        &self,
        mut guard: MutexGuard<'a, ZoneState>,
        direction: Direction,
    ) -> MutexGuard<'a, ZoneState> {
        while guard.permitted != Some(direction) {
            // Wait releases the lock and re-acquires it before returning.
            guard = self.changed.wait(guard).expect("condvar wait failed");
        }
        guard
    }
}
