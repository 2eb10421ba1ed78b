//! Zone capacity gate: bounds how many cars are inside at once.

use std::sync::{Condvar, MutexGuard};

use crate::zone::ZoneState;

/// Counting admission control over [`ZoneState::occupancy`].
pub struct CapacityGate {
    slot_freed: Condvar,
    drained: Condvar,
}

impl CapacityGate {
    pub fn new() -> Self {
        Self {
            slot_freed: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Take a slot if one is free.
    pub fn try_admit(&self, state: &mut ZoneState) -> bool {
        if state.occupancy >= state.capacity {
            return false;
        }
        state.occupancy += 1;
        true
    }

    /// Sleep until some car leaves the zone. Callers re-check their own
    /// conditions afterwards; there is no guarantee a slot is still free.
    pub fn await_slot<'a>(&self, guard: MutexGuard<'a, ZoneState>) -> MutexGuard<'a, ZoneState> {
        self.slot_freed.wait(guard).expect("condvar wait failed")
    }

    /// Give a slot back, waking anyone waiting for room or for the drain.
    pub fn release(&self, state: &mut ZoneState) {
        debug_assert!(state.occupancy > 0, "occupancy counter underflow");
        state.occupancy -= 1;
        // Every waiter re-checks both the gate and the slot count, so wake all.
        self.slot_freed.notify_all();
        if state.occupancy == 0 {
            self.drained.notify_all();
        }
    }

    /// Block until no car is inside the zone.
    pub fn await_drained<'a>(
        &self,
        mut guard: MutexGuard<'a, ZoneState>,
    ) -> MutexGuard<'a, ZoneState> {
        while guard.occupancy > 0 {
            guard = self.drained.wait(guard).expect("condvar wait failed");
        }
        guard
    }
}
