//! The construction zone: shared state plus the two gates guarding it.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::capacity::CapacityGate;
use crate::completion::CompletionCounter;
use crate::events::{EventSink, ZoneEvent};
use crate::gate::DirectionGate;
use crate::types::{CarId, Direction};

/// Everything the flagger and the cars share. Only ever touched under the
/// [`ConstructionZone`] lock.
#[derive(Debug)]
pub struct ZoneState {
    /// `None` means unsafe to drive in either direction.
    pub(crate) permitted: Option<Direction>,
    /// Cars between `enter` and `exit`.
    pub(crate) occupancy: usize,
    pub(crate) capacity: usize,
    pub(crate) completion: CompletionCounter,
}

impl ZoneState {
    pub fn new(capacity: usize, total_cars: usize) -> Self {
        debug_assert!(capacity > 0, "capacity must be > 0");
        Self {
            permitted: None,
            occupancy: 0,
            capacity,
            completion: CompletionCounter::new(total_cars),
        }
    }
}

/// Point-in-time copy of the zone state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneSnapshot {
    pub permitted: Option<Direction>,
    pub occupancy: usize,
    pub capacity: usize,
    pub finished_cars: usize,
}

/// Single-lane zone shared by the flagger and every car.
pub struct ConstructionZone {
    state: Mutex<ZoneState>,
    direction: DirectionGate,
    capacity: CapacityGate,
    events: Arc<dyn EventSink>,
}

impl ConstructionZone {
    /// Create a closed, empty zone.
    pub fn new(capacity: usize, total_cars: usize, events: Arc<dyn EventSink>) -> Self {
        Self {
            state: Mutex::new(ZoneState::new(capacity, total_cars)),
            direction: DirectionGate::new(),
            capacity: CapacityGate::new(),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ZoneState> {
        self.state.lock().expect("zone mutex poisoned")
    }

    /// Open the gate for `direction`. The zone must already be drained.
    pub fn open(&self, direction: Direction) {
        let mut guard = self.lock();
        debug_assert_eq!(guard.occupancy, 0, "gate opened before the zone drained");
        self.direction.open(&mut guard, direction);
        tracing::debug!(%direction, "gate opened");
        self.events.record(&ZoneEvent::GateOpened(direction));
    }

    /// Close the gate; cars already inside keep going.
    pub fn close(&self) {
        let mut guard = self.lock();
        self.direction.close(&mut guard);
        tracing::debug!(occupancy = guard.occupancy, "gate closed");
        self.events.record(&ZoneEvent::GateClosed);
    }

    /// Block until the gate is open for `direction` and a slot is free, then
    /// take the slot. `remaining` is reported in the entry event.
    pub fn enter(&self, car: CarId, direction: Direction, remaining: u32) {
        let mut guard = self.lock();
        loop {
            guard = self.direction.await_direction(guard, direction);
            if self.capacity.try_admit(&mut guard) {
                break;
            }
            tracing::trace!(car, occupancy = guard.occupancy, "zone full, waiting");
            // The gate may close while we sleep, so start over afterwards.
            guard = self.capacity.await_slot(guard);
        }
        tracing::debug!(car, %direction, occupancy = guard.occupancy, "car entered");
        self.events.record(&ZoneEvent::CarEntered {
            car,
            direction,
            remaining,
        });
    }

    /// Leave the zone. When `finished` is set the car is also counted as done
    /// in the same critical section, so a drained zone never hides a finish.
    pub fn exit(&self, car: CarId, direction: Direction, finished: bool) {
        let mut guard = self.lock();
        self.events.record(&ZoneEvent::CarExited { car, direction });
        self.capacity.release(&mut guard);
        tracing::debug!(car, %direction, occupancy = guard.occupancy, "car exited");
        if finished {
            guard.completion.record_finish();
            tracing::debug!(
                car,
                finished = guard.completion.finished(),
                total = guard.completion.total(),
                "car finished"
            );
            self.events.record(&ZoneEvent::CarFinished(car));
        }
    }

    /// Block until every car inside has left.
    pub fn wait_until_drained(&self) {
        let guard = self.lock();
        let _guard = self.capacity.await_drained(guard);
    }

    /// True once every car has exhausted its quota.
    pub fn all_cars_finished(&self) -> bool {
        self.lock().completion.is_complete()
    }

    pub fn snapshot(&self) -> ZoneSnapshot {
        let guard = self.lock();
        ZoneSnapshot {
            permitted: guard.permitted,
            occupancy: guard.occupancy,
            capacity: guard.capacity,
            finished_cars: guard.completion.finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, NullSink};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Barrier, mpsc};
    use std::thread;
    use std::time::Duration;

    fn zone(capacity: usize, cars: usize) -> Arc<ConstructionZone> {
        Arc::new(ConstructionZone::new(capacity, cars, Arc::new(NullSink)))
    }

    #[test]
    fn occupancy_never_exceeds_capacity_under_contention() {
        let capacity = 2;
        let contenders = 6;
        let zone = zone(capacity, contenders);
        zone.open(Direction::LeftToRight);
        let barrier = Arc::new(Barrier::new(contenders));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for car in 0..contenders {
            let zone = Arc::clone(&zone);
            let barrier = Arc::clone(&barrier);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(thread::spawn(move || {
                barrier.wait();
                zone.enter(car, Direction::LeftToRight, 0);
                let current = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(current, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                inside.fetch_sub(1, Ordering::SeqCst);
                zone.exit(car, Direction::LeftToRight, true);
            }));
        }

        for handle in handles {
            handle.join().expect("car thread panicked");
        }

        assert!(max_inside.load(Ordering::SeqCst) <= capacity);
        let snapshot = zone.snapshot();
        assert_eq!(snapshot.occupancy, 0);
        assert_eq!(snapshot.finished_cars, contenders);
        assert!(zone.all_cars_finished());
    }

    #[test]
    fn closed_gate_blocks_entry_until_reopened() {
        let zone = zone(1, 1);
        let entered = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel();

        let car_zone = Arc::clone(&zone);
        let car_entered = Arc::clone(&entered);
        let handle = thread::spawn(move || {
            car_zone.enter(0, Direction::RightToLeft, 0);
            car_entered.store(true, Ordering::SeqCst);
            done_tx.send(()).expect("done");
        });

        zone.open(Direction::LeftToRight);
        thread::sleep(Duration::from_millis(30));
        zone.close();
        assert!(done_rx.recv_timeout(Duration::from_millis(30)).is_err());
        assert!(!entered.load(Ordering::SeqCst));

        zone.open(Direction::RightToLeft);
        done_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("car entered");
        handle.join().expect("car thread panicked");
        assert_eq!(zone.snapshot().occupancy, 1);
    }

    #[test]
    fn car_waiting_for_slot_rechecks_gate() {
        let zone = zone(1, 2);
        zone.open(Direction::LeftToRight);
        zone.enter(0, Direction::LeftToRight, 0);

        let (done_tx, done_rx) = mpsc::channel();
        let car_zone = Arc::clone(&zone);
        let handle = thread::spawn(move || {
            car_zone.enter(1, Direction::LeftToRight, 0);
            done_tx.send(()).expect("done");
        });

        // Let the second car block on the full zone, then close behind it.
        thread::sleep(Duration::from_millis(30));
        zone.close();
        zone.exit(0, Direction::LeftToRight, true);
        assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(zone.snapshot().occupancy, 0);

        zone.open(Direction::LeftToRight);
        done_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("car entered after reopen");
        handle.join().expect("car thread panicked");
    }

    #[test]
    fn wait_until_drained_returns_after_last_exit() {
        let zone = zone(2, 2);
        zone.open(Direction::LeftToRight);
        zone.enter(0, Direction::LeftToRight, 0);
        zone.enter(1, Direction::LeftToRight, 0);
        zone.close();

        let (done_tx, done_rx) = mpsc::channel();
        let flagger_zone = Arc::clone(&zone);
        let handle = thread::spawn(move || {
            flagger_zone.wait_until_drained();
            done_tx.send(()).expect("done");
        });

        zone.exit(0, Direction::LeftToRight, true);
        assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());
        zone.exit(1, Direction::LeftToRight, true);
        done_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("drain observed");
        handle.join().expect("drain thread panicked");
    }

    #[test]
    fn events_are_recorded_in_order() {
        let log = Arc::new(EventLog::new());
        let zone = ConstructionZone::new(1, 1, Arc::clone(&log) as Arc<dyn EventSink>);
        zone.open(Direction::RightToLeft);
        zone.enter(4, Direction::RightToLeft, 0);
        zone.close();
        zone.exit(4, Direction::RightToLeft, true);

        assert_eq!(
            log.events(),
            vec![
                ZoneEvent::GateOpened(Direction::RightToLeft),
                ZoneEvent::CarEntered {
                    car: 4,
                    direction: Direction::RightToLeft,
                    remaining: 0,
                },
                ZoneEvent::GateClosed,
                ZoneEvent::CarExited {
                    car: 4,
                    direction: Direction::RightToLeft,
                },
                ZoneEvent::CarFinished(4),
            ]
        );
    }
}
