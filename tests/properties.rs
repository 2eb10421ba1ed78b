//! Property-based checks of the zone invariants over random small fleets.

use std::sync::Arc;
use std::time::Duration;

use flagger_ahead::events::NullSink;
use flagger_ahead::{CarSpec, Direction, SimulationConfig, run};
use proptest::prelude::*;

fn car_strategy() -> impl Strategy<Value = CarSpec> {
    (any::<bool>(), 1u32..=3, 0u64..3).prop_map(|(left, crossings, pause_ms)| {
        let direction = if left {
            Direction::LeftToRight
        } else {
            Direction::RightToLeft
        };
        CarSpec::new(direction, crossings, Duration::from_millis(pause_ms))
    })
}

#[test]
fn prop_every_run_is_safe_and_terminates() {
    let config = ProptestConfig::with_cases(12);
    proptest!(config, |(
        capacity in 1usize..=3,
        flow_ms in 1u64..8,
        cross_ms in 0u64..3,
        cars in prop::collection::vec(car_strategy(), 1..6)
    )| {
        let mut sim = SimulationConfig::new(
            capacity,
            Duration::from_millis(flow_ms),
            Duration::from_millis(cross_ms),
        );
        for car in cars {
            sim = sim.with_car(car);
        }

        let report = run(&sim, Arc::new(NullSink)).expect("simulation run");

        prop_assert!(report.audit.violations.is_empty(), "{:?}", report.audit.violations);
        prop_assert!(report.audit.max_occupancy <= capacity);
        prop_assert_eq!(report.crossings, sim.total_crossings());
        prop_assert_eq!(report.audit.crossings, sim.total_crossings());
        prop_assert_eq!(report.audit.finished_cars, sim.cars.len());
        prop_assert!(report.audit.flagger_finished);
    });
}
