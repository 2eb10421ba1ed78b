//! Simulation driver plus the demo and stress-test runners.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::audit::{AuditSummary, ZoneAudit};
use crate::car::Car;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::events::{ConsoleSink, EventSink, Fanout, NullSink};
use crate::flagger::Flagger;
use crate::types::{CarSpec, Direction};
use crate::zone::ConstructionZone;

// Demo timing knobs (small for quick CLI feedback).
const DEMO_CAPACITY: usize = 2;
const DEMO_FLOW_MS: u64 = 60;
const DEMO_CROSS_MS: u64 = 15;
// Stress timing, shorter still since the sweep runs many configurations.
const STRESS_FLOW_MS: u64 = 10;
const STRESS_CROSS_MS: u64 = 2;
const STRESS_PAUSE_MS: u64 = 1;

/// Outcome of one complete run.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub cars: usize,
    /// Crossings made, summed over every car thread.
    pub crossings: u64,
    /// Flow phases served by the flagger.
    pub flow_phases: usize,
    pub elapsed: Duration,
    pub audit: AuditSummary,
}

/// Build the flagger and one thread per car, run them to completion, and
/// return what happened. Every event also goes to `sink`.
pub fn run(config: &SimulationConfig, sink: Arc<dyn EventSink>) -> Result<SimulationReport, SimulationError> {
    config.validate()?;
    let total_cars = config.cars.len();
    let audit = Arc::new(ZoneAudit::new(config.capacity, total_cars));
    let events: Arc<dyn EventSink> = Arc::new(
        Fanout::new()
            .with(Arc::clone(&audit) as Arc<dyn EventSink>)
            .with(sink),
    );
    let zone = Arc::new(ConstructionZone::new(
        config.capacity,
        total_cars,
        Arc::clone(&events),
    ));

    let start = Instant::now();
    // Cars first: they park at the closed gate until the flagger opens it.
    let mut handles = Vec::with_capacity(total_cars);
    for (id, spec) in config.cars.iter().enumerate() {
        let car = Car::new(id, spec, config.time_to_cross);
        let zone = Arc::clone(&zone);
        let name = format!("car-{id}");
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || car.run(&zone))
            .map_err(|source| SimulationError::Spawn { name: name.clone(), source })?;
        handles.push((name, handle));
    }

    let flagger = Flagger::new(Arc::clone(&zone), config.flow_duration, events);
    let flagger_handle = thread::Builder::new()
        .name("flagger".to_string())
        .spawn(move || flagger.run())
        .map_err(|source| SimulationError::Spawn {
            name: "flagger".to_string(),
            source,
        })?;

    let flow_phases = flagger_handle
        .join()
        .map_err(|_| SimulationError::WorkerPanicked {
            name: "flagger".to_string(),
        })?;
    let mut crossings = 0u64;
    for (name, handle) in handles {
        let made = handle
            .join()
            .map_err(|_| SimulationError::WorkerPanicked { name })?;
        crossings += u64::from(made);
    }
    let elapsed = start.elapsed();
    tracing::info!(
        cars = total_cars,
        crossings,
        flow_phases,
        elapsed_ms = elapsed.as_millis() as u64,
        "simulation finished"
    );

    Ok(SimulationReport {
        cars: total_cars,
        crossings,
        flow_phases,
        elapsed,
        audit: audit.summary(),
    })
}

/// Echo the parameters before a run, in the flagger program's layout.
pub fn print_parameters(config: &SimulationConfig) {
    println!("Construction Zone Parameters");
    println!(
        "Initial Cars - Left Side:{} Right Side:{}",
        config.cars_from(Direction::LeftToRight),
        config.cars_from(Direction::RightToLeft)
    );
    println!(
        "Construction Zone - Cross Time:{:?} Car Capacity:{}",
        config.time_to_cross, config.capacity
    );
    println!(
        "Flagger - Time before flipping direction:{:?}",
        config.flow_duration
    );
    for (id, car) in config.cars.iter().enumerate() {
        println!(
            "Car {id} - Crossing Count:{} Sleep Time:{:?} Initial Direction:{}",
            car.crossings, car.time_between_trips, car.initial_direction
        );
    }
}

fn print_summary(title: &str, config: &SimulationConfig, report: &SimulationReport) {
    println!("{title}");
    println!(
        "cars={} capacity={} crossings_total={}",
        report.cars,
        config.capacity,
        config.total_crossings()
    );
    println!("crossings_made={}", report.crossings);
    println!("flow_phases={}", report.flow_phases);
    println!("finished_cars={}", report.audit.finished_cars);
    println!("max_zone_occupancy_observed={}", report.audit.max_occupancy);
    println!("capacity_violation={}", report.audit.capacity_violation());
    println!("direction_violation={}", report.audit.direction_violation());
    println!("drain_violation={}", report.audit.drain_violation());
    println!("elapsed_ms={}", report.elapsed.as_millis());
}

fn fail_on_violations(report: &SimulationReport) -> Result<(), SimulationError> {
    let count = report.audit.violations.len();
    if count == 0 {
        return Ok(());
    }
    for violation in &report.audit.violations {
        eprintln!("# violation,{violation}");
    }
    Err(SimulationError::Violations { count })
}

/// Run a parsed parameter file with status lines on stdout.
pub fn run_file(config: &SimulationConfig, quiet: bool, validate: bool) -> Result<(), SimulationError> {
    print_parameters(config);
    let sink: Arc<dyn EventSink> = if quiet {
        Arc::new(NullSink)
    } else {
        Arc::new(ConsoleSink)
    };
    let report = run(config, sink)?;
    print_summary("RUN SUMMARY", config, &report);
    if validate {
        fail_on_violations(&report)?;
    }
    Ok(())
}

/// Configuration used by the `demo` command: traffic from both sides with
/// more cars than the zone holds.
pub fn demo_config() -> SimulationConfig {
    let pause = |ms| Duration::from_millis(ms);
    SimulationConfig::new(
        DEMO_CAPACITY,
        Duration::from_millis(DEMO_FLOW_MS),
        Duration::from_millis(DEMO_CROSS_MS),
    )
    .with_car(CarSpec::new(Direction::LeftToRight, 3, pause(10)))
    .with_car(CarSpec::new(Direction::LeftToRight, 2, pause(25)))
    .with_car(CarSpec::new(Direction::LeftToRight, 1, pause(0)))
    .with_car(CarSpec::new(Direction::RightToLeft, 3, pause(5)))
    .with_car(CarSpec::new(Direction::RightToLeft, 2, pause(40)))
}

/// Run the default demo showing gating, capacity, and the drain handshake.
pub fn run_demo() -> Result<(), SimulationError> {
    tracing::info!("demo start");
    let config = demo_config();
    print_parameters(&config);
    let report = run(&config, Arc::new(ConsoleSink))?;
    print_summary("DEMO SUMMARY", &config, &report);
    Ok(())
}

fn stress_config(capacity: usize, cars: usize, crossings: u32) -> SimulationConfig {
    let mut config = SimulationConfig::new(
        capacity,
        Duration::from_millis(STRESS_FLOW_MS),
        Duration::from_millis(STRESS_CROSS_MS),
    );
    for id in 0..cars {
        // Alternate starting sides so both queues are busy.
        let direction = if id % 2 == 0 {
            Direction::LeftToRight
        } else {
            Direction::RightToLeft
        };
        config = config.with_car(CarSpec::new(
            direction,
            crossings,
            Duration::from_millis(STRESS_PAUSE_MS * (id as u64 % 3)),
        ));
    }
    config
}

/// Sweep capacity and fleet size, printing one CSV row per configuration.
pub fn run_stress(
    capacities: &[usize],
    car_counts: &[usize],
    crossings: u32,
    validate: bool,
) -> Result<(), SimulationError> {
    println!(
        "capacity,cars,crossings_per_car,total_crossings,elapsed_ms,gate_cycles,max_occupancy,violations"
    );
    let mut total_violations = 0usize;
    for &capacity in capacities {
        for &cars in car_counts {
            let config = stress_config(capacity, cars, crossings);
            let report = run(&config, Arc::new(NullSink))?;
            println!(
                "{},{},{},{},{:.2},{},{},{}",
                capacity,
                cars,
                crossings,
                report.crossings,
                report.elapsed.as_secs_f64() * 1000.0,
                report.audit.gate_cycles,
                report.audit.max_occupancy,
                report.audit.violations.len()
            );
            if validate {
                for violation in &report.audit.violations {
                    eprintln!("# violation,capacity={capacity},cars={cars},{violation}");
                }
            }
            total_violations += report.audit.violations.len();
        }
    }
    if validate && total_violations > 0 {
        return Err(SimulationError::Violations {
            count: total_violations,
        });
    }
    Ok(())
}
