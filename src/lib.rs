//! Flagger-controlled single-lane construction zone simulation.
//!
//! One flagger thread alternates right-of-way between the two sides of the
//! zone; one thread per car crosses back and forth until its quota is spent.
//! They share a [`zone::ConstructionZone`] whose direction gate and capacity
//! gate are guarded by a single lock.

pub mod audit;
pub mod capacity;
pub mod car;
pub mod completion;
pub mod config;
pub mod error;
pub mod events;
pub mod flagger;
pub mod gate;
pub mod logging;
pub mod sim;
pub mod types;
pub mod zone;

pub use config::{SimulationConfig, TimeUnit};
pub use error::{ConfigError, SimulationError};
pub use events::{EventSink, ZoneEvent};
pub use sim::{SimulationReport, run};
pub use types::{CarId, CarSpec, Direction};
