use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flagger_ahead::{SimulationConfig, TimeUnit, logging, sim};

/// Flagger-controlled construction zone simulation
#[derive(Parser, Debug)]
#[command(name = "flagger_ahead")]
#[command(about = "Single-lane construction zone with a flagger and many cars")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the parameters in FILE
    Run {
        /// Parameter file: `left right cross_time flow_time capacity` then
        /// `crossings wait_time` per car
        file: PathBuf,

        /// Unit for the times in FILE
        #[arg(long, value_enum, default_value_t = TimeUnit::Micros)]
        time_unit: TimeUnit,

        /// Suppress per-event status lines
        #[arg(short, long)]
        quiet: bool,

        /// Fail if any safety violation is observed
        #[arg(long)]
        validate: bool,
    },
    /// Run the built-in demo (default)
    Demo,
    /// Sweep capacities and fleet sizes, printing CSV
    Stress {
        /// Zone capacities to try
        #[arg(long, value_delimiter = ',', default_values_t = [1usize, 2, 4])]
        capacities: Vec<usize>,

        /// Fleet sizes to try
        #[arg(long, value_delimiter = ',', default_values_t = [2usize, 4, 8])]
        cars: Vec<usize>,

        /// Crossings per car
        #[arg(long, default_value_t = 3)]
        crossings: u32,

        /// Fail if any safety violation is observed
        #[arg(long)]
        validate: bool,
    },
}

fn execute(command: Option<Command>) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Some(Command::Run {
            file,
            time_unit,
            quiet,
            validate,
        }) => {
            let config = SimulationConfig::load(&file, time_unit)?;
            sim::run_file(&config, quiet, validate)?;
        }
        Some(Command::Stress {
            capacities,
            cars,
            crossings,
            validate,
        }) => {
            sim::run_stress(&capacities, &cars, crossings, validate)?;
        }
        Some(Command::Demo) | None => sim::run_demo()?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    match execute(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "simulation aborted");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
