//! # stepramp Runner
//!
//! Drives one velocity-ramp axis through the motion profile of a TOML file,
//! either in virtual time (default) or paced by the wall clock.
//!
//! # Usage
//!
//! ```bash
//! # Dry run of the configured profile
//! stepramp_runner config/axis.toml
//!
//! # Override the command, print the result as JSON
//! stepramp_runner config/axis.toml --acceleration 2000 --target-speed 4000 --summary-json
//!
//! # Real-time pacing on core 2 (build with --features rt for SCHED_FIFO)
//! stepramp_runner config/axis.toml --realtime --cpu-core 2
//! ```

#![deny(warnings)]

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stepramp_axis::PulseRecorder;
use stepramp_common::config::LogLevel;
use stepramp_runner::config::{LoadedConfig, load_config};
use stepramp_runner::cycle::{CycleRunner, rt_setup};
use stepramp_runner::sim::{RunSummary, Simulation};

/// stepramp Runner: fixed-period tick scheduler for a stepper axis
#[derive(Parser, Debug)]
#[command(name = "stepramp_runner")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Fixed-period tick scheduler and simulator for a stepper velocity ramp")]
struct Args {
    /// Path to the runner configuration TOML.
    #[arg(default_value = "config/axis.toml")]
    config: PathBuf,

    /// Number of ticks to run (default: profile.duration_ms).
    #[arg(long)]
    ticks: Option<u64>,

    /// Target speed [microsteps / speed_scale s]; replaces the profile value.
    #[arg(long, allow_negative_numbers = true)]
    target_speed: Option<i32>,

    /// Acceleration [microsteps/s²]; replaces the profile value.
    #[arg(long, allow_negative_numbers = true)]
    acceleration: Option<i32>,

    /// Pace ticks by the wall clock instead of virtual time.
    #[arg(long)]
    realtime: bool,

    /// CPU core to pin the tick thread to (with --realtime).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (with --realtime).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Print the final run summary as JSON on stdout.
    #[arg(long)]
    summary_json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);

    let level = match &loaded {
        Ok(config) => config.runner.shared.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_tracing(&args, level);

    info!("stepramp Runner v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("stepramp Runner finished");
}

fn run(args: &Args, mut config: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    apply_overrides(args, &mut config);

    let ticks = args.ticks.unwrap_or_else(|| config.ticks());
    info!(
        service = %config.runner.shared.service_name,
        ticks,
        tick_interval_us = config.params.tick_interval_us(),
        speed_limit = config.params.speed_limit(),
        "config OK"
    );

    let summary = if args.realtime {
        run_realtime(args, &config, ticks)?
    } else {
        run_virtual(&config, ticks)?
    };

    info!(
        ticks = summary.ticks,
        elapsed_us = summary.elapsed_us,
        pulses = summary.pulses,
        position = summary.snapshot.position,
        speed = summary.snapshot.speed,
        position_rad = summary.position_rad,
        speed_rad = summary.speed_rad,
        "run complete"
    );

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

/// CLI integers replace both the integer and angular profile values.
fn apply_overrides(args: &Args, config: &mut LoadedConfig) {
    let profile = &mut config.runner.profile;
    if let Some(acceleration) = args.acceleration {
        profile.acceleration = acceleration;
        profile.acceleration_rad = None;
    }
    if let Some(target_speed) = args.target_speed {
        profile.target_speed = target_speed;
        profile.target_speed_rad = None;
    }
}

fn run_virtual(
    config: &LoadedConfig,
    ticks: u64,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let mut sim = Simulation::from_config(config)?;
    let every = config.report_every().unwrap_or(0);
    let tick_us = config.params.tick_interval_us() as u64;

    Ok(sim.run_ticks_with(ticks, every, |tick, snap| {
        info!(
            t_us = tick * tick_us,
            position = snap.position,
            speed = snap.speed,
            step_period_us = snap.step_period_us,
            state = ?snap.state,
            "progress"
        );
    }))
}

fn run_realtime(
    args: &Args,
    config: &LoadedConfig,
    ticks: u64,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        cpu_core = args.cpu_core,
        priority = args.rt_priority,
        "RT setup complete"
    );

    let mut runner = CycleRunner::new(config.build_axis(PulseRecorder::new())?);

    let running = runner.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let result = runner.run(ticks);
    let summary = RunSummary::capture(runner.axis(), runner.ticks());
    if let Err(e) = result {
        error!("tick loop error: {e}");
        return Err(e.into());
    }
    Ok(summary)
}

/// Setup tracing subscriber from CLI arguments and the configured level.
///
/// `RUST_LOG` wins when set; `--verbose` raises the level to DEBUG.
/// Logs go to stderr so `--summary-json` output stays parseable.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
