//! # HELM Control
//!
//! Runs the simulated superstructure through a scripted scenario.
//!
//! Loads one TOML config, builds the elevator, intake and superstructure
//! machines, binds the scripted events as triggers and ticks the scheduler
//! either as fast as possible on simulated time or paced in real time.
//! A JSON run report can be written at the end.

use clap::Parser;
use helm_common::consts::DEFAULT_CONFIG_PATH;
use helm_control::config::load_config;
use helm_control::cycle::Pacing;
use helm_control::sim;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// HELM Control - override-capable subsystem state machines
#[derive(Parser, Debug)]
#[command(name = "helm_control")]
#[command(version)]
#[command(about = "Fixed-tick simulation of override-capable subsystem state machines")]
struct Args {
    /// Path to the scenario configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the number of ticks to run.
    #[arg(long)]
    ticks: Option<u64>,

    /// Pace ticks on the wall clock instead of simulated time.
    #[arg(long)]
    realtime: bool,

    /// Write the JSON run report to this path.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, Level::INFO);
            error!("FATAL: {e}");
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level.as_tracing_level());

    info!("HELM Control v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(ticks) = args.ticks {
        config.tick.ticks = ticks;
    }

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("HELM Control shutdown complete");
}

fn run(
    args: &Args,
    config: &helm_control::config::ControlConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let pacing = if args.realtime {
        Pacing::RealTime
    } else {
        Pacing::Simulated
    };
    info!(
        service = %config.shared.service_name,
        ticks = config.tick.ticks,
        period_us = config.tick.period_us,
        events = config.sim.events.len(),
        ?pacing,
        "starting scenario"
    );

    let report = sim::run(config, pacing, &running)?;

    for (name, snapshot) in &report.subsystems {
        info!(
            subsystem = %name,
            state = %snapshot.state,
            managed = %snapshot.managed,
            overridden = snapshot.overridden,
            "final state"
        );
    }
    if report.ticks < config.tick.ticks {
        warn!(ran = report.ticks, "scenario interrupted");
    }

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}

fn setup_tracing(args: &Args, default_level: Level) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        default_level
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
