//! City simulation CLI.
//!
//! Runs the deterministic kernel over the built-in world, printing a digest
//! line per tick and a closing summary. Useful for eyeballing balance and
//! for capturing snapshots to replay in tests.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use city_engine::{EngineConfig, EngineError, SimEngine};
use city_core::WorldDef;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "city_sim")]
#[command(about = "A deterministic city simulation kernel")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// District to focus attention on
    #[arg(long)]
    focus: Option<String>,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a final state snapshot to this path
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Ask a "why" question after the run
    #[arg(long)]
    why: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    if let Err(error) = run(args) {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), EngineError> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    println!("City Simulation Kernel");
    println!("======================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!();

    let mut engine = SimEngine::new(WorldDef::default_world(), config);
    engine.initialize_state();
    if let Some(district) = &args.focus {
        engine.set_focus(district)?;
        println!("Focusing attention on '{}'", district);
        println!();
    }

    let reports = engine.advance_ticks(args.ticks, args.seed)?;
    for report in &reports {
        let surfaced = report.ring_events + report.global_events;
        println!(
            "[Tick {:>4}] {} surfaced / {} archived ({} raw)",
            report.tick, surfaced, report.archived, report.raw_events
        );
        for event in &report.digest {
            println!("    [{:.2}] {}", event.severity, event.headline);
        }
        for seed in &report.seed_activations {
            println!("    >> story seed activated: {}", seed);
        }
    }

    println!();
    println!("Run complete after {} ticks.", reports.len());
    println!("Progression: {}", engine.progression_summary()?);
    println!("Seed activity: {}", engine.activation_report()?);
    let profiling = engine.profiling_summary()?;
    println!(
        "Timing: p50 {}us, p95 {}us, max {}us (slowest: {})",
        profiling.p50_us, profiling.p95_us, profiling.max_us, profiling.slowest_subsystem
    );

    if let Some(question) = &args.why {
        println!();
        println!("Q: {}", question);
        println!("A: {}", engine.why(question)?);
    }

    if let Some(path) = &args.snapshot_out {
        let snapshot = engine.snapshot()?;
        if let Err(error) = fs::write(path, snapshot) {
            eprintln!("Warning: could not write snapshot: {}", error);
        } else {
            println!("Wrote snapshot to {}", path.display());
        }
    }

    Ok(())
}
