//! MEV Guard CLI
//!
//! Builds a guard from a TOML config, replays a scenario of pair, factory,
//! owner and user calls against it, and prints every decision.
//!
//! Usage:
//!   mev-guard --config config/guard.toml --scenario config/scenario.toml
//!   mev-guard --config config/guard.toml --scenario s.toml --snapshot-out guard.json
//!   mev-guard --config config/guard.toml --scenario s.toml --json

use anyhow::Result;
use clap::Parser;
use mev_guard::config::load_config_from_file;
use mev_guard::scenario::{run_scenario, Scenario, StepOutcome};
use mev_guard::snapshot::GuardSnapshot;
use mev_guard::MevGuard;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// MEV protection guard - scenario replay
#[derive(Parser)]
#[command(name = "mev-guard")]
struct Args {
    /// Guard configuration (TOML)
    #[arg(short, long, env = "MEV_GUARD_CONFIG", default_value = "config/guard.toml")]
    config: PathBuf,

    /// Scenario to replay (TOML)
    #[arg(short, long, env = "MEV_GUARD_SCENARIO")]
    scenario: PathBuf,

    /// Write a JSON snapshot of the final guard state here
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Print outcomes as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "MEV_GUARD_LOG_JSON")]
    log_json: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    // Initialize logging (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let settings = load_config_from_file(&args.config)?;
    info!("Configuration loaded from {}", args.config.display());
    let guard = MevGuard::from_settings(&settings)?;

    let scenario = Scenario::load(&args.scenario)?;
    let outcomes = run_scenario(&guard, &scenario)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for (i, (step, outcome)) in scenario.steps.iter().zip(&outcomes).enumerate() {
            println!(
                "{:>4}  block {:>8}  {:<22}  {}",
                i + 1,
                step.block,
                step.action.name(),
                outcome
            );
        }
    }

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, StepOutcome::Failed(_)))
        .count();
    if failed > 0 {
        warn!("{} of {} steps failed", failed, outcomes.len());
    }

    let stats = guard.stats();
    info!(
        "Decisions: {} admitted | {} passed through | {} soft-rejected | {} reverted | acceptance {:.1}%",
        stats.admitted,
        stats.passed_through,
        stats.soft_rejected,
        stats.reverted,
        stats.acceptance_rate()
    );

    if let Some(path) = args.snapshot_out {
        GuardSnapshot::capture(&guard).save(&path)?;
    }

    Ok(())
}
