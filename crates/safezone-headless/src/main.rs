//! Headless round runner.
//!
//! Plays seeded rounds with the scripted [`Autopilot`] at the controls and
//! prints one JSON summary line per round on stdout. Logs go to stderr.
//!
//! ```text
//! safezone-headless --seed 7 --rounds 3 --policy orbit -v
//! ```

mod autopilot;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use tracing::{debug, info, Level};

use safezone_core::{PolicyKind, RoundOutcome, RoundTracker, Simulation, SimulationConfig};

use crate::autopilot::Autopilot;

/// Runs Safezone arena rounds without a renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Master seed for the simulation
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of rounds to play
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Round length in seconds (overrides the config file)
    #[arg(long)]
    duration: Option<f32>,

    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bot behavior policy (overrides the config file)
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Pursuit,
    Orbit,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Pursuit => Self::Pursuit,
            PolicyArg::Orbit => Self::Orbit,
        }
    }
}

/// One line of output.
#[derive(Debug, Serialize)]
struct RoundSummary {
    round: u32,
    seed: u64,
    outcome: RoundOutcome,
    ticks: u64,
    collisions: usize,
    eliminations: usize,
    wins: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(policy) = args.policy {
        config.behavior.policy = policy.into();
    }
    if let Some(duration) = args.duration {
        config.round_duration = duration;
    }

    let mut sim = Simulation::with_config(config, args.seed).context("invalid simulation config")?;
    let mut round = RoundTracker::new(sim.config().round_duration);
    let pilot = Autopilot::default();

    for index in 0..args.rounds {
        if index > 0 {
            round.start_round();
            sim.reset();
        }
        let summary = play_round(&mut sim, &mut round, &pilot, index + 1);
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = SimulationConfig::from_json_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn play_round(sim: &mut Simulation, round: &mut RoundTracker, pilot: &Autopilot, number: u32) -> RoundSummary {
    let dt = sim.config().tick;
    let start_tick = sim.tick();
    let mut collisions = 0;
    let mut eliminations = 0;
    info!(round = number, bots = sim.bot_count(), "round started");

    let outcome = loop {
        let input = pilot.input(sim);
        let report = sim.step(&input);
        collisions += report.collisions;
        eliminations += report.eliminated.len();
        if let Some(outcome) = round.observe(dt, report.player_in_bounds, report.active_bot_count) {
            break outcome;
        }
    };

    let ticks = sim.tick() - start_tick;
    info!(round = number, ?outcome, ticks, remaining = %round.format_remaining(), "round over");
    RoundSummary {
        round: number,
        seed: sim.seed(),
        outcome,
        ticks,
        collisions,
        eliminations,
        wins: round.wins(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_policy_and_verbosity() {
        let args = Args::parse_from(["safezone-headless", "--seed", "9", "--policy", "orbit", "-vv"]);
        assert_eq!(args.seed, 9);
        assert_eq!(args.rounds, 1);
        assert!(matches!(args.policy, Some(PolicyArg::Orbit)));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.population.max_bots, 4);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/safezone.json"))).is_err());
    }

    #[test]
    fn short_round_ends_with_a_summary() {
        let mut config = SimulationConfig::default();
        config.round_duration = 1.0;
        let mut sim = Simulation::with_config(config, 3).unwrap();
        let mut round = RoundTracker::new(1.0);
        let summary = play_round(&mut sim, &mut round, &Autopilot::default(), 1);
        assert!(summary.ticks > 0 && summary.ticks <= 61);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"outcome\""));
    }
}
