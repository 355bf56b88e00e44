//! Test helpers for building arenas and scripting input.

use glam::Vec3;

use crate::config::{PolicyKind, SimulationConfig};
use crate::entity::{ShipId, PLAYER_ID};
use crate::events::TickReport;
use crate::simulation::{PlayerInput, ShipSnapshot, Simulation};

// =============================================================================
// Arena Setup
// =============================================================================

/// Configuration with population upkeep switched off and no initial bots.
pub fn empty_arena_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.population.min_bots = 0;
    config.population.max_bots = 0;
    config
}

/// An arena holding only the player, parked at `player_position`.
pub fn empty_arena(seed: u64, player_position: Vec3) -> Simulation {
    let mut sim = Simulation::with_config(empty_arena_config(), seed)
        .expect("empty arena config is valid");
    place_ship(&mut sim, PLAYER_ID, player_position, Vec3::ZERO);
    sim
}

/// An empty arena whose bots use `policy`.
pub fn empty_arena_with_policy(seed: u64, policy: PolicyKind) -> Simulation {
    let mut config = empty_arena_config();
    config.behavior.policy = policy;
    Simulation::with_config(config, seed).expect("empty arena config is valid")
}

/// Moves a ship and sets its velocity.
pub fn place_ship(sim: &mut Simulation, id: ShipId, position: Vec3, velocity: Vec3) {
    let ship = sim.ship_mut(id).expect("ship exists");
    ship.transform_mut().position = position;
    ship.body_mut().set_velocity(velocity);
}

// =============================================================================
// Running
// =============================================================================

/// Scripted input for tick `i`: thrust on, gentle weaving, boost every two seconds.
pub fn scripted_input(i: u64) -> PlayerInput {
    #[allow(clippy::cast_precision_loss)]
    let t = i as f32 / 60.0;
    PlayerInput {
        pitch: (t * 0.7).sin() * 0.3,
        yaw: (t * 0.5).cos() * 0.5,
        thrust: i % 90 < 45,
        boost: i % 120 == 0,
    }
}

/// Runs `ticks` steps of [`scripted_input`] and returns every report.
pub fn run_scripted(sim: &mut Simulation, ticks: u64) -> Vec<TickReport> {
    (0..ticks).map(|i| sim.step(&scripted_input(i))).collect()
}

/// Runs `ticks` steps with no input at all.
pub fn run_idle(sim: &mut Simulation, ticks: u64) -> Vec<TickReport> {
    (0..ticks).map(|_| sim.step(&PlayerInput::default())).collect()
}

/// Snapshot of the whole arena.
pub fn arena_snapshot(sim: &Simulation) -> Vec<ShipSnapshot> {
    sim.snapshot()
}
