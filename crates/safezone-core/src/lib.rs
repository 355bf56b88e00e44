//! # Safezone Core
//!
//! Physics and bot behavior simulation for the Safezone arena: a player ship
//! and AI bots fly inside a spherical safe zone, boosting and ramming each
//! other until the round timer runs out. Whoever leaves the sphere is out.
//!
//! ## Architecture
//!
//! - **Physics** ([`physics::RigidBody`]): thrust, drag, boost cooldown,
//!   collision impulses and camera shake for a single ship.
//! - **Behavior** ([`behavior::BehaviorController`]): a time-gated state
//!   machine that pilots a bot through the same `RigidBody` contract the
//!   player uses. Policies are swappable via [`behavior::BehaviorPolicy`].
//! - **Simulation** ([`simulation::Simulation`]): the fixed-tick orchestrator.
//!   Intent and integration for every ship, then pairwise collisions, then
//!   eliminations, then population upkeep.
//! - **Round** ([`round::RoundTracker`]): reference consumer of the per-tick
//!   `(player_in_bounds, active_bot_count)` report.
//!
//! Rendering, effects, input devices and UI are external collaborators. They
//! read [`entity::Transform`]s and [`events::SimEvent`]s and feed
//! [`simulation::PlayerInput`] back in.
//!
//! ## Usage
//!
//! ```
//! use safezone_core::simulation::{PlayerInput, Simulation};
//!
//! let mut sim = Simulation::new(42);
//! let input = PlayerInput { thrust: true, ..PlayerInput::default() };
//!
//! for _ in 0..10 {
//!     let report = sim.step(&input);
//!     assert!(report.player_in_bounds);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod physics;
pub mod round;
pub mod simulation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use behavior::{BehaviorController, BehaviorPolicy, BehaviorState};
pub use config::{PolicyKind, SimulationConfig};
pub use entity::{Ship, ShipId, ShipKind, Transform};
pub use error::ConfigError;
pub use events::{SimEvent, TickReport};
pub use physics::{BodyFlags, BoostStatus, RigidBody};
pub use round::{RoundOutcome, RoundPhase, RoundTracker};
pub use simulation::{PlayerInput, Simulation, SimulationState};
