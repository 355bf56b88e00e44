//! Scripted pilot for the player ship.
//!
//! Flies at the nearest bot and rams it, but turns for home once the player
//! strays past `home_radius`. It reads the same state a renderer would and
//! answers with a [`PlayerInput`], so the simulation cannot tell it from a
//! human at the controls.

use glam::Vec3;
use safezone_core::{PlayerInput, Ship, Simulation};

/// Steering gain from local-frame offset to stick deflection.
const STICK_GAIN: f32 = 4.0;

/// Scripted player pilot.
#[derive(Debug, Clone)]
pub struct Autopilot {
    home_radius: f32,
    thrust_cone: f32,
    boost_cone: f32,
    boost_distance: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            home_radius: 30.0,
            thrust_cone: 45f32.to_radians(),
            boost_cone: 15f32.to_radians(),
            boost_distance: 20.0,
        }
    }
}

impl Autopilot {
    /// Picks this tick's input. Idle once the player is gone.
    #[must_use]
    pub fn input(&self, sim: &Simulation) -> PlayerInput {
        let Some(player) = sim.player() else {
            return PlayerInput::default();
        };
        let position = player.transform().position;
        let target = if player.transform().distance_from_center() > self.home_radius {
            Vec3::ZERO
        } else {
            nearest_bot(sim, position).unwrap_or(Vec3::ZERO)
        };
        self.steer(player, target)
    }

    fn steer(&self, player: &Ship, target: Vec3) -> PlayerInput {
        let transform = player.transform();
        let offset = target - transform.position;
        let Some(direction) = offset.try_normalize() else {
            return PlayerInput::default();
        };

        // Forward is -Z, left is -X, up is +Y in the ship frame.
        let local = transform.orientation.inverse() * direction;
        let angle = local.dot(Vec3::NEG_Z).clamp(-1.0, 1.0).acos();
        let yaw = if local.z > 0.0 && local.x.abs() < 0.1 {
            // Dead astern: pick a side and swing round.
            1.0
        } else {
            (-local.x * STICK_GAIN).clamp(-1.0, 1.0)
        };

        PlayerInput {
            pitch: (local.y * STICK_GAIN).clamp(-1.0, 1.0),
            yaw,
            thrust: angle < self.thrust_cone,
            boost: angle < self.boost_cone
                && offset.length() > self.boost_distance
                && player.body().boost_status().cooldown_remaining <= 0.0,
        }
    }
}

fn nearest_bot(sim: &Simulation, position: Vec3) -> Option<Vec3> {
    sim.state()
        .ships()
        .filter(|ship| ship.is_bot())
        .map(|ship| ship.transform().position)
        .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)))
}
