//! Orbit policy: circle the centre in alternating legs.
//!
//! The bot flies a horizontal circle around the arena centre at a fixed cruise
//! speed for `move_phase` seconds, then coasts to a halt for `stop_phase`
//! seconds, and repeats. Instead of thrusting, it commands its velocity
//! directly and turns its hull to face the direction of travel.
//!
//! When knocked off course (the position jumps more than a tick of cruise
//! travel allows) the bot stops steering until physics has bled its speed
//! below half the cruise speed. A ship that wanders inside `ram_radius` pulls
//! the bot off its circle and straight at the intruder.

use glam::Vec3;

use crate::config::{OrbitConfig, PolicyKind};
use crate::entity::Transform;
use crate::physics::RigidBody;

use super::steering::{angle_between, orbit_tangent, rotate_toward, turn_toward};
use super::{BehaviorPolicy, BehaviorState, Decision, Situation};

/// Heading error below which the velocity is left alone.
const ALIGNED_ANGLE: f32 = 0.01;

/// Below this speed the hull keeps its current heading.
const FACING_MIN_SPEED: f32 = 0.1;

/// Constant-speed orbiting strategy.
#[derive(Debug, Clone)]
pub struct OrbitPolicy {
    config: OrbitConfig,
    phase: BehaviorState,
    phase_timer: f32,
    recovering: bool,
    last_position: Option<Vec3>,
    ramming: bool,
}

impl OrbitPolicy {
    /// Creates an orbit policy, starting in the moving phase.
    #[must_use]
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            config: config.clone(),
            phase: BehaviorState::Moving,
            phase_timer: config.move_phase,
            recovering: false,
            last_position: None,
            ramming: false,
        }
    }

    /// Current leg of the orbit.
    #[must_use]
    pub fn phase(&self) -> BehaviorState {
        self.phase
    }

    /// Returns `true` while steering is suspended after a knock.
    #[must_use]
    pub fn is_recovering(&self) -> bool {
        self.recovering
    }

    fn steer_moving(&self, target: Vec3, transform: &Transform, body: &mut RigidBody) {
        let position = transform.position;
        let ideal = if self.ramming {
            let to_target = (target - position).normalize_or_zero();
            if to_target == Vec3::ZERO {
                orbit_tangent(position)
            } else {
                to_target
            }
        } else {
            orbit_tangent(position)
        };

        let velocity = body.velocity();
        let direction = if velocity.normalize_or_zero() == Vec3::ZERO {
            ideal
        } else {
            let adjusted = if angle_between(velocity, ideal) > ALIGNED_ANGLE {
                rotate_toward(velocity, ideal, self.config.direction_adjustment_rate)
            } else {
                velocity
            };
            adjusted.normalize_or_zero()
        };
        body.set_velocity(direction * self.config.move_speed);
    }

    fn face_velocity(&self, transform: &mut Transform, body: &RigidBody) {
        let velocity = body.velocity();
        if velocity.length() <= FACING_MIN_SPEED {
            return;
        }
        let ahead = transform.position + velocity;
        turn_toward(transform, ahead, self.config.facing_step);
    }
}

impl BehaviorPolicy for OrbitPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Orbit
    }

    fn initial_state(&self) -> BehaviorState {
        BehaviorState::Moving
    }

    fn prepare_spawn(&mut self, transform: &mut Transform, body: &mut RigidBody) {
        if transform.position == Vec3::ZERO {
            transform.position = Vec3::new(self.config.default_radius, 0.0, 0.0);
        }
        let direction = orbit_tangent(transform.position);
        *transform = Transform::facing(transform.position, direction);
        body.set_velocity(direction * self.config.move_speed);
        self.last_position = Some(transform.position);
    }

    fn advance(&mut self, dt: f32) -> Option<BehaviorState> {
        self.phase_timer -= dt;
        if self.phase_timer > 0.0 {
            return None;
        }
        if self.phase == BehaviorState::Moving {
            self.phase = BehaviorState::Stopped;
            self.phase_timer = self.config.stop_phase;
        } else {
            self.phase = BehaviorState::Moving;
            self.phase_timer = self.config.move_phase;
        }
        Some(self.phase)
    }

    fn evaluate(&mut self, situation: &Situation) -> Decision {
        let ram = situation
            .nearest
            .filter(|contact| contact.position.distance(situation.position) < self.config.ram_radius)
            .and(situation.acquired_target);
        self.ramming = ram.is_some();
        Decision {
            state: self.phase,
            target: ram.unwrap_or(Vec3::ZERO),
        }
    }

    fn steer(&mut self, decision: &Decision, transform: &mut Transform, body: &mut RigidBody, _dt: f32) {
        body.stop_thrust();

        let position = transform.position;
        if let Some(last) = self.last_position {
            if !self.recovering && position.distance(last) > self.config.move_speed / 30.0 {
                self.recovering = true;
            }
        }
        self.last_position = Some(position);

        if self.recovering {
            if body.speed() < self.config.move_speed * 0.5 {
                self.recovering = false;
            }
        } else {
            match decision.state {
                BehaviorState::Moving => self.steer_moving(decision.target, transform, body),
                BehaviorState::Stopped => {
                    body.set_velocity(body.velocity() * self.config.stop_damping);
                }
                _ => {}
            }
        }

        self.face_velocity(transform, body);
    }
}
