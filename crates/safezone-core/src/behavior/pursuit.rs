//! Pursuit policy: ram the nearest ship.
//!
//! With another ship in the arena the bot enters [`BehaviorState::Attack`],
//! turns toward the acquired aim point, thrusts once it is roughly lined up
//! and boosts when the target is well ahead and far away. Alone, it drifts
//! back to the centre ([`BehaviorState::StayCenter`]).
//!
//! Engines cut out above `max_speed` in every state. A bot going faster than
//! that cannot brake inside the band between the safety threshold and the
//! edge of the safe zone.

use glam::Vec3;

use crate::config::{BehaviorConfig, PolicyKind};
use crate::entity::Transform;
use crate::physics::RigidBody;

use super::steering::turn_toward;
use super::{BehaviorPolicy, BehaviorState, Decision, Situation};

/// Chase-the-nearest-ship strategy.
#[derive(Debug, Clone)]
pub struct PursuitPolicy {
    turn_rate: f32,
    thrust_cone: f32,
    boost_cone: f32,
    boost_distance: f32,
    stay_center_radius: f32,
    max_speed: f32,
}

impl PursuitPolicy {
    /// Creates a pursuit policy from the behavior tuning.
    #[must_use]
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            turn_rate: config.turn_rate,
            thrust_cone: config.thrust_cone,
            boost_cone: config.boost_cone,
            boost_distance: config.boost_distance,
            stay_center_radius: config.stay_center_radius,
            max_speed: config.max_speed,
        }
    }

    fn steer_attack(&self, target: Vec3, transform: &mut Transform, body: &mut RigidBody, dt: f32) {
        let angle = turn_toward(transform, target, self.turn_rate * dt);
        let below_cap = body.speed() < self.max_speed;
        if below_cap && angle < self.thrust_cone {
            body.start_thrust();
        } else {
            body.stop_thrust();
        }
        let distance = transform.position.distance(target);
        if below_cap && angle < self.boost_cone && distance > self.boost_distance {
            body.try_boost();
        }
    }

    fn steer_stay_center(&self, transform: &mut Transform, body: &mut RigidBody, dt: f32) {
        let angle = turn_toward(transform, Vec3::ZERO, self.turn_rate * dt);
        let drifting = transform.distance_from_center() > self.stay_center_radius;
        if drifting && angle < self.thrust_cone && body.speed() < self.max_speed {
            body.start_thrust();
        } else {
            body.stop_thrust();
        }
    }
}

impl BehaviorPolicy for PursuitPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Pursuit
    }

    fn initial_state(&self) -> BehaviorState {
        BehaviorState::StayCenter
    }

    fn evaluate(&mut self, situation: &Situation) -> Decision {
        match situation.acquired_target {
            Some(target) => Decision {
                state: BehaviorState::Attack,
                target,
            },
            None => Decision {
                state: BehaviorState::StayCenter,
                target: Vec3::ZERO,
            },
        }
    }

    fn steer(&mut self, decision: &Decision, transform: &mut Transform, body: &mut RigidBody, dt: f32) {
        match decision.state {
            BehaviorState::Attack => self.steer_attack(decision.target, transform, body, dt),
            BehaviorState::StayCenter => self.steer_stay_center(transform, body, dt),
            // Orbit states never come out of this policy.
            _ => body.stop_thrust(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Contact;
    use crate::config::PhysicsConfig;
    use crate::entity::ShipId;

    const DT: f32 = 1.0 / 60.0;

    fn setup(position: Vec3) -> (PursuitPolicy, Transform, RigidBody) {
        (
            PursuitPolicy::new(&BehaviorConfig::default()),
            Transform::at_position(position),
            RigidBody::new(ShipId::new(1), &PhysicsConfig::default(), 50.0),
        )
    }

    fn situation(acquired_target: Option<Vec3>) -> Situation {
        Situation {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            distance_from_center: 0.0,
            nearest: acquired_target.map(|position| Contact {
                id: ShipId::new(2),
                position,
                velocity: Vec3::ZERO,
            }),
            acquired_target,
        }
    }

    #[test]
    fn attacks_when_a_target_exists() {
        let mut policy = PursuitPolicy::new(&BehaviorConfig::default());
        let target = Vec3::new(3.0, 1.0, -2.0);
        let decision = policy.evaluate(&situation(Some(target)));
        assert_eq!(decision.state, BehaviorState::Attack);
        assert_eq!(decision.target, target);
    }

    #[test]
    fn stays_center_when_alone() {
        let mut policy = PursuitPolicy::new(&BehaviorConfig::default());
        let decision = policy.evaluate(&situation(None));
        assert_eq!(decision.state, BehaviorState::StayCenter);
        assert_eq!(decision.target, Vec3::ZERO);
    }

    #[test]
    fn attack_thrusts_and_boosts_when_lined_up_and_far() {
        let (mut policy, mut transform, mut body) = setup(Vec3::ZERO);
        let decision = Decision {
            state: BehaviorState::Attack,
            target: Vec3::new(0.0, 0.0, -30.0),
        };
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(body.is_thrusting());
        assert!(body.is_boosting());
    }

    #[test]
    fn attack_does_not_boost_when_close() {
        let (mut policy, mut transform, mut body) = setup(Vec3::ZERO);
        let decision = Decision {
            state: BehaviorState::Attack,
            target: Vec3::new(0.0, 0.0, -10.0),
        };
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(body.is_thrusting());
        assert!(!body.is_boosting());
    }

    #[test]
    fn attack_waits_for_the_turn() {
        let (mut policy, mut transform, mut body) = setup(Vec3::ZERO);
        let decision = Decision {
            state: BehaviorState::Attack,
            target: Vec3::new(0.0, 0.0, 30.0),
        };
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(!body.is_thrusting());

        // Turning into the thrust cone takes about 0.7 s.
        for _ in 0..70 {
            policy.steer(&decision, &mut transform, &mut body, DT);
        }
        assert!(body.is_thrusting());
    }

    #[test]
    fn attack_cuts_engines_above_max_speed() {
        let (mut policy, mut transform, mut body) = setup(Vec3::ZERO);
        body.set_velocity(Vec3::new(0.0, 0.0, -16.0));
        let decision = Decision {
            state: BehaviorState::Attack,
            target: Vec3::new(0.0, 0.0, -30.0),
        };
        body.start_thrust();
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(!body.is_thrusting());
        assert!(!body.is_boosting());

        body.set_velocity(Vec3::new(0.0, 0.0, -14.0));
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(body.is_thrusting());
    }

    #[test]
    fn attack_speed_settles_at_the_cap() {
        let (mut policy, mut transform, mut body) = setup(Vec3::ZERO);
        let decision = Decision {
            state: BehaviorState::Attack,
            target: Vec3::new(0.0, 0.0, -1000.0),
        };
        for _ in 0..600 {
            policy.steer(&decision, &mut transform, &mut body, DT);
            body.update(&mut transform, DT);
        }
        // One boosted tick can push past the cap by 40/60 u/s at most.
        assert!(body.speed() < 15.0 + 0.7, "speed {}", body.speed());
    }

    #[test]
    fn stay_center_drifts_freely_near_the_centre() {
        let (mut policy, mut transform, mut body) = setup(Vec3::new(0.0, 0.0, 5.0));
        let decision = Decision {
            state: BehaviorState::StayCenter,
            target: Vec3::ZERO,
        };
        body.start_thrust();
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(!body.is_thrusting());
    }

    #[test]
    fn stay_center_thrusts_home_from_afar() {
        let (mut policy, mut transform, mut body) = setup(Vec3::new(0.0, 0.0, 25.0));
        let decision = Decision {
            state: BehaviorState::StayCenter,
            target: Vec3::ZERO,
        };
        policy.steer(&decision, &mut transform, &mut body, DT);
        assert!(body.is_thrusting());
        assert!(!body.is_boosting());
    }
}
