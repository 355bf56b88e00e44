//! Bot decision making.
//!
//! A [`BehaviorController`] pilots one bot through the same [`RigidBody`]
//! contract the player uses: it turns the ship, engages thrust and requests
//! boost. Decisions are time gated: the controller only re-evaluates its
//! [`BehaviorState`] every `state_update_interval` seconds, while steering
//! toward the current target runs every tick.
//!
//! # Policies
//!
//! What a bot does between boundary checks is delegated to a
//! [`BehaviorPolicy`]:
//!
//! - [`PursuitPolicy`]: chase the nearest ship, hold the centre when alone
//! - [`OrbitPolicy`]: circle the centre at constant speed, pausing periodically
//!
//! The danger-zone override is shared and checked every tick, not only at
//! evaluations. A bot whose projected distance from the centre (its current
//! distance plus `danger_lookahead` seconds of outward drift) exceeds the
//! safety threshold switches to [`BehaviorState::Avoid`] and heads for the
//! origin regardless of what its policy wants, staying there until it is back
//! inside the recovery radius.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use safezone_core::behavior::{BehaviorController, BehaviorState};
//! use safezone_core::config::{BehaviorConfig, PhysicsConfig};
//! use safezone_core::entity::{ShipId, Transform};
//! use safezone_core::physics::RigidBody;
//!
//! let id = ShipId::new(1);
//! let mut controller = BehaviorController::new(id, &BehaviorConfig::default(), 40.0);
//! let mut transform = Transform::at_position(Vec3::new(45.0, 0.0, 0.0));
//! let mut body = RigidBody::new(id, &PhysicsConfig::default(), 50.0);
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//!
//! controller.update(&mut transform, &mut body, &[], &mut rng, 1.0 / 60.0);
//! assert_eq!(controller.state(), BehaviorState::Avoid);
//! assert_eq!(controller.target(), Vec3::ZERO);
//! ```

pub mod orbit;
pub mod pursuit;
pub mod steering;

use std::fmt;

use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{BehaviorConfig, PolicyKind};
use crate::entity::{ShipId, Transform};
use crate::physics::RigidBody;

pub use orbit::OrbitPolicy;
pub use pursuit::PursuitPolicy;

// =============================================================================
// States and inputs
// =============================================================================

/// What a bot is currently trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Orbiting the centre at cruise speed.
    Moving,
    /// Coasting to a halt between orbit legs.
    Stopped,
    /// Chasing another ship.
    Attack,
    /// Alone in the arena, holding near the centre.
    StayCenter,
    /// Beyond the safety threshold, heading home.
    Avoid,
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moving => write!(f, "Moving"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Attack => write!(f, "Attack"),
            Self::StayCenter => write!(f, "StayCenter"),
            Self::Avoid => write!(f, "Avoid"),
        }
    }
}

/// Another ship as seen by a bot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// The other ship.
    pub id: ShipId,
    /// Its position.
    pub position: Vec3,
    /// Its velocity.
    pub velocity: Vec3,
}

/// Everything a policy needs to choose a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Situation {
    /// The bot's position.
    pub position: Vec3,
    /// The bot's velocity.
    pub velocity: Vec3,
    /// The bot's distance from the arena centre.
    pub distance_from_center: f32,
    /// Closest other ship, if any.
    pub nearest: Option<Contact>,
    /// Aim point derived from `nearest` (lead, jitter, clamped to the safe side
    /// of the threshold). Present exactly when `nearest` is.
    pub acquired_target: Option<Vec3>,
}

/// Outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// State to run until the next evaluation.
    pub state: BehaviorState,
    /// Point the state steers relative to.
    pub target: Vec3,
}

// =============================================================================
// BehaviorPolicy
// =============================================================================

/// A swappable bot strategy.
///
/// Policies choose a state at each evaluation and steer the ship every tick
/// for every state except [`BehaviorState::Avoid`], which the controller
/// handles itself.
pub trait BehaviorPolicy: fmt::Debug + Send {
    /// Which policy this is.
    fn kind(&self) -> PolicyKind;

    /// State a freshly spawned bot starts in.
    fn initial_state(&self) -> BehaviorState;

    /// Places a freshly spawned bot. Default leaves it untouched.
    fn prepare_spawn(&mut self, _transform: &mut Transform, _body: &mut RigidBody) {}

    /// Advances policy timers. Returns a new state when one fires.
    fn advance(&mut self, _dt: f32) -> Option<BehaviorState> {
        None
    }

    /// Chooses the state and target from the current situation.
    fn evaluate(&mut self, situation: &Situation) -> Decision;

    /// Applies one tick of steering for `decision`.
    fn steer(&mut self, decision: &Decision, transform: &mut Transform, body: &mut RigidBody, dt: f32);
}

/// Creates the policy selected by `kind`.
#[must_use]
pub fn make_policy(kind: PolicyKind, config: &BehaviorConfig) -> Box<dyn BehaviorPolicy> {
    match kind {
        PolicyKind::Pursuit => Box::new(PursuitPolicy::new(config)),
        PolicyKind::Orbit => Box::new(OrbitPolicy::new(&config.orbit)),
    }
}

/// Closest contact to `position`, ignoring `own`. Ties go to the earlier contact.
#[must_use]
pub fn nearest_contact(own: ShipId, position: Vec3, contacts: &[Contact]) -> Option<Contact> {
    let mut best: Option<(f32, Contact)> = None;
    for contact in contacts.iter().filter(|c| c.id != own) {
        let distance_sq = contact.position.distance_squared(position);
        if best.map_or(true, |(d, _)| distance_sq < d) {
            best = Some((distance_sq, *contact));
        }
    }
    best.map(|(_, contact)| contact)
}

// =============================================================================
// BehaviorController
// =============================================================================

/// Time-gated state machine driving one bot.
#[derive(Debug)]
pub struct BehaviorController {
    id: ShipId,
    state: BehaviorState,
    target: Vec3,
    evaluation_timer: f32,
    config: BehaviorConfig,
    safety_threshold: f32,
    policy: Box<dyn BehaviorPolicy>,
}

impl BehaviorController {
    /// Creates a controller using the policy named in `config`.
    ///
    /// # Arguments
    ///
    /// * `id` - The bot's ship (excluded from its own contacts)
    /// * `config` - Behavior tuning
    /// * `safety_threshold` - Danger radius that triggers [`BehaviorState::Avoid`]
    #[must_use]
    pub fn new(id: ShipId, config: &BehaviorConfig, safety_threshold: f32) -> Self {
        Self::with_policy(id, config, safety_threshold, make_policy(config.policy, config))
    }

    /// Creates a controller with an explicit policy.
    #[must_use]
    pub fn with_policy(
        id: ShipId,
        config: &BehaviorConfig,
        safety_threshold: f32,
        policy: Box<dyn BehaviorPolicy>,
    ) -> Self {
        Self {
            id,
            state: policy.initial_state(),
            target: Vec3::ZERO,
            evaluation_timer: 0.0,
            config: config.clone(),
            safety_threshold,
            policy,
        }
    }

    /// The bot this controller drives.
    #[must_use]
    pub const fn id(&self) -> ShipId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BehaviorState {
        self.state
    }

    /// Current target point.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// The active policy.
    #[must_use]
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// Seconds until the next evaluation.
    #[must_use]
    pub fn evaluation_timer(&self) -> f32 {
        self.evaluation_timer
    }

    /// Lets the policy place a freshly spawned bot.
    pub fn prepare_spawn(&mut self, transform: &mut Transform, body: &mut RigidBody) {
        self.policy.prepare_spawn(transform, body);
    }

    /// Runs one tick: timers, evaluation when due, then steering.
    ///
    /// # Arguments
    ///
    /// * `transform` - The bot's transform (turned in place)
    /// * `body` - The bot's body (thrust, boost and velocity commands)
    /// * `contacts` - Every other ship; the bot's own entry is ignored
    /// * `rng` - Source for target jitter
    /// * `dt` - Tick length in seconds
    pub fn update(
        &mut self,
        transform: &mut Transform,
        body: &mut RigidBody,
        contacts: &[Contact],
        rng: &mut dyn RngCore,
        dt: f32,
    ) {
        if let Some(phase) = self.policy.advance(dt) {
            if self.state != BehaviorState::Avoid {
                self.transition(phase, self.target);
            }
        }

        if self.state != BehaviorState::Avoid
            && self.projected_distance(transform, body) > self.safety_threshold
        {
            self.transition(BehaviorState::Avoid, Vec3::ZERO);
        }

        self.evaluation_timer -= dt;
        if self.evaluation_timer <= 0.0 {
            self.evaluation_timer = self.config.state_update_interval;
            self.evaluate(transform, body, contacts, rng);
        }

        if self.state == BehaviorState::Avoid {
            self.steer_home(transform, body, dt);
        } else {
            let decision = Decision {
                state: self.state,
                target: self.target,
            };
            self.policy.steer(&decision, transform, body, dt);
        }
    }

    fn evaluate(
        &mut self,
        transform: &Transform,
        body: &RigidBody,
        contacts: &[Contact],
        rng: &mut dyn RngCore,
    ) {
        let position = transform.position;
        let distance_from_center = position.length();

        let in_danger = self.projected_distance(transform, body) > self.safety_threshold
            || (self.state == BehaviorState::Avoid
                && distance_from_center > self.config.recovery_radius);
        if in_danger {
            self.transition(BehaviorState::Avoid, Vec3::ZERO);
            return;
        }

        let nearest = nearest_contact(self.id, position, contacts);
        let acquired_target = nearest.map(|contact| self.acquire_target(&contact, rng));
        let situation = Situation {
            position,
            velocity: body.velocity(),
            distance_from_center,
            nearest,
            acquired_target,
        };

        let decision = self.policy.evaluate(&situation);
        self.transition(decision.state, decision.target);
    }

    /// Distance from the centre after `danger_lookahead` seconds of the
    /// current outward drift. Inward and tangential motion count as zero.
    fn projected_distance(&self, transform: &Transform, body: &RigidBody) -> f32 {
        let position = transform.position;
        let outward = body.velocity().dot(position.normalize_or_zero()).max(0.0);
        position.length() + outward * self.config.danger_lookahead
    }

    /// Aim point for `contact`: its predicted position plus jitter, pulled
    /// inside the safety threshold.
    fn acquire_target(&self, contact: &Contact, rng: &mut dyn RngCore) -> Vec3 {
        let predicted = contact.position + contact.velocity * self.config.lead_time;
        let j = self.config.target_jitter;
        let jitter = Vec3::new(
            rng.gen_range(-j..=j),
            rng.gen_range(-j..=j),
            rng.gen_range(-j..=j),
        );
        (predicted + jitter).clamp_length_max(self.safety_threshold)
    }

    fn transition(&mut self, state: BehaviorState, target: Vec3) {
        if state != self.state {
            trace!(bot = %self.id, from = %self.state, to = %state, "bot state transition");
        }
        self.state = state;
        self.target = target;
    }

    /// Turns for the centre and brakes any outward drift. Boost only fires
    /// while the bot is not yet heading inward, and thrust stops once the
    /// inward speed reaches `max_speed`, so the bot never overshoots into the
    /// far side of the danger zone.
    fn steer_home(&self, transform: &mut Transform, body: &mut RigidBody, dt: f32) {
        let angle = steering::turn_toward(transform, Vec3::ZERO, self.config.turn_rate * dt);
        let inward = -body.velocity().dot(transform.position.normalize_or_zero());
        if angle < self.config.avoid_thrust_cone && inward < self.config.max_speed {
            body.start_thrust();
        } else {
            body.stop_thrust();
        }
        if angle < self.config.boost_cone && inward <= 0.0 {
            body.try_boost();
        }
    }
}
