//! Rigid-body motion for a single ship.
//!
//! A [`RigidBody`] owns a ship's velocity, thrust/boost intent, boost cooldown,
//! camera shake timer and out-of-bounds flag. It integrates a [`Transform`] it
//! is lent once per fixed tick and resolves collisions against other bodies
//! (see [`collision`]).
//!
//! Both the player and the bots drive their ship through the same contract:
//! [`RigidBody::start_thrust`], [`RigidBody::stop_thrust`] and
//! [`RigidBody::try_boost`].
//!
//! # Integration order
//!
//! 1. Boost cooldown countdown (boost ends when it reaches zero)
//! 2. Thrust along the ship's forward axis
//! 3. Linear drag: `velocity *= 1 - drag * dt`
//! 4. `position += velocity * dt`
//! 5. Shake countdown
//! 6. Safe zone test
//!
//! # Example
//!
//! ```
//! use safezone_core::config::PhysicsConfig;
//! use safezone_core::entity::{ShipId, Transform};
//! use safezone_core::physics::RigidBody;
//!
//! let mut body = RigidBody::new(ShipId::new(1), &PhysicsConfig::default(), 50.0);
//! let mut transform = Transform::default();
//!
//! body.start_thrust();
//! assert!(body.update(&mut transform, 1.0 / 60.0));
//! assert!(body.velocity().z < 0.0);
//! ```

pub mod collision;

use bitflags::bitflags;
use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::entity::{ShipId, Transform};

bitflags! {
    /// Motion status of a rigid body.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BodyFlags: u8 {
        /// Thrust is applied each tick.
        const THRUSTING = 1 << 0;
        /// Boost thrust replaces normal thrust.
        const BOOSTING = 1 << 1;
        /// The body left the safe zone on its last update.
        const OUT_OF_BOUNDS = 1 << 2;
    }
}

/// Boost readiness, as shown by a HUD boost bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostStatus {
    /// Boost thrust is currently in effect.
    pub active: bool,
    /// Seconds until boost can be activated again.
    pub cooldown_remaining: f32,
    /// `1.0` when ready, falling to `0.0` right after activation.
    pub cooldown_fraction: f32,
}

/// Physics state of one ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    id: ShipId,
    velocity: Vec3,
    flags: BodyFlags,
    boost_cooldown_remaining: f32,
    shake_time_remaining: f32,
    /// Last resolved collision time per partner.
    recent_contacts: Vec<(ShipId, f64)>,
    tuning: PhysicsConfig,
    safe_zone_radius: f32,
}

impl RigidBody {
    /// Creates a body at rest for ship `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - Ship the body belongs to (used to debounce collision pairs)
    /// * `tuning` - Thrust, drag, boost and collision constants
    /// * `safe_zone_radius` - Distance from the origin beyond which the body is out of bounds
    #[must_use]
    pub fn new(id: ShipId, tuning: &PhysicsConfig, safe_zone_radius: f32) -> Self {
        Self {
            id,
            velocity: Vec3::ZERO,
            flags: BodyFlags::empty(),
            boost_cooldown_remaining: 0.0,
            shake_time_remaining: 0.0,
            recent_contacts: Vec::new(),
            tuning: tuning.clone(),
            safe_zone_radius,
        }
    }

    /// Returns the owning ship's id.
    #[must_use]
    pub const fn id(&self) -> ShipId {
        self.id
    }

    /// Current velocity (units/s).
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Overwrites the velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Current speed (units/s).
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Current status flags.
    #[must_use]
    pub const fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Returns `true` while thrust is engaged.
    #[must_use]
    pub fn is_thrusting(&self) -> bool {
        self.flags.contains(BodyFlags::THRUSTING)
    }

    /// Returns `true` while boost thrust is in effect.
    #[must_use]
    pub fn is_boosting(&self) -> bool {
        self.flags.contains(BodyFlags::BOOSTING)
    }

    /// Returns `true` if the last update left the body outside the safe zone.
    #[must_use]
    pub fn is_out_of_bounds(&self) -> bool {
        self.flags.contains(BodyFlags::OUT_OF_BOUNDS)
    }

    /// Tests a position against the safe zone this body lives in.
    #[must_use]
    pub fn is_out_of_safe_zone(&self, position: Vec3) -> bool {
        position.length() > self.safe_zone_radius
    }

    /// Seconds until boost is available again.
    #[must_use]
    pub const fn boost_cooldown_remaining(&self) -> f32 {
        self.boost_cooldown_remaining
    }

    /// Seconds of camera shake left.
    #[must_use]
    pub const fn shake_time_remaining(&self) -> f32 {
        self.shake_time_remaining
    }

    /// The constants this body integrates with.
    #[must_use]
    pub const fn tuning(&self) -> &PhysicsConfig {
        &self.tuning
    }

    /// Boost readiness for display.
    #[must_use]
    pub fn boost_status(&self) -> BoostStatus {
        let cooldown_fraction = if self.tuning.boost_cooldown > 0.0 {
            (1.0 - self.boost_cooldown_remaining / self.tuning.boost_cooldown).clamp(0.0, 1.0)
        } else {
            1.0
        };
        BoostStatus {
            active: self.is_boosting(),
            cooldown_remaining: self.boost_cooldown_remaining,
            cooldown_fraction,
        }
    }

    /// Engages thrust. Idempotent.
    pub fn start_thrust(&mut self) {
        self.flags.insert(BodyFlags::THRUSTING);
    }

    /// Disengages thrust. Idempotent.
    pub fn stop_thrust(&mut self) {
        self.flags.remove(BodyFlags::THRUSTING);
    }

    /// Activates boost if the cooldown has elapsed.
    ///
    /// On success boost stays active until the cooldown runs out again.
    /// Returns `false` (and changes nothing) while cooling down.
    pub fn try_boost(&mut self) -> bool {
        if self.boost_cooldown_remaining > 0.0 {
            return false;
        }
        self.flags.insert(BodyFlags::BOOSTING);
        self.boost_cooldown_remaining = self.tuning.boost_cooldown;
        true
    }

    /// Advances the body by one tick, moving `transform`.
    ///
    /// Returns `true` if the body is still inside the safe zone.
    pub fn update(&mut self, transform: &mut Transform, dt: f32) -> bool {
        if self.boost_cooldown_remaining > 0.0 {
            self.boost_cooldown_remaining = (self.boost_cooldown_remaining - dt).max(0.0);
            if self.boost_cooldown_remaining == 0.0 {
                self.flags.remove(BodyFlags::BOOSTING);
            }
        }

        if self.is_thrusting() {
            let thrust = if self.is_boosting() {
                self.tuning.boost_thrust
            } else {
                self.tuning.normal_thrust
            };
            let forward = transform.forward().normalize_or_zero();
            self.velocity += forward * thrust * dt;
        }

        self.velocity *= (1.0 - self.tuning.drag_coefficient * dt).max(0.0);
        transform.position += self.velocity * dt;

        self.shake_time_remaining = (self.shake_time_remaining - dt).max(0.0);

        let out = self.is_out_of_safe_zone(transform.position);
        self.flags.set(BodyFlags::OUT_OF_BOUNDS, out);
        !out
    }

    /// Random camera offset for the current shake.
    ///
    /// Zero when no shake is active. Each component lies within
    /// `±amplitude * progress / 2`, where progress falls linearly from 1 to 0
    /// over the shake window.
    pub fn shake_offset(&self, rng: &mut dyn RngCore) -> Vec3 {
        if self.shake_time_remaining <= 0.0 || self.tuning.shake_duration <= 0.0 {
            return Vec3::ZERO;
        }
        let progress = (self.shake_time_remaining / self.tuning.shake_duration).min(1.0);
        let scale = self.tuning.shake_amplitude * progress;
        Vec3::new(
            (rng.gen::<f32>() - 0.5) * scale,
            (rng.gen::<f32>() - 0.5) * scale,
            (rng.gen::<f32>() - 0.5) * scale,
        )
    }

    /// Returns the body to rest: zero velocity, no flags, no timers.
    pub fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
        self.flags = BodyFlags::empty();
        self.boost_cooldown_remaining = 0.0;
        self.shake_time_remaining = 0.0;
        self.recent_contacts.clear();
    }

    /// Starts a fresh shake window.
    fn start_shake(&mut self) {
        self.shake_time_remaining = self.tuning.shake_duration;
    }

    /// Time of the last resolved collision with `other`, if remembered.
    fn last_contact_with(&self, other: ShipId) -> Option<f64> {
        self.recent_contacts
            .iter()
            .find(|(id, _)| *id == other)
            .map(|(_, at)| *at)
    }

    fn record_contact(&mut self, other: ShipId, now: f64) {
        if let Some(entry) = self.recent_contacts.iter_mut().find(|(id, _)| *id == other) {
            entry.1 = now;
        } else {
            self.recent_contacts.push((other, now));
        }
    }

    /// Number of partners still inside the debounce window.
    #[must_use]
    pub fn recent_contact_count(&self) -> usize {
        self.recent_contacts.len()
    }

    /// Forgets contacts older than the debounce window.
    ///
    /// Called every tick so partners that stop overlapping, or leave the
    /// arena, do not linger.
    pub fn prune_contacts(&mut self, now: f64) {
        let window = f64::from(self.tuning.collision_debounce);
        self.recent_contacts.retain(|(_, at)| now - *at < window);
    }
}
