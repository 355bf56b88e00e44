//! Pairwise ship-ship collision response.
//!
//! Ships are equal-mass spheres. A contact exchanges an impulse along the
//! contact normal (scaled by the coefficient of restitution), pushes the two
//! spheres apart by half the overlap each and starts camera shake on both.
//!
//! A pair that just collided is debounced for `collision_debounce` seconds of
//! simulation time so overlapping spheres don't resolve on consecutive ticks.

use glam::Vec3;

use crate::entity::Transform;

use super::RigidBody;

impl RigidBody {
    /// Resolves a collision between this body and `other`.
    ///
    /// Both bodies and both transforms are updated in place. Returns `true` if
    /// a collision was resolved.
    ///
    /// Nothing happens (and `false` is returned) when:
    /// - either body is out of bounds
    /// - the spheres don't overlap
    /// - the pair already collided within the debounce window
    /// - the bodies are separating
    /// - the centres coincide and the bodies have no relative velocity
    ///
    /// # Arguments
    ///
    /// * `transform_a` - Transform of this body's ship
    /// * `other` - The other body
    /// * `transform_b` - Transform of the other ship
    /// * `now` - Simulation time in seconds
    pub fn check_collision(
        &mut self,
        transform_a: &mut Transform,
        other: &mut RigidBody,
        transform_b: &mut Transform,
        now: f64,
    ) -> bool {
        if self.is_out_of_bounds() || other.is_out_of_bounds() {
            return false;
        }

        let offset = transform_a.position - transform_b.position;
        let distance = offset.length();
        let contact_distance = self.tuning.ship_radius + other.tuning.ship_radius;
        if distance >= contact_distance {
            return false;
        }

        self.prune_contacts(now);
        other.prune_contacts(now);
        if self.last_contact_with(other.id).is_some() || other.last_contact_with(self.id).is_some() {
            return false;
        }

        let relative_velocity = self.velocity - other.velocity;
        let Some(normal) = contact_normal(offset, relative_velocity) else {
            return false;
        };

        let closing = relative_velocity.dot(normal);
        if closing >= 0.0 {
            return false;
        }

        let restitution = self.tuning.restitution;
        let j = -(1.0 + restitution) * closing;
        let impulse = normal * (j / 2.0);
        self.velocity += impulse;
        other.velocity -= impulse;

        let correction = normal * ((contact_distance - distance) / 2.0);
        transform_a.position += correction;
        transform_b.position -= correction;

        self.start_shake();
        other.start_shake();
        self.record_contact(other.id, now);
        other.record_contact(self.id, now);
        true
    }
}

/// Unit normal pointing from `b` to `a`.
///
/// Coincident centres fall back to the direction opposing the relative
/// velocity. `None` when that is zero too.
fn contact_normal(offset: Vec3, relative_velocity: Vec3) -> Option<Vec3> {
    let normal = offset.normalize_or_zero();
    if normal != Vec3::ZERO {
        return Some(normal);
    }
    let fallback = (-relative_velocity).normalize_or_zero();
    (fallback != Vec3::ZERO).then_some(fallback)
}
