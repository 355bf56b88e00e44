//! Ship identity and placement.
//!
//! - [`ShipId`]: unique, ordered identifier for a ship
//! - [`ShipKind`]: player or bot
//! - [`Transform`]: position and orientation in arena space
//! - [`Ship`]: a transform, a [`RigidBody`] and, for bots, a [`BehaviorController`]
//!
//! Arena space is right-handed with the origin at the centre of the safe zone.
//! A ship's nose points along its local `-Z` axis.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use safezone_core::entity::{ShipId, Transform};
//!
//! let transform = Transform::at_position(Vec3::new(3.0, 0.0, 4.0));
//! assert_eq!(transform.distance_from_center(), 5.0);
//! assert_eq!(transform.forward(), Vec3::NEG_Z);
//! assert!(ShipId::new(1) < ShipId::new(2));
//! ```

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::behavior::{BehaviorController, BehaviorState};
use crate::physics::RigidBody;

/// The player ship always carries this id.
pub const PLAYER_ID: ShipId = ShipId::new(0);

/// Unique identifier for a ship.
///
/// Ids are never reused within a simulation. They are ordered by numeric value,
/// which fixes the order ships are updated and collided in.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId(u64);

impl ShipId {
    /// Creates a new `ShipId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShipId({})", self.0)
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ShipId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ShipId> for u64 {
    fn from(id: ShipId) -> Self {
        id.0
    }
}

/// Who pilots a ship.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipKind {
    /// Driven by [`PlayerInput`](crate::simulation::PlayerInput).
    Player,
    /// Driven by a [`BehaviorController`].
    Bot,
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Bot => write!(f, "Bot"),
        }
    }
}

// =============================================================================
// Transform
// =============================================================================

/// Position and orientation of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the arena centre.
    pub position: Vec3,
    /// Rotation from ship-local to arena space. Kept normalized.
    pub orientation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Creates a transform from a position and orientation.
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    /// Creates a transform at `position` with the identity orientation.
    #[must_use]
    pub const fn at_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Creates a transform at `position` with the nose pointing along `direction`.
    ///
    /// A zero `direction` leaves the identity orientation.
    #[must_use]
    pub fn facing(position: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize_or_zero();
        let orientation = if direction == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::NEG_Z, direction)
        };
        Self {
            position,
            orientation,
        }
    }

    /// Unit vector the nose points along.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Unit vector out of the ship's right wing.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Unit vector out of the ship's canopy.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Distance from the arena centre.
    #[must_use]
    pub fn distance_from_center(&self) -> f32 {
        self.position.length()
    }

    /// Rotates about a ship-local axis.
    pub fn rotate_local(&mut self, axis: Vec3, angle: f32) {
        self.orientation = (self.orientation * Quat::from_axis_angle(axis, angle)).normalize();
    }

    /// Rotates about an arena-space axis.
    pub fn rotate_world(&mut self, axis: Vec3, angle: f32) {
        self.orientation = (Quat::from_axis_angle(axis, angle) * self.orientation).normalize();
    }
}

// =============================================================================
// Ship
// =============================================================================

/// A ship in the arena.
///
/// The ship owns its transform and lends it to its body and controller each
/// tick. Only bots carry a controller.
#[derive(Debug)]
pub struct Ship {
    id: ShipId,
    kind: ShipKind,
    pub(crate) transform: Transform,
    pub(crate) body: RigidBody,
    pub(crate) controller: Option<BehaviorController>,
    /// Thruster effect currently shown: `None` when detached, otherwise the boost flag.
    pub(crate) thruster_effect: Option<bool>,
}

impl Ship {
    /// Creates the player ship.
    #[must_use]
    pub fn new_player(transform: Transform, body: RigidBody) -> Self {
        Self {
            id: PLAYER_ID,
            kind: ShipKind::Player,
            transform,
            body,
            controller: None,
            thruster_effect: None,
        }
    }

    /// Creates a bot ship.
    #[must_use]
    pub fn new_bot(
        id: ShipId,
        transform: Transform,
        body: RigidBody,
        controller: BehaviorController,
    ) -> Self {
        Self {
            id,
            kind: ShipKind::Bot,
            transform,
            body,
            controller: Some(controller),
            thruster_effect: None,
        }
    }

    /// Returns the ship's identifier.
    #[must_use]
    pub const fn id(&self) -> ShipId {
        self.id
    }

    /// Returns who pilots the ship.
    #[must_use]
    pub const fn kind(&self) -> ShipKind {
        self.kind
    }

    /// Returns `true` for the player ship.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.kind, ShipKind::Player)
    }

    /// Returns `true` for bot ships.
    #[must_use]
    pub const fn is_bot(&self) -> bool {
        matches!(self.kind, ShipKind::Bot)
    }

    /// Returns the ship's transform.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the ship's rigid body.
    #[must_use]
    pub const fn body(&self) -> &RigidBody {
        &self.body
    }

    /// Returns the bot controller, if any.
    #[must_use]
    pub const fn controller(&self) -> Option<&BehaviorController> {
        self.controller.as_ref()
    }

    /// Current behavior state for bots.
    #[must_use]
    pub fn behavior_state(&self) -> Option<BehaviorState> {
        self.controller.as_ref().map(BehaviorController::state)
    }

    /// Mutable access to the transform.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Mutable access to the rigid body.
    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    mod ship_id_tests {
        use super::*;

        #[test]
        fn ordering_and_conversion() {
            let a = ShipId::new(3);
            let b: ShipId = 7u64.into();
            assert!(a < b);
            assert_eq!(u64::from(b), 7);
            assert_eq!(format!("{a:?}"), "ShipId(3)");
            assert_eq!(a.to_string(), "3");
        }

        #[test]
        fn player_id_is_zero() {
            assert_eq!(PLAYER_ID.as_u64(), 0);
        }
    }

    mod transform_tests {
        use super::*;

        #[test]
        fn default_faces_negative_z() {
            let t = Transform::default();
            assert!((t.forward() - Vec3::NEG_Z).length() < 1e-6);
            assert!((t.right() - Vec3::X).length() < 1e-6);
            assert!((t.up() - Vec3::Y).length() < 1e-6);
        }

        #[test]
        fn facing_points_nose() {
            let t = Transform::facing(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
            assert!((t.forward() - Vec3::Z).length() < 1e-5);
        }

        #[test]
        fn facing_zero_direction_is_identity() {
            let t = Transform::facing(Vec3::ONE, Vec3::ZERO);
            assert_eq!(t.orientation, Quat::IDENTITY);
            assert_eq!(t.position, Vec3::ONE);
        }

        #[test]
        fn local_yaw_turns_left() {
            let mut t = Transform::default();
            t.rotate_local(Vec3::Y, FRAC_PI_2);
            assert!((t.forward() - Vec3::NEG_X).length() < 1e-5);
        }

        #[test]
        fn world_rotation_keeps_unit_length() {
            let mut t = Transform::default();
            for _ in 0..1000 {
                t.rotate_world(Vec3::new(1.0, 2.0, 3.0).normalize(), 0.01);
            }
            assert!((t.orientation.length() - 1.0).abs() < 1e-5);
        }
    }
}
