//! Rotation helpers shared by the bot policies.
//!
//! All helpers degrade to "no rotation" on zero-length inputs or NaN angles.

use glam::{Quat, Vec3};

use crate::entity::Transform;

/// Angle between two directions in radians, `0.0` if either is zero.
#[must_use]
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return 0.0;
    }
    let angle = a.dot(b).clamp(-1.0, 1.0).acos();
    if angle.is_nan() {
        0.0
    } else {
        angle
    }
}

/// Unit axis that rotates `from` toward `to`.
///
/// Parallel and antiparallel directions have no unique axis; any axis
/// orthogonal to `from` is returned instead.
#[must_use]
pub fn rotation_axis(from: Vec3, to: Vec3) -> Vec3 {
    let axis = from.cross(to).normalize_or_zero();
    if axis != Vec3::ZERO {
        return axis;
    }
    let from = from.normalize_or_zero();
    if from == Vec3::ZERO {
        Vec3::Y
    } else {
        from.any_orthonormal_vector()
    }
}

/// Turns `transform` toward `target` by at most `max_step` radians.
///
/// The rotation is about an arena-space axis, so the ship never snaps.
/// Returns the angle left between the nose and the target after turning.
pub fn turn_toward(transform: &mut Transform, target: Vec3, max_step: f32) -> f32 {
    let forward = transform.forward();
    let to_target = (target - transform.position).normalize_or_zero();
    if to_target == Vec3::ZERO {
        return 0.0;
    }

    let angle = angle_between(forward, to_target);
    if angle <= f32::EPSILON {
        return 0.0;
    }

    let step = angle.min(max_step.max(0.0));
    transform.rotate_world(rotation_axis(forward, to_target), step);
    angle - step
}

/// Rotates `vector` toward `ideal` by `fraction` of the angle between them.
///
/// Length is preserved.
#[must_use]
pub fn rotate_toward(vector: Vec3, ideal: Vec3, fraction: f32) -> Vec3 {
    let angle = angle_between(vector, ideal);
    if angle <= f32::EPSILON {
        return vector;
    }
    let axis = rotation_axis(vector, ideal);
    Quat::from_axis_angle(axis, angle * fraction) * vector
}

/// Direction of travel for a clockwise orbit (seen from +Y) through `position`.
///
/// Falls back to `+X` on the Y axis, where the tangent is undefined.
#[must_use]
pub fn orbit_tangent(position: Vec3) -> Vec3 {
    let tangent = position.normalize_or_zero().cross(Vec3::Y).normalize_or_zero();
    if tangent == Vec3::ZERO {
        Vec3::X
    } else {
        tangent
    }
}
