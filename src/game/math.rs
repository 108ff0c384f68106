//! Planar math helpers.
//!
//! Units live in 3D but move on the XZ plane. Grid and steering code works in
//! 2D where `Vec2::x` maps to world X and `Vec2::y` maps to world Z.

use bevy::prelude::*;

/// Squared length below which a vector is treated as zero.
pub const DIRECTION_EPSILON_SQ: f32 = 1.0e-4;

/// Project a world position onto the movement plane.
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lift a planar vector back into world space with the given height.
#[inline]
pub fn lift(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}

/// True when the vector is too short to carry a direction.
#[inline]
pub fn is_near_zero(v: Vec2) -> bool {
    v.length_squared() < DIRECTION_EPSILON_SQ
}

/// Rotation whose local +Z axis points along `heading`.
///
/// Returns `None` for degenerate headings so callers can keep their current
/// orientation instead of snapping to an arbitrary one.
pub fn heading_rotation(heading: Vec2) -> Option<Quat> {
    if is_near_zero(heading) {
        return None;
    }
    Some(Quat::from_rotation_y(heading.x.atan2(heading.y)))
}

/// Local +Z axis of a rotation projected onto the plane.
pub fn forward(rotation: Quat) -> Vec2 {
    planar(rotation * Vec3::Z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_rotation_points_forward_along_heading() {
        for heading in [Vec2::X, Vec2::Y, Vec2::new(-1.0, 1.0).normalize(), Vec2::NEG_Y] {
            let rotation = heading_rotation(heading).unwrap();
            let fwd = forward(rotation);
            assert!((fwd - heading).length() < 1.0e-4, "heading {heading:?} gave forward {fwd:?}");
        }
    }

    #[test]
    fn degenerate_heading_has_no_rotation() {
        assert!(heading_rotation(Vec2::ZERO).is_none());
        assert!(heading_rotation(Vec2::splat(1.0e-4)).is_none());
    }

    #[test]
    fn planar_round_trip_keeps_height() {
        let p = Vec3::new(3.0, 7.0, -2.0);
        assert_eq!(lift(planar(p), p.y), p);
    }
}
