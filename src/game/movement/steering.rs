//! Pure steering math. Everything here works on the XZ plane as `Vec2`.

use bevy::prelude::*;

use crate::game::math::{heading_rotation, is_near_zero};

/// Separation push away from nearby allies.
///
/// Each neighbour closer than `radius` contributes a unit vector pointing
/// away from it, weighted by `((radius - d) / radius)^2`. The sum is
/// returned unnormalised.
pub fn separation(position: Vec2, neighbors: impl IntoIterator<Item = Vec2>, radius: f32) -> Vec2 {
    neighbors
        .into_iter()
        .map(|other| separation_term(position, other, radius))
        .sum()
}

/// One neighbour's share of [`separation`]. Coincident neighbours carry no
/// direction and contribute nothing.
#[inline]
pub fn separation_term(position: Vec2, other: Vec2, radius: f32) -> Vec2 {
    let offset = position - other;
    let distance = offset.length();
    if radius <= 0.0 || distance <= f32::EPSILON || distance >= radius {
        return Vec2::ZERO;
    }
    let falloff = (radius - distance) / radius;
    offset / distance * falloff * falloff
}

/// Movement direction before avoidance: the field sample when it carries
/// a direction, otherwise straight at the target.
pub fn base_direction(field_sample: Vec2, to_target: Vec2) -> Vec2 {
    if is_near_zero(field_sample) {
        to_target.normalize_or_zero()
    } else {
        field_sample.normalize()
    }
}

/// Blend a normalised separation push into a travel direction.
///
/// Falls back to the unblended direction when the two cancel out.
pub fn blend_avoidance(direction: Vec2, push: Vec2, strength: f32) -> Vec2 {
    if is_near_zero(push) || strength <= 0.0 {
        return direction;
    }
    (direction + push.normalize() * strength).normalize_or(direction)
}

/// Move `velocity` toward `desired`, changing it by at most `max_delta`.
pub fn steer(velocity: Vec2, desired: Vec2, max_delta: f32) -> Vec2 {
    velocity + (desired - velocity).clamp_length_max(max_delta.max(0.0))
}

/// Shrink speed by at most `max_delta`, never reversing direction.
pub fn brake(velocity: Vec2, max_delta: f32) -> Vec2 {
    let speed = velocity.length();
    if speed <= max_delta || speed <= f32::EPSILON {
        return Vec2::ZERO;
    }
    velocity * ((speed - max_delta) / speed)
}

/// Rotate toward `heading` by a slerp factor of `rate * dt`, capped at 1.
/// Degenerate headings keep the current rotation.
pub fn turn_toward(rotation: Quat, heading: Vec2, rate: f32, dt: f32) -> Quat {
    match heading_rotation(heading) {
        Some(target) => rotation.slerp(target, (rate * dt).clamp(0.0, 1.0)),
        None => rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separation_pushes_away_with_quadratic_falloff() {
        let push = separation(Vec2::ZERO, [Vec2::new(1.0, 0.0)], 2.0);
        assert!((push - Vec2::new(-0.25, 0.0)).length() < 1.0e-6);

        let closer = separation(Vec2::ZERO, [Vec2::new(0.5, 0.0)], 2.0);
        assert!(closer.length() > push.length());
    }

    #[test]
    fn separation_ignores_far_and_coincident_neighbors() {
        let push = separation(Vec2::ZERO, [Vec2::ZERO, Vec2::new(3.0, 0.0)], 2.0);
        assert_eq!(push, Vec2::ZERO);
    }

    #[test]
    fn base_direction_falls_back_to_target() {
        let dir = base_direction(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert_eq!(dir, Vec2::Y);

        let dir = base_direction(Vec2::new(0.3, 0.0), Vec2::new(0.0, 10.0));
        assert_eq!(dir, Vec2::X);
    }

    #[test]
    fn blend_keeps_direction_when_push_cancels_it() {
        let dir = blend_avoidance(Vec2::X, Vec2::NEG_X, 1.0);
        assert_eq!(dir, Vec2::X);

        let dir = blend_avoidance(Vec2::X, Vec2::Y, 0.7);
        assert!((dir.length() - 1.0).abs() < 1.0e-5);
        assert!(dir.x > 0.0 && dir.y > 0.0);
    }

    #[test]
    fn steer_limits_change_per_step() {
        let v = steer(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
        assert_eq!(v, Vec2::new(2.0, 0.0));

        let v = steer(Vec2::new(9.5, 0.0), Vec2::new(10.0, 0.0), 2.0);
        assert_eq!(v, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn brake_never_overshoots_zero() {
        let v = brake(Vec2::new(3.0, 4.0), 1.0);
        assert!((v.length() - 4.0).abs() < 1.0e-5);
        assert_eq!(brake(Vec2::new(0.5, 0.0), 1.0), Vec2::ZERO);
    }

    #[test]
    fn turn_toward_ignores_degenerate_heading() {
        let rotation = Quat::from_rotation_y(0.4);
        assert_eq!(turn_toward(rotation, Vec2::ZERO, 8.0, 0.1), rotation);
    }
}
