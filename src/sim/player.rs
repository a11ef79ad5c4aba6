//! Player token movement

use glam::Vec2;

use crate::clamp_to_field;

/// Move the player by `delta`, keeping both axes inside the field
#[inline]
pub fn apply_delta(prev: Vec2, delta: Vec2) -> Vec2 {
    Vec2::new(clamp_to_field(prev.x + delta.x), clamp_to_field(prev.y + delta.y))
}

/// Whether a token at `pos` overlaps the player
#[inline]
pub fn is_hit(player: Vec2, pos: Vec2, hit_radius: f32) -> bool {
    player.distance(pos) < hit_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_delta_moves() {
        let next = apply_delta(Vec2::new(50.0, 80.0), Vec2::new(2.2, 0.0));
        assert!((next.x - 52.2).abs() < 1e-5);
        assert_eq!(next.y, 80.0);
    }

    #[test]
    fn test_apply_delta_clamps_both_axes() {
        let next = apply_delta(Vec2::new(94.0, 6.0), Vec2::new(5.0, -5.0));
        assert_eq!(next, Vec2::new(95.0, 5.0));
    }

    #[test]
    fn test_hit_radius_is_exclusive() {
        let player = Vec2::new(50.0, 80.0);
        assert!(is_hit(player, Vec2::new(50.0, 74.0), 7.0));
        assert!(!is_hit(player, Vec2::new(50.0, 73.0), 7.0));
    }
}
