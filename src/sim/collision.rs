//! Axis-aligned bounding boxes and magnet pull
//!
//! Screen coordinates: x grows right, y grows down. Every gameplay overlap
//! test in the simulation goes through [`Aabb::intersects`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box with its top-left corner at `pos`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Strict overlap: boxes that merely touch along an edge do not collide
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Velocity of magnitude `speed` pointing from `from` toward `to`
/// (zero when the points coincide)
#[inline]
pub fn pull_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let right = Aabb::new(10.0, 0.0, 10.0, 10.0);
        let below = Aabb::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = Aabb::new(0.0, 0.0, 100.0, 100.0);
        let inner = Aabb::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_separated_on_one_axis() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 50.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_center() {
        let a = Aabb::new(10.0, 20.0, 40.0, 60.0);
        assert_eq!(a.center(), Vec2::new(30.0, 50.0));
    }

    #[test]
    fn test_pull_velocity() {
        let v = pull_velocity(Vec2::ZERO, Vec2::new(0.0, 10.0), 400.0);
        assert!((v - Vec2::new(0.0, 400.0)).length() < 1e-4);
        assert_eq!(pull_velocity(Vec2::ONE, Vec2::ONE, 400.0), Vec2::ZERO);
    }
}
