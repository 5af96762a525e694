//! The player's otter: a lane-position state machine
//!
//! Discrete move commands pick a target lane; `update` slides `x` toward it
//! and snaps once within one step. Only one lane change is in flight at a time.

use glam::Vec2;

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Direction of a lane change command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneMove {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub current_lane: usize,
    pub target_lane: usize,
    pub is_moving: bool,
    /// One-shot obstacle protection
    pub has_shield: bool,
    /// Obstacles pass through while set
    pub is_ghost: bool,
    lane_count: usize,
    start_lane: usize,
    /// Lane-change speed (pixels/s)
    speed: f32,
    lane_offset: f32,
    lane_width: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            size: Vec2::new(tuning.player_width, tuning.player_height),
            current_lane: tuning.start_lane,
            target_lane: tuning.start_lane,
            is_moving: false,
            has_shield: false,
            is_ghost: false,
            lane_count: tuning.lane_count,
            start_lane: tuning.start_lane,
            speed: tuning.lane_switch_speed,
            lane_offset: tuning.lane_offset,
            lane_width: tuning.lane_width,
        };
        player.pos.y = tuning.canvas_height - tuning.player_bottom_offset;
        player.reset();
        player
    }

    /// Left edge of the player when centered in `lane`
    pub fn lane_x(&self, lane: usize) -> f32 {
        self.lane_offset + lane as f32 * self.lane_width + self.lane_width / 2.0 - self.size.x / 2.0
    }

    /// Request a lane change. Ignored while a change is in flight or at the
    /// edge of the river. Returns true if the move was accepted.
    pub fn request_move(&mut self, dir: LaneMove) -> bool {
        if self.is_moving {
            return false;
        }
        let target = match dir {
            LaneMove::Left if self.current_lane > 0 => self.current_lane - 1,
            LaneMove::Right if self.current_lane + 1 < self.lane_count => self.current_lane + 1,
            _ => return false,
        };
        self.target_lane = target;
        self.is_moving = true;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.request_move(LaneMove::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.request_move(LaneMove::Right)
    }

    /// Slide toward the target lane
    pub fn update(&mut self, dt: f32) {
        if !self.is_moving {
            return;
        }
        let target_x = self.lane_x(self.target_lane);
        let diff = target_x - self.pos.x;
        let step = self.speed * dt;

        if diff.abs() <= step {
            self.pos.x = target_x;
            self.current_lane = self.target_lane;
            self.is_moving = false;
        } else {
            self.pos.x += diff.signum() * step;
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Back to the start lane with no modifiers
    pub fn reset(&mut self) {
        self.current_lane = self.start_lane;
        self.target_lane = self.start_lane;
        self.pos.x = self.lane_x(self.start_lane);
        self.is_moving = false;
        self.has_shield = false;
        self.is_ghost = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn settle(player: &mut Player) {
        for _ in 0..600 {
            if !player.is_moving {
                break;
            }
            player.update(DT);
        }
    }

    #[test]
    fn test_starts_centered_in_start_lane() {
        let t = Tuning::default();
        let p = Player::new(&t);
        assert_eq!(p.current_lane, 1);
        assert_eq!(p.pos, Vec2::new(370.0, 450.0));
        assert!(!p.is_moving);
    }

    #[test]
    fn test_move_converges_and_snaps() {
        let t = Tuning::default();
        let mut p = Player::new(&t);
        assert!(p.move_left());
        let target = p.lane_x(0);
        let mut last = p.pos.x;
        while p.is_moving {
            p.update(DT);
            // Monotonic approach
            assert!(p.pos.x <= last);
            assert!(p.pos.x >= target);
            last = p.pos.x;
        }
        assert_eq!(p.pos.x, target);
        assert_eq!(p.current_lane, 0);
    }

    #[test]
    fn test_move_while_moving_is_ignored() {
        let t = Tuning::default();
        let mut p = Player::new(&t);
        assert!(p.move_right());
        p.update(DT);
        assert!(!p.move_left());
        assert!(!p.move_right());
        settle(&mut p);
        assert_eq!(p.current_lane, 2);
    }

    #[test]
    fn test_lane_stays_in_bounds() {
        let t = Tuning::default();
        let mut p = Player::new(&t);
        for _ in 0..5 {
            p.move_left();
            settle(&mut p);
            assert!(p.current_lane < t.lane_count);
        }
        assert_eq!(p.current_lane, 0);
        assert!(!p.move_left());

        for _ in 0..5 {
            p.move_right();
            settle(&mut p);
            assert!(p.current_lane < t.lane_count);
        }
        assert_eq!(p.current_lane, 2);
        assert!(!p.move_right());
    }

    #[test]
    fn test_reset_restores_start_state() {
        let t = Tuning::default();
        let mut p = Player::new(&t);
        p.move_left();
        p.update(DT);
        p.has_shield = true;
        p.is_ghost = true;
        p.reset();
        assert_eq!(p.current_lane, 1);
        assert_eq!(p.target_lane, 1);
        assert_eq!(p.pos.x, p.lane_x(1));
        assert!(!p.is_moving && !p.has_shield && !p.is_ghost);
    }
}
