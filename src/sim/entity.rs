//! Pooled entity types
//!
//! Obstacles, power-ups, collectibles and particles. Each one is a plain
//! struct recycled through a [`Pool`](super::pool::Pool): `Default` is the
//! fresh (inactive) state and `init` fills in the payload on spawn.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, pull_velocity};
use super::pool::Poolable;
use crate::tuning::Tuning;

/// Obstacle variants (cosmetic; all are fatal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    Rock,
    Log,
}

/// Something in the river to dodge
#[derive(Debug, Clone, Default)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub lane: usize,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Poolable for Obstacle {}

impl Obstacle {
    pub fn init(&mut self, kind: ObstacleKind, lane: usize, pos: Vec2, size: Vec2) {
        self.kind = kind;
        self.lane = lane;
        self.pos = pos;
        self.size = size;
    }

    /// Scroll down with the river
    pub fn update(&mut self, dt: f32, scroll_speed: f32) {
        self.pos.y += scroll_speed * dt;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn is_off_screen(&self, canvas_height: f32) -> bool {
        self.pos.y > canvas_height
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Blocks one obstacle hit; no timer
    #[default]
    Shield,
    /// Slows the river down (easier to steer)
    SpeedBoost,
    /// Doubles score accrual
    ScoreMultiplier,
    /// Pulls nearby collectibles toward the player
    Magnet,
    /// Obstacles pass through the player
    Ghost,
    /// Strong temporary slowdown
    SlowMotion,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::Magnet,
        PowerUpKind::Ghost,
        PowerUpKind::SlowMotion,
    ];

    /// Dense index for per-kind tables
    pub fn index(self) -> usize {
        match self {
            PowerUpKind::Shield => 0,
            PowerUpKind::SpeedBoost => 1,
            PowerUpKind::ScoreMultiplier => 2,
            PowerUpKind::Magnet => 3,
            PowerUpKind::Ghost => 4,
            PowerUpKind::SlowMotion => 5,
        }
    }

    /// Effect duration in seconds, `None` for the one-shot shield
    pub fn duration(self, tuning: &Tuning) -> Option<f32> {
        match self {
            PowerUpKind::Shield => None,
            PowerUpKind::SpeedBoost | PowerUpKind::ScoreMultiplier => Some(tuning.powerup_duration),
            PowerUpKind::Magnet => Some(tuning.magnet_duration),
            PowerUpKind::Ghost => Some(tuning.ghost_duration),
            PowerUpKind::SlowMotion => Some(tuning.slow_motion_duration),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::ScoreMultiplier => "Score x2",
            PowerUpKind::Magnet => "Magnet",
            PowerUpKind::Ghost => "Ghost",
            PowerUpKind::SlowMotion => "Slow Motion",
        }
    }
}

/// A power-up floating down a lane
#[derive(Debug, Clone, Default)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub lane: usize,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Poolable for PowerUp {}

impl PowerUp {
    pub fn init(&mut self, kind: PowerUpKind, lane: usize, pos: Vec2, size: Vec2) {
        self.kind = kind;
        self.lane = lane;
        self.pos = pos;
        self.size = size;
    }

    pub fn update(&mut self, dt: f32, scroll_speed: f32) {
        self.pos.y += scroll_speed * dt;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn is_off_screen(&self, canvas_height: f32) -> bool {
        self.pos.y > canvas_height
    }
}

/// Currency types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectibleKind {
    #[default]
    Coin,
    Gem,
}

/// Magnet pull applied to collectibles this frame
#[derive(Debug, Clone, Copy)]
pub struct MagnetField {
    pub center: Vec2,
    pub radius: f32,
    pub coin_pull: f32,
    pub gem_pull: f32,
}

/// A coin or gem
#[derive(Debug, Clone, Default)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub value: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Velocity applied on the last update (straight scroll or magnet pull)
    pub vel: Vec2,
}

impl Poolable for Collectible {}

impl Collectible {
    pub fn init(&mut self, kind: CollectibleKind, value: u32, pos: Vec2, size: Vec2) {
        self.kind = kind;
        self.value = value;
        self.pos = pos;
        self.size = size;
        self.vel = Vec2::ZERO;
    }

    /// Scroll with the river, or home in on the magnet when inside its radius
    pub fn update(&mut self, dt: f32, scroll_speed: f32, magnet: Option<&MagnetField>) {
        let center = self.bounds().center();
        self.vel = match magnet {
            Some(field) if center.distance(field.center) < field.radius => {
                let pull = match self.kind {
                    CollectibleKind::Coin => field.coin_pull,
                    CollectibleKind::Gem => field.gem_pull,
                };
                pull_velocity(center, field.center, pull)
            }
            _ => Vec2::new(0.0, scroll_speed),
        };
        self.pos += self.vel * dt;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn is_off_screen(&self, canvas_height: f32) -> bool {
        self.pos.y > canvas_height
    }
}

/// Particle colours (0xRRGGBB)
pub mod colors {
    pub const SHIELD: u32 = 0x60a5fa;
    pub const COLLISION: u32 = 0xd2691e;
    pub const POWERUP: u32 = 0xfbbf24;
    pub const COIN: u32 = 0xffd700;
    pub const GEM: u32 = 0xa855f7;
}

/// A short-lived visual particle
#[derive(Debug, Clone, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Remaining lifetime in seconds
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl Poolable for Particle {}

impl Particle {
    pub fn init(&mut self, pos: Vec2, vel: Vec2, lifetime: f32, color: u32, size: f32) {
        self.pos = pos;
        self.vel = vel;
        self.life = lifetime;
        self.max_life = lifetime;
        self.color = color;
        self.size = size;
    }

    /// Advance; returns false once the particle has expired
    pub fn update(&mut self, dt: f32) -> bool {
        self.pos += self.vel * dt;
        self.life -= dt;
        self.life > 0.0
    }

    /// Opacity for rendering (1 at birth, 0 at death)
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}
