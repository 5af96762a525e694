//! Draw-list generation for 2D primitives
//!
//! Turns a [`FrameView`] into a flat list of rectangles and circles in
//! play-field pixels, back to front. Backends only rasterise the list.

use glam::Vec2;

use super::FrameView;
use crate::sim::{CollectibleKind, ObstacleKind, PowerUpKind};

/// Palette (0xRRGGBB)
pub mod palette {
    pub const WATER: u32 = 0x1e6091;
    pub const LANE_LINE: u32 = 0x5fa8d3;
    pub const ROCK: u32 = 0x6b7280;
    pub const LOG: u32 = 0x8b5a2b;
    pub const OTTER: u32 = 0x8b4513;
    pub const SHIELD: u32 = 0x60a5fa;
    pub const COIN: u32 = 0xffd700;
    pub const GEM: u32 = 0xa855f7;
}

/// One primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCmd {
    Clear {
        color: u32,
    },
    Rect {
        pos: Vec2,
        size: Vec2,
        color: u32,
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: u32,
        alpha: f32,
    },
}

pub fn power_up_color(kind: PowerUpKind) -> u32 {
    match kind {
        PowerUpKind::Shield => 0x60a5fa,
        PowerUpKind::SpeedBoost => 0x34d399,
        PowerUpKind::ScoreMultiplier => 0xfbbf24,
        PowerUpKind::Magnet => 0xf87171,
        PowerUpKind::Ghost => 0xe5e7eb,
        PowerUpKind::SlowMotion => 0x818cf8,
    }
}

/// `0xRRGGBB` + alpha as a CSS `rgba()` string
pub fn css_rgba(color: u32, alpha: f32) -> String {
    format!(
        "rgba({},{},{},{:.3})",
        (color >> 16) & 0xff,
        (color >> 8) & 0xff,
        color & 0xff,
        alpha.clamp(0.0, 1.0)
    )
}

/// Build the draw list for one frame
pub fn frame_commands(view: &FrameView<'_>) -> Vec<DrawCmd> {
    let tuning = view.tuning;
    let mut cmds = Vec::with_capacity(
        8 + view.obstacles.len()
            + view.power_ups.len()
            + view.collectibles.len()
            + view.particles.len(),
    );

    cmds.push(DrawCmd::Clear {
        color: palette::WATER,
    });

    // Lane separators
    for i in 1..tuning.lane_count {
        let x = tuning.lane_offset + i as f32 * tuning.lane_width;
        cmds.push(DrawCmd::Rect {
            pos: Vec2::new(x - 1.0, 0.0),
            size: Vec2::new(2.0, tuning.canvas_height),
            color: palette::LANE_LINE,
            alpha: 0.4,
        });
    }

    for obstacle in view.obstacles.active() {
        let bounds = obstacle.bounds();
        cmds.push(match obstacle.kind {
            ObstacleKind::Rock => DrawCmd::Circle {
                center: bounds.center(),
                radius: bounds.width.min(bounds.height) / 2.0,
                color: palette::ROCK,
                alpha: 1.0,
            },
            ObstacleKind::Log => DrawCmd::Rect {
                pos: obstacle.pos,
                size: obstacle.size,
                color: palette::LOG,
                alpha: 1.0,
            },
        });
    }

    for power_up in view.power_ups.active() {
        let bounds = power_up.bounds();
        cmds.push(DrawCmd::Circle {
            center: bounds.center(),
            radius: bounds.width / 2.0,
            color: power_up_color(power_up.kind),
            alpha: 1.0,
        });
    }

    for item in view.collectibles.active() {
        let bounds = item.bounds();
        cmds.push(DrawCmd::Circle {
            center: bounds.center(),
            radius: bounds.width / 2.0,
            color: match item.kind {
                CollectibleKind::Coin => palette::COIN,
                CollectibleKind::Gem => palette::GEM,
            },
            alpha: 1.0,
        });
    }

    let player = view.player;
    cmds.push(DrawCmd::Rect {
        pos: player.pos,
        size: player.size,
        color: palette::OTTER,
        alpha: if player.is_ghost { 0.5 } else { 1.0 },
    });
    if player.has_shield {
        cmds.push(DrawCmd::Circle {
            center: player.center(),
            radius: player.size.max_element() * 0.75,
            color: palette::SHIELD,
            alpha: 0.3,
        });
    }

    for p in view.particles.active() {
        cmds.push(DrawCmd::Circle {
            center: p.pos,
            radius: p.size,
            color: p.color,
            alpha: p.alpha(),
        });
    }

    cmds
}
