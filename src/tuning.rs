//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. Defaults reproduce the shipped
//! balance; a JSON override may replace any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Play-field ===
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub lane_count: usize,
    pub lane_width: f32,
    /// Left edge of lane 0
    pub lane_offset: f32,

    // === Scroll & difficulty ===
    /// Scroll speed at session start (pixels/s)
    pub start_scroll_speed: f32,
    pub min_scroll_speed: f32,
    pub max_scroll_speed: f32,
    /// Added to the difficulty accumulator every interval
    pub difficulty_increase_rate: f32,
    /// Seconds of play between difficulty ticks
    pub difficulty_interval: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Distance of the player's top edge from the bottom of the canvas
    pub player_bottom_offset: f32,
    /// Horizontal lane-change speed (pixels/s)
    pub lane_switch_speed: f32,
    pub start_lane: usize,

    // === Spawning ===
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
    /// `k` in `range / (1 + difficulty * k)`
    pub spawn_density_factor: f32,
    /// Most lanes filled by one spawn event
    pub max_spawns_per_event: usize,
    /// Chance a chosen lane gets a power-up instead of an obstacle
    pub powerup_spawn_chance: f32,
    /// Chance a free lane gets a row of coins
    pub coin_row_chance: f32,
    pub coins_per_row: usize,
    pub coin_spacing: f32,
    /// Chance any coin in a row is upgraded to a gem
    pub gem_chance: f32,

    // === Pickups ===
    pub powerup_size: f32,
    pub coin_size: f32,
    pub gem_size: f32,
    /// Default duration for timed power-ups (seconds)
    pub powerup_duration: f32,
    pub magnet_duration: f32,
    pub magnet_radius: f32,
    pub magnet_pull_coin: f32,
    pub magnet_pull_gem: f32,
    pub ghost_duration: f32,
    pub slow_motion_duration: f32,
    pub slow_motion_multiplier: f32,
    pub speed_boost_multiplier: f32,
    pub score_multiplier: u32,
    pub coin_score: u64,
    pub gem_score: u64,

    // === Combo ===
    /// Idle seconds before the combo drops back to zero
    pub combo_timeout: f32,
    pub combo_step: f32,

    // === Modes ===
    pub time_trial_duration: f32,
    pub zen_speed_multiplier: f32,

    // === Particles ===
    pub particle_count: usize,
    pub particle_speed: f32,
    pub particle_lifetime: f32,

    // === Pool capacities ===
    pub obstacle_pool_capacity: usize,
    pub powerup_pool_capacity: usize,
    pub collectible_pool_capacity: usize,
    pub particle_pool_capacity: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            lane_count: 3,
            lane_width: 200.0,
            lane_offset: 100.0,

            start_scroll_speed: 200.0,
            min_scroll_speed: 100.0,
            max_scroll_speed: 600.0,
            difficulty_increase_rate: 0.05,
            difficulty_interval: 10.0,

            player_width: 60.0,
            player_height: 60.0,
            player_bottom_offset: 150.0,
            lane_switch_speed: 600.0,
            start_lane: 1,

            obstacle_width: 50.0,
            obstacle_height: 50.0,
            min_spawn_distance: 400.0,
            max_spawn_distance: 800.0,
            spawn_density_factor: 0.5,
            max_spawns_per_event: 2,
            powerup_spawn_chance: 0.15,
            coin_row_chance: 0.4,
            coins_per_row: 3,
            coin_spacing: 60.0,
            gem_chance: 0.05,

            powerup_size: 40.0,
            coin_size: 30.0,
            gem_size: 30.0,
            powerup_duration: 5.0,
            magnet_duration: 6.0,
            magnet_radius: 150.0,
            magnet_pull_coin: 400.0,
            magnet_pull_gem: 450.0,
            ghost_duration: 5.0,
            slow_motion_duration: 5.0,
            slow_motion_multiplier: 0.5,
            speed_boost_multiplier: 0.7,
            score_multiplier: 2,
            coin_score: 10,
            gem_score: 50,

            combo_timeout: 3.0,
            combo_step: 0.1,

            time_trial_duration: 60.0,
            zen_speed_multiplier: 0.6,

            particle_count: 10,
            particle_speed: 100.0,
            particle_lifetime: 1.0,

            obstacle_pool_capacity: 30,
            powerup_pool_capacity: 10,
            collectible_pool_capacity: 40,
            particle_pool_capacity: 50,
        }
    }
}

impl Tuning {
    /// Parse an override table; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        let fail = |msg: &str| Err(GameError::InvalidTuning(msg.to_string()));

        if self.lane_count == 0 {
            return fail("lane_count must be at least 1");
        }
        if self.start_lane >= self.lane_count {
            return fail("start_lane must be a valid lane");
        }
        if self.lane_width <= 0.0 || self.canvas_height <= 0.0 {
            return fail("play-field dimensions must be positive");
        }
        if self.min_scroll_speed <= 0.0 || self.min_scroll_speed > self.max_scroll_speed {
            return fail("scroll speed range must satisfy 0 < min <= max");
        }
        if self.min_spawn_distance <= 0.0 || self.min_spawn_distance > self.max_spawn_distance {
            return fail("spawn distance range must satisfy 0 < min <= max");
        }
        if self.difficulty_interval <= 0.0 {
            return fail("difficulty_interval must be positive");
        }
        if self.lane_switch_speed <= 0.0 {
            return fail("lane_switch_speed must be positive");
        }
        if self.max_spawns_per_event == 0 {
            return fail("max_spawns_per_event must be at least 1");
        }
        for (name, v) in [
            ("spawn_density_factor", self.spawn_density_factor),
            ("difficulty_increase_rate", self.difficulty_increase_rate),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(GameError::InvalidTuning(format!(
                    "{name} must be finite and non-negative"
                )));
            }
        }
        for (name, p) in [
            ("powerup_spawn_chance", self.powerup_spawn_chance),
            ("coin_row_chance", self.coin_row_chance),
            ("gem_chance", self.gem_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GameError::InvalidTuning(format!("{name} must be within [0, 1]")));
            }
        }
        Ok(())
    }

    /// Left edge for an entity of `width` centered in `lane`
    #[inline]
    pub fn lane_x(&self, lane: usize, width: f32) -> f32 {
        self.lane_offset + lane as f32 * self.lane_width + self.lane_width / 2.0 - width / 2.0
    }

    /// Speed step applied on every difficulty tick
    pub fn difficulty_speed_step(&self) -> f32 {
        (self.max_scroll_speed - self.start_scroll_speed).max(0.0) * self.difficulty_increase_rate
    }

    /// Clamp a scroll speed into the configured range
    #[inline]
    pub fn clamp_speed(&self, speed: f32) -> f32 {
        speed.clamp(self.min_scroll_speed, self.max_scroll_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_lane_x_centers_entity() {
        let t = Tuning::default();
        // Lane 1 spans 300..500, center 400
        assert_eq!(t.lane_x(1, 60.0), 370.0);
        assert_eq!(t.lane_x(0, 50.0), 175.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "lane_count": 4, "max_scroll_speed": 800.0 }"#).unwrap();
        assert_eq!(t.lane_count, 4);
        assert_eq!(t.max_scroll_speed, 800.0);
        assert_eq!(t.start_scroll_speed, 200.0);
    }

    #[test]
    fn test_rejects_negative_density_factor() {
        let err = Tuning::from_json(r#"{ "spawn_density_factor": -0.5 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTuning(_)));
    }

    #[test]
    fn test_rejects_negative_difficulty_rate() {
        let err = Tuning::from_json(r#"{ "difficulty_increase_rate": -0.1 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTuning(_)));

        let t = Tuning {
            spawn_density_factor: f32::INFINITY,
            ..Tuning::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_lanes() {
        let err = Tuning::from_json(r#"{ "lane_count": 0, "start_lane": 0 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTuning(_)));
    }

    #[test]
    fn test_rejects_inverted_speed_range() {
        let t = Tuning {
            min_scroll_speed: 700.0,
            ..Tuning::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ lane_count: "),
            Err(GameError::TuningParse(_))
        ));
    }
}
