//! Procedural spawn scheduling
//!
//! A single scalar, the scroll distance left until the next spawn event, is
//! worn down by `scroll_speed * dt`. When it runs out, one or more lanes are
//! drawn without replacement and filled with obstacles or power-ups, a free
//! lane may get a row of coins, and a new distance is drawn from a range
//! that narrows as difficulty rises.

use glam::Vec2;
use rand::Rng;

use super::entity::{
    Collectible, CollectibleKind, Obstacle, ObstacleKind, PowerUp, PowerUpKind,
};
use super::pool::Pool;
use crate::tuning::Tuning;

/// What a single spawn event produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub obstacles: usize,
    pub power_ups: usize,
    pub collectibles: usize,
}

/// Spawn scheduler and owner of the spawnable entity pools
#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    pub obstacles: Pool<Obstacle>,
    pub power_ups: Pool<PowerUp>,
    pub collectibles: Pool<Collectible>,
    /// Scroll distance left before the next spawn event
    distance_to_spawn: f32,
    min_spawn_distance: f32,
    max_spawn_distance: f32,
    /// Scratch lane list for sampling without replacement
    lanes: Vec<usize>,
}

impl ProceduralGenerator {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            obstacles: Pool::with_capacity(tuning.obstacle_pool_capacity),
            power_ups: Pool::with_capacity(tuning.powerup_pool_capacity),
            collectibles: Pool::with_capacity(tuning.collectible_pool_capacity),
            distance_to_spawn: tuning.min_spawn_distance,
            min_spawn_distance: tuning.min_spawn_distance,
            max_spawn_distance: tuning.max_spawn_distance,
            lanes: Vec::with_capacity(tuning.lane_count),
        }
    }

    pub fn distance_to_spawn(&self) -> f32 {
        self.distance_to_spawn
    }

    /// Current (difficulty-scaled) spawn distance range
    pub fn spawn_range(&self) -> (f32, f32) {
        (self.min_spawn_distance, self.max_spawn_distance)
    }

    /// Advance the scheduler; returns what was spawned, if anything
    pub fn update<R: Rng>(
        &mut self,
        tuning: &Tuning,
        scroll_speed: f32,
        difficulty: f32,
        dt: f32,
        rng: &mut R,
    ) -> Option<SpawnReport> {
        self.adjust_difficulty(tuning, difficulty);

        self.distance_to_spawn -= scroll_speed * dt;
        if self.distance_to_spawn > 0.0 {
            return None;
        }

        let report = self.spawn_event(tuning, rng);
        self.distance_to_spawn =
            rng.random_range(self.min_spawn_distance..=self.max_spawn_distance);
        Some(report)
    }

    fn adjust_difficulty(&mut self, tuning: &Tuning, difficulty: f32) {
        let factor = 1.0 + difficulty.max(0.0) * tuning.spawn_density_factor;
        self.min_spawn_distance = tuning.min_spawn_distance / factor;
        self.max_spawn_distance = tuning.max_spawn_distance / factor;
    }

    fn spawn_event<R: Rng>(&mut self, tuning: &Tuning, rng: &mut R) -> SpawnReport {
        let mut report = SpawnReport::default();

        self.lanes.clear();
        self.lanes.extend(0..tuning.lane_count);

        // Leave at least one lane open whenever there is more than one
        let cap = if tuning.lane_count > 1 {
            tuning.max_spawns_per_event.min(tuning.lane_count - 1)
        } else {
            1
        };
        let count = rng.random_range(1..=cap);

        for _ in 0..count {
            let pick = rng.random_range(0..self.lanes.len());
            let lane = self.lanes.swap_remove(pick);

            if rng.random_bool(tuning.powerup_spawn_chance as f64) {
                self.spawn_power_up(tuning, lane, rng);
                report.power_ups += 1;
            } else {
                self.spawn_obstacle(tuning, lane, rng);
                report.obstacles += 1;
            }
        }

        if !self.lanes.is_empty() && rng.random_bool(tuning.coin_row_chance as f64) {
            let lane = self.lanes[rng.random_range(0..self.lanes.len())];
            report.collectibles = self.spawn_coin_row(tuning, lane, rng);
        }

        log::trace!("Spawn event: {:?}", report);
        report
    }

    fn spawn_obstacle<R: Rng>(&mut self, tuning: &Tuning, lane: usize, rng: &mut R) {
        let kind = if rng.random_bool(0.3) {
            ObstacleKind::Log
        } else {
            ObstacleKind::Rock
        };
        let size = Vec2::new(tuning.obstacle_width, tuning.obstacle_height);
        let pos = Vec2::new(tuning.lane_x(lane, size.x), -size.y);
        self.obstacles.acquire().1.init(kind, lane, pos, size);
    }

    fn spawn_power_up<R: Rng>(&mut self, tuning: &Tuning, lane: usize, rng: &mut R) {
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        let size = Vec2::splat(tuning.powerup_size);
        let pos = Vec2::new(tuning.lane_x(lane, size.x), -size.y);
        self.power_ups.acquire().1.init(kind, lane, pos, size);
    }

    fn spawn_coin_row<R: Rng>(&mut self, tuning: &Tuning, lane: usize, rng: &mut R) -> usize {
        for i in 0..tuning.coins_per_row {
            let (kind, side) = if rng.random_bool(tuning.gem_chance as f64) {
                (CollectibleKind::Gem, tuning.gem_size)
            } else {
                (CollectibleKind::Coin, tuning.coin_size)
            };
            let size = Vec2::splat(side);
            let pos = Vec2::new(
                tuning.lane_x(lane, side),
                -side - i as f32 * tuning.coin_spacing,
            );
            self.collectibles.acquire().1.init(kind, 1, pos, size);
        }
        tuning.coins_per_row
    }

    /// Recycle everything and rewind the schedule (session restart)
    pub fn reset(&mut self, tuning: &Tuning) {
        self.obstacles.release_all();
        self.power_ups.release_all();
        self.collectibles.release_all();
        self.adjust_difficulty(tuning, 0.0);
        self.distance_to_spawn = tuning.min_spawn_distance;
    }
}
