//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool acquisition order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod entity;
pub mod generator;
pub mod player;
pub mod pool;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use entity::{
    Collectible, CollectibleKind, Obstacle, ObstacleKind, Particle, PowerUp, PowerUpKind,
};
pub use generator::{ProceduralGenerator, SpawnReport};
pub use player::{LaneMove, Player};
pub use pool::{Handle, Pool, Poolable};
pub use state::{
    GameEvent, GameMode, GameOverReason, GamePhase, GameState, PowerUpStatus, PowerUpTimers,
    RunState, SessionStats,
};
pub use tick::{apply_power_up, tick};
