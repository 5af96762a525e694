//! Otter Run - an endless-runner lane game
//!
//! Core modules:
//! - `sim`: Simulation (pools, spawning, collisions, power-ups, session state)
//! - `game`: Orchestrator tying the simulation to its collaborators
//! - `renderer`: Renderer interface (and the web canvas backend)
//! - `platform`: Input mapping and storage backends
//! - `persistence`: Save record load/save with default fallback
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod audio;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{CollaboratorError, GameError, StorageError};
pub use game::{Collaborators, Game};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Longest frame delta fed into the accumulator; anything beyond is dropped
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame (enough to drain one clamped frame)
    pub const MAX_SUBSTEPS: u32 = 12;
}
