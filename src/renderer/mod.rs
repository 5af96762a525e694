//! Rendering interface
//!
//! The game hands a read-only [`FrameView`] to a [`Renderer`] once per
//! display frame. `shapes` turns the view into a draw list; backends
//! rasterise it (2D canvas on the web, nothing when headless).

pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use shapes::{DrawCmd, frame_commands};

use crate::sim::{
    Collectible, GameMode, GamePhase, GameState, Obstacle, Particle, Player, Pool, PowerUp,
    RunState,
};
use crate::tuning::Tuning;

/// Everything a renderer may read for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub phase: GamePhase,
    pub mode: GameMode,
    pub tuning: &'a Tuning,
    pub run: &'a RunState,
    pub player: &'a Player,
    pub obstacles: &'a Pool<Obstacle>,
    pub power_ups: &'a Pool<PowerUp>,
    pub collectibles: &'a Pool<Collectible>,
    pub particles: &'a Pool<Particle>,
    pub high_score: u64,
}

impl<'a> FrameView<'a> {
    pub fn new(state: &'a GameState, high_score: u64) -> Self {
        Self {
            phase: state.phase,
            mode: state.mode,
            tuning: &state.tuning,
            run: &state.run,
            player: &state.player,
            obstacles: &state.generator.obstacles,
            power_ups: &state.generator.power_ups,
            collectibles: &state.generator.collectibles,
            particles: &state.particles,
            high_score,
        }
    }
}

pub trait Renderer {
    /// Whether assets are loaded; the game will not leave the menu before
    fn is_ready(&self) -> bool {
        true
    }

    fn draw(&mut self, view: &FrameView<'_>);
}

/// Renderer that only builds the draw list (tests, native demo)
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    /// Reported readiness; true unless constructed with `loading()`
    pub ready: bool,
    pub frames: u64,
    pub last_draw_count: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    /// A renderer that still reports its assets as loading
    pub fn loading() -> Self {
        Self::default()
    }
}

impl Renderer for HeadlessRenderer {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn draw(&mut self, view: &FrameView<'_>) {
        self.last_draw_count = frame_commands(view).len();
        self.frames += 1;
    }
}
