//! Game state and core simulation types
//!
//! Everything the per-tick update mutates lives in [`GameState`], which is
//! passed by `&mut` into [`tick`](super::tick::tick).

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Particle, PowerUpKind};
use super::generator::ProceduralGenerator;
use super::player::{LaneMove, Player};
use super::pool::Pool;
use crate::tuning::Tuning;

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended; state frozen until restart or menu
    GameOver,
}

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Classic,
    /// Survive as long as possible within a fixed countdown
    TimeTrial,
    /// Slower river, no combo bonus
    Zen,
    /// Same river for everyone on a given day
    DailyChallenge,
}

impl GameMode {
    /// Whether the combo factor applies to score accrual
    pub fn uses_combo(self) -> bool {
        !matches!(self, GameMode::Zen)
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Collision,
    TimeUp,
    /// Ended through an explicit `game_over()` call
    Quit,
}

/// Things that happened during a tick, for audio/UI collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    LaneChange,
    ObstacleDodged,
    ShieldBlocked,
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    CoinCollected { value: u32 },
    GemCollected { value: u32 },
    DifficultyUp { level: f32 },
    GameOver(GameOverReason),
}

/// One expiry timestamp (simulation seconds) per timed power-up kind
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerUpTimers {
    expiry: [Option<f64>; PowerUpKind::ALL.len()],
}

impl PowerUpTimers {
    /// Start or refresh a timer; never stacks
    pub fn activate(&mut self, kind: PowerUpKind, now: f64, duration: f32) {
        self.expiry[kind.index()] = Some(now + duration as f64);
    }

    pub fn expiry(&self, kind: PowerUpKind) -> Option<f64> {
        self.expiry[kind.index()]
    }

    pub fn is_active(&self, kind: PowerUpKind, now: f64) -> bool {
        self.expiry(kind).is_some_and(|t| now < t)
    }

    /// Number of running timers
    pub fn count(&self) -> usize {
        self.expiry.iter().filter(|e| e.is_some()).count()
    }

    /// Clear and return the next timer with `now >= expiry`
    pub fn pop_expired(&mut self, now: f64) -> Option<PowerUpKind> {
        let kind = PowerUpKind::ALL
            .into_iter()
            .find(|k| self.expiry[k.index()].is_some_and(|t| now >= t))?;
        self.expiry[kind.index()] = None;
        Some(kind)
    }

    pub fn clear(&mut self) {
        self.expiry = Default::default();
    }
}

/// HUD entry for a running power-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpStatus {
    pub kind: PowerUpKind,
    /// Full duration in seconds (0 for the shield)
    pub duration: f32,
    /// Seconds left (0 for the shield)
    pub time_left: f32,
}

/// Terminal (or live) statistics of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u64,
    pub distance: f32,
    pub coins: u32,
    pub gems: u32,
    pub combo: u32,
    /// Highest combo reached during the run
    pub max_combo: u32,
    pub multiplier: u32,
    pub power_ups_collected: u32,
    pub obstacles_avoided: u32,
    pub games_played: u32,
}

/// Per-run counters and modifiers
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Simulation clock (seconds since start)
    pub clock: f64,
    pub score: u64,
    /// Fractional score not yet credited
    pub score_carry: f32,
    pub distance: f32,
    pub coins: u32,
    pub gems: u32,
    pub combo: u32,
    pub max_combo: u32,
    /// Seconds left before the combo decays
    pub combo_timer: f32,
    /// Effective scroll speed (baseline times active modifiers)
    pub scroll_speed: f32,
    /// Difficulty-driven speed before power-up modifiers
    pub base_scroll_speed: f32,
    pub difficulty: f32,
    pub difficulty_timer: f32,
    pub score_multiplier: u32,
    pub timers: PowerUpTimers,
    pub power_ups_collected: u32,
    pub obstacles_avoided: u32,
    /// Seconds left in a time trial
    pub time_left: Option<f32>,
}

impl RunState {
    pub fn new(tuning: &Tuning, mode: GameMode) -> Self {
        let mut base = tuning.start_scroll_speed;
        if mode == GameMode::Zen {
            base *= tuning.zen_speed_multiplier;
        }
        let base = tuning.clamp_speed(base);
        Self {
            scroll_speed: base,
            base_scroll_speed: base,
            score_multiplier: 1,
            time_left: (mode == GameMode::TimeTrial).then_some(tuning.time_trial_duration),
            ..Self::default()
        }
    }

    /// Extend the combo and restart its decay timer
    pub fn add_combo(&mut self, amount: u32, timeout: f32) {
        self.combo += amount;
        self.max_combo = self.max_combo.max(self.combo);
        self.combo_timer = timeout;
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub seed: u64,
    pub rng: Pcg32,
    pub run: RunState,
    pub player: Player,
    pub generator: ProceduralGenerator,
    pub particles: Pool<Particle>,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a state in the menu phase; pools are pre-allocated here
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: GamePhase::Menu,
            mode: GameMode::Classic,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            run: RunState::new(&tuning, GameMode::Classic),
            player: Player::new(&tuning),
            generator: ProceduralGenerator::new(&tuning),
            particles: Pool::with_capacity(tuning.particle_pool_capacity),
            events: Vec::with_capacity(32),
            tuning,
        }
    }

    /// Begin a fresh run. Entities from any previous run go back to their pools.
    pub fn start(&mut self, mode: GameMode, seed: u64) {
        self.mode = mode;
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.run = RunState::new(&self.tuning, mode);
        self.player.reset();
        self.generator.reset(&self.tuning);
        self.particles.release_all();
        self.events.clear();
        self.phase = GamePhase::Playing;
        log::info!("Run started: mode={:?} seed={}", mode, seed);
    }

    /// PLAYING -> PAUSED; no-op otherwise
    pub fn pause(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            log::info!("Paused");
            true
        } else {
            false
        }
    }

    /// PAUSED -> PLAYING; no-op otherwise
    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            log::info!("Resumed");
            true
        } else {
            false
        }
    }

    /// End the run (PLAYING or PAUSED only). The run state is frozen.
    pub fn end_run(&mut self, reason: GameOverReason) -> bool {
        if !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return false;
        }
        if reason == GameOverReason::Collision {
            self.run.combo = 0;
            self.run.combo_timer = 0.0;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver(reason));
        log::info!("Game over ({:?}): score={}", reason, self.run.score);
        true
    }

    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
    }

    /// Lane change command; only honoured while playing
    pub fn move_player(&mut self, dir: LaneMove) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        let moved = self.player.request_move(dir);
        if moved {
            self.events.push(GameEvent::LaneChange);
        }
        moved
    }

    pub fn is_power_up_active(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::Shield => self.player.has_shield,
            _ => self.run.timers.is_active(kind, self.run.clock),
        }
    }

    /// Running power-ups, shield first
    pub fn active_power_ups(&self) -> Vec<PowerUpStatus> {
        let mut statuses = Vec::new();
        if self.player.has_shield {
            statuses.push(PowerUpStatus {
                kind: PowerUpKind::Shield,
                duration: 0.0,
                time_left: 0.0,
            });
        }
        for kind in PowerUpKind::ALL {
            let (Some(expiry), Some(duration)) =
                (self.run.timers.expiry(kind), kind.duration(&self.tuning))
            else {
                continue;
            };
            let time_left = (expiry - self.run.clock) as f32;
            if time_left > 0.0 {
                statuses.push(PowerUpStatus {
                    kind,
                    duration,
                    time_left,
                });
            }
        }
        statuses
    }

    /// Snapshot for the HUD and achievements
    pub fn stats(&self, games_played: u32) -> SessionStats {
        SessionStats {
            score: self.run.score,
            distance: self.run.distance,
            coins: self.run.coins,
            gems: self.run.gems,
            combo: self.run.combo,
            max_combo: self.run.max_combo,
            multiplier: self.run.score_multiplier,
            power_ups_collected: self.run.power_ups_collected,
            obstacles_avoided: self.run.obstacles_avoided,
            games_played,
        }
    }
}
