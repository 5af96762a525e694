//! Game orchestrator
//!
//! Owns the simulation state and its collaborators. Each display frame:
//! clamp the frame delta, run fixed substeps, route the tick events to
//! audio, then draw and refresh the HUD. Game over folds the run into the
//! save record, checks achievements and persists.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::achievements::{AchievementSystem, AchievementTracker};
use crate::audio::{AudioSink, SilentAudio, SoundEffect};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::GameError;
use crate::persistence::{SaveData, SaveStore};
use crate::platform::input::InputEvent;
use crate::platform::storage::{MemoryStorage, Storage};
use crate::renderer::{FrameView, HeadlessRenderer, Renderer};
use crate::sim::{
    GameEvent, GameMode, GameOverReason, GamePhase, GameState, LaneMove, PowerUpStatus, tick,
};
use crate::tuning::Tuning;
use crate::ui::{GameOverSummary, Hud, NullUi, Screen, Ui};

/// Seed used when the host does not supply one
pub const DEFAULT_SEED: u64 = 0x07_7E_52_u64;

/// Run seed for a daily challenge: the same river for everyone on a given day
pub fn daily_seed(day: u32) -> u64 {
    (day as u64 ^ 0xD1CE).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// External services the game reports to
pub struct Collaborators {
    pub storage: Box<dyn Storage>,
    pub audio: Box<dyn AudioSink>,
    /// `None` uses the built-in table seeded from the save record
    pub achievements: Option<Box<dyn AchievementTracker>>,
    pub ui: Box<dyn Ui>,
    pub renderer: Box<dyn Renderer>,
}

impl Collaborators {
    /// In-memory storage, no audio, no UI, headless renderer
    pub fn headless() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            audio: Box::new(SilentAudio),
            achievements: None,
            ui: Box::new(NullUi),
            renderer: Box::new(HeadlessRenderer::new()),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::headless()
    }
}

pub struct Game {
    state: GameState,
    save_store: SaveStore,
    save: SaveData,
    audio: Box<dyn AudioSink>,
    achievements: Box<dyn AchievementTracker>,
    ui: Box<dyn Ui>,
    renderer: Box<dyn Renderer>,
    /// Unsimulated time carried between frames
    accumulator: f32,
    /// Timestamp of the previous `frame` call
    last_frame_ms: Option<f64>,
    /// Source of per-run seeds
    seeder: Pcg32,
    calendar_day: u32,
    last_summary: Option<GameOverSummary>,
}

impl Game {
    pub fn new(tuning: Tuning, collaborators: Collaborators) -> Result<Self, GameError> {
        Self::with_seed(tuning, collaborators, DEFAULT_SEED)
    }

    /// Validate the tuning, load the save record and wire collaborators
    pub fn with_seed(
        tuning: Tuning,
        collaborators: Collaborators,
        seed: u64,
    ) -> Result<Self, GameError> {
        tuning.validate()?;

        let Collaborators {
            storage,
            mut audio,
            achievements,
            mut ui,
            renderer,
        } = collaborators;

        let save_store = SaveStore::new(storage);
        let save = save_store.load();

        audio.set_sound_enabled(save.settings.sound_enabled);
        audio.set_music_enabled(save.settings.music_enabled);

        let achievements = achievements.unwrap_or_else(|| {
            Box::new(AchievementSystem::new(save.achievements.iter().cloned()))
        });

        ui.show_screen(Screen::Menu);
        log::info!("Game ready (best score {})", save.high_score);

        Ok(Self {
            state: GameState::new(tuning, seed),
            save_store,
            save,
            audio,
            achievements,
            ui,
            renderer,
            accumulator: 0.0,
            last_frame_ms: None,
            seeder: Pcg32::seed_from_u64(seed),
            calendar_day: 0,
            last_summary: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for scripted scenarios and debugging
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn high_score(&self) -> u64 {
        self.save.high_score
    }

    /// Summary of the most recent finished run
    pub fn last_summary(&self) -> Option<&GameOverSummary> {
        self.last_summary.as_ref()
    }

    pub fn active_power_ups(&self) -> Vec<PowerUpStatus> {
        self.state.active_power_ups()
    }

    /// Day number used to seed daily challenges
    pub fn set_calendar_day(&mut self, day: u32) {
        self.calendar_day = day;
    }

    fn next_seed(&mut self, mode: GameMode) -> u64 {
        match mode {
            GameMode::DailyChallenge => daily_seed(self.calendar_day),
            _ => self.seeder.random(),
        }
    }

    // === Session transitions ===

    /// Begin a new run in `mode`. Refused while the renderer is still loading.
    pub fn start(&mut self, mode: GameMode) -> bool {
        if !self.renderer.is_ready() {
            log::warn!("Renderer not ready, staying in menu");
            return false;
        }
        let seed = self.next_seed(mode);
        self.state.start(mode, seed);
        self.accumulator = 0.0;
        self.last_frame_ms = None;
        self.last_summary = None;
        self.ui.show_screen(Screen::Playing);
        true
    }

    /// New run in the current mode
    pub fn restart(&mut self) -> bool {
        let mode = self.state.mode;
        self.start(mode)
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.state.pause();
        if paused {
            self.ui.show_screen(Screen::Paused);
        }
        paused
    }

    /// Resume a paused run; the paused wall time is not simulated
    pub fn resume(&mut self) -> bool {
        let resumed = self.state.resume();
        if resumed {
            self.accumulator = 0.0;
            self.last_frame_ms = None;
            self.ui.show_screen(Screen::Playing);
        }
        resumed
    }

    /// End the current run explicitly
    pub fn game_over(&mut self) -> bool {
        let ended = self.state.end_run(GameOverReason::Quit);
        if ended {
            self.process_events();
        }
        ended
    }

    /// Back to the title screen. An unfinished run is abandoned unrecorded.
    pub fn return_to_menu(&mut self) {
        self.state.return_to_menu();
        self.state.events.clear();
        self.accumulator = 0.0;
        self.ui.show_screen(Screen::Menu);
    }

    // === Input ===

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::MoveLeft => {
                self.state.move_player(LaneMove::Left);
            }
            InputEvent::MoveRight => {
                self.state.move_player(LaneMove::Right);
            }
            InputEvent::Pause => match self.state.phase {
                GamePhase::Playing => {
                    self.pause();
                }
                GamePhase::Paused => {
                    self.resume();
                }
                _ => {}
            },
        }
        self.process_events();
    }

    // === Frame driving ===

    /// Advance by a wall-clock frame delta. Returns the number of substeps run.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        if self.state.phase != GamePhase::Playing {
            self.accumulator = 0.0;
            return 0;
        }

        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            tick(&mut self.state, SIM_DT);
            self.accumulator -= SIM_DT;
            steps += 1;
            if self.state.phase != GamePhase::Playing {
                self.accumulator = 0.0;
                break;
            }
        }
        // Drop whatever the substep cap could not drain
        if self.accumulator >= SIM_DT {
            self.accumulator = 0.0;
        }

        self.process_events();
        steps
    }

    /// One display frame at `now_ms` (e.g. a requestAnimationFrame timestamp)
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_frame_ms {
            Some(prev) => ((now_ms - prev) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        self.update(dt);
        self.render();
    }

    pub fn render(&mut self) {
        self.renderer
            .draw(&FrameView::new(&self.state, self.save.high_score));

        if matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
            let hud = Hud {
                stats: self.state.stats(self.save.total_games_played),
                high_score: self.save.high_score.max(self.state.run.score),
                power_ups: self.state.active_power_ups(),
                time_left: self.state.run.time_left,
            };
            self.ui.update_hud(&hud);
        }
    }

    // === Events ===

    fn process_events(&mut self) {
        let events = std::mem::take(&mut self.state.events);
        for event in &events {
            match *event {
                GameEvent::LaneChange => self.play(SoundEffect::Move),
                GameEvent::CoinCollected { .. } => self.play(SoundEffect::Coin),
                GameEvent::GemCollected { .. } => self.play(SoundEffect::Gem),
                GameEvent::PowerUpCollected(_) => self.play(SoundEffect::PowerUp),
                GameEvent::ShieldBlocked => self.play(SoundEffect::Shield),
                GameEvent::GameOver(reason) => {
                    if reason == GameOverReason::Collision {
                        self.play(SoundEffect::Collision);
                    }
                    self.play(SoundEffect::GameOver);
                    self.finish_run();
                }
                GameEvent::ObstacleDodged
                | GameEvent::PowerUpExpired(_)
                | GameEvent::DifficultyUp { .. } => {}
            }
        }
        // Hand the buffer back to keep its allocation
        self.state.events = events;
        self.state.events.clear();
    }

    fn play(&mut self, effect: SoundEffect) {
        if let Err(e) = self.audio.play(effect) {
            log::warn!("Audio: {}", e);
        }
    }

    /// Best score, play count, achievements, persist
    fn finish_run(&mut self) {
        let score = self.state.run.score;
        let new_high_score = self.save.record_run(score);
        let stats = self.state.stats(self.save.total_games_played);

        match self.achievements.check(&stats) {
            Ok(unlocked) if !unlocked.is_empty() => {
                self.play(SoundEffect::Achievement);
                for achievement in &unlocked {
                    self.ui.show_achievement(achievement);
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Achievements: {}", e),
        }
        self.save.achievements.extend(self.achievements.unlocked_ids());

        if let Err(e) = self.save_store.save(&self.save) {
            log::warn!("Save failed: {}", e);
        }

        let summary = GameOverSummary {
            stats,
            high_score: self.save.high_score,
            new_high_score,
        };
        self.ui.show_screen(Screen::GameOver);
        self.ui.show_game_over(&summary);
        self.last_summary = Some(summary);
    }

    // === Settings ===

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.save.settings.sound_enabled = enabled;
        self.audio.set_sound_enabled(enabled);
        self.persist_settings();
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.save.settings.music_enabled = enabled;
        self.audio.set_music_enabled(enabled);
        self.persist_settings();
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.save_store.save(&self.save) {
            log::warn!("Settings not saved: {}", e);
        }
    }

    /// Stop audio before the host tears the game down
    pub fn cleanup(&mut self) {
        self.audio.stop_all();
        log::info!("Game cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> Tuning {
        Tuning {
            min_spawn_distance: 1.0e9,
            max_spawn_distance: 1.0e9,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_invalid_tuning_is_fatal() {
        let tuning = Tuning {
            lane_count: 0,
            ..Tuning::default()
        };
        assert!(matches!(
            Game::new(tuning, Collaborators::headless()),
            Err(GameError::InvalidTuning(_))
        ));
    }

    #[test]
    fn test_update_ignored_outside_play() {
        let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
        assert_eq!(game.update(0.05), 0);
        assert_eq!(game.state().run.clock, 0.0);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
        assert!(game.start(GameMode::Classic));
        let steps = game.update(5.0);
        assert!(steps <= MAX_SUBSTEPS);
        assert!(game.state().run.clock <= MAX_FRAME_DT as f64 + 1e-6);
    }

    #[test]
    fn test_accumulator_carries_partial_steps() {
        let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
        game.start(GameMode::Classic);
        assert_eq!(game.update(SIM_DT * 0.5), 0);
        assert_eq!(game.update(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_start_waits_for_renderer() {
        let collaborators = Collaborators {
            renderer: Box::new(HeadlessRenderer::loading()),
            ..Collaborators::headless()
        };
        let mut game = Game::new(quiet(), collaborators).unwrap();
        assert!(!game.start(GameMode::Classic));
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_pause_input_toggles() {
        let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
        game.handle_input(InputEvent::Pause);
        assert_eq!(game.phase(), GamePhase::Menu);
        game.start(GameMode::Classic);
        game.handle_input(InputEvent::Pause);
        assert_eq!(game.phase(), GamePhase::Paused);
        assert_eq!(game.update(0.05), 0);
        game.handle_input(InputEvent::Pause);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_resume_does_not_count_paused_time() {
        let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
        game.start(GameMode::Classic);
        game.frame(0.0);
        game.frame(50.0);
        let clock = game.state().run.clock;
        game.pause();
        game.frame(10_000.0);
        game.resume();
        game.frame(60_000.0);
        assert_eq!(game.state().run.clock, clock);
    }

    #[test]
    fn test_daily_challenge_is_reproducible() {
        let mut a = Game::with_seed(Tuning::default(), Collaborators::headless(), 1).unwrap();
        let mut b = Game::with_seed(Tuning::default(), Collaborators::headless(), 2).unwrap();
        a.set_calendar_day(20_000);
        b.set_calendar_day(20_000);
        a.start(GameMode::DailyChallenge);
        b.start(GameMode::DailyChallenge);
        assert_eq!(a.state().seed, b.state().seed);
        for _ in 0..600 {
            a.update(1.0 / 60.0);
            b.update(1.0 / 60.0);
        }
        let lanes = |g: &Game| -> Vec<usize> {
            g.state().generator.obstacles.active().map(|o| o.lane).collect()
        };
        assert_eq!(lanes(&a), lanes(&b));
        assert_eq!(a.state().run.score, b.state().run.score);
    }

    #[test]
    fn test_restart_keeps_mode() {
        let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
        game.start(GameMode::Zen);
        game.game_over();
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.restart());
        assert_eq!(game.mode(), GameMode::Zen);
        assert_eq!(game.phase(), GamePhase::Playing);
    }
}
