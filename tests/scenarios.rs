//! End-to-end runs through `Game` with headless collaborators

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glam::Vec2;
use otter_run::achievements::{Achievement, AchievementTracker};
use otter_run::audio::{AudioSink, SoundEffect};
use otter_run::persistence::{SAVE_KEY, SaveData, SaveStore};
use otter_run::platform::{InputEvent, MemoryStorage, Storage};
use otter_run::sim::{
    CollectibleKind, GameMode, GamePhase, ObstacleKind, PowerUpKind, SessionStats,
};
use otter_run::ui::{GameOverSummary, Hud, Screen, Ui};
use otter_run::{CollaboratorError, Collaborators, Game, StorageError, Tuning};

const FRAME: f32 = 1.0 / 60.0;

#[derive(Clone, Default)]
struct RecordingAudio(Rc<RefCell<Vec<SoundEffect>>>);

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) -> Result<(), CollaboratorError> {
        self.0.borrow_mut().push(effect);
        Ok(())
    }
}

struct BrokenAudio;

impl AudioSink for BrokenAudio {
    fn play(&mut self, effect: SoundEffect) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Audio(format!("{effect:?}")))
    }
}

struct BrokenAchievements;

impl AchievementTracker for BrokenAchievements {
    fn check(&mut self, _stats: &SessionStats) -> Result<Vec<Achievement>, CollaboratorError> {
        Err(CollaboratorError::Achievements("offline".into()))
    }

    fn unlocked_ids(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

/// Reads work, writes fail
#[derive(Clone, Default)]
struct ReadOnlyStorage(MemoryStorage);

impl Storage for ReadOnlyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".into()))
    }
}

#[derive(Clone, Default)]
struct RecordingUi {
    screens: Rc<RefCell<Vec<Screen>>>,
    summaries: Rc<RefCell<Vec<GameOverSummary>>>,
    achievements: Rc<RefCell<Vec<&'static str>>>,
    huds: Rc<RefCell<u32>>,
}

impl Ui for RecordingUi {
    fn show_screen(&mut self, screen: Screen) {
        self.screens.borrow_mut().push(screen);
    }

    fn update_hud(&mut self, _hud: &Hud) {
        *self.huds.borrow_mut() += 1;
    }

    fn show_game_over(&mut self, summary: &GameOverSummary) {
        self.summaries.borrow_mut().push(summary.clone());
    }

    fn show_achievement(&mut self, achievement: &Achievement) {
        self.achievements.borrow_mut().push(achievement.id);
    }
}

/// No random spawns; every entity is placed by the test
fn quiet() -> Tuning {
    Tuning {
        min_spawn_distance: 1.0e9,
        max_spawn_distance: 1.0e9,
        ..Tuning::default()
    }
}

fn obstacle_only() -> Tuning {
    Tuning {
        powerup_spawn_chance: 0.0,
        coin_row_chance: 0.0,
        ..Tuning::default()
    }
}

fn place_obstacle_on_player(game: &mut Game) {
    let state = game.state_mut();
    let (pos, lane) = (state.player.pos, state.player.current_lane);
    state
        .generator
        .obstacles
        .acquire()
        .1
        .init(ObstacleKind::Rock, lane, pos, Vec2::splat(50.0));
}

fn run_seconds(game: &mut Game, seconds: f32) {
    let frames = (seconds / FRAME).round() as u32;
    for _ in 0..frames {
        game.update(FRAME);
    }
}

fn storage_with(data: &SaveData) -> MemoryStorage {
    let mem = MemoryStorage::new();
    SaveStore::new(Box::new(mem.clone())).save(data).unwrap();
    mem
}

#[test]
fn spawn_interval_yields_obstacles() {
    let mut game = Game::new(obstacle_only(), Collaborators::headless()).unwrap();
    game.start(GameMode::Classic);
    let first = game.state().generator.distance_to_spawn();

    // 400 px at 200 px/s is two seconds
    for _ in 0..250 {
        game.update(1.0 / 120.0);
        if !game.state().generator.obstacles.is_empty() {
            break;
        }
    }
    let state = game.state();
    let spawned = state.generator.obstacles.len();
    assert!((1..=2).contains(&spawned), "spawned {spawned}");
    assert!(state.generator.power_ups.is_empty());

    // Rescheduled from the spawn range, not carried over from the first countdown
    let (min, max) = state.generator.spawn_range();
    let next = state.generator.distance_to_spawn();
    assert!((min..=max).contains(&next), "next spawn at {next}, range {min}..={max}");
    assert_ne!(next, first);
}

#[test]
fn unshielded_hit_ends_run_and_updates_best() {
    let mem = MemoryStorage::new();
    let ui = RecordingUi::default();
    let audio = RecordingAudio::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(mem.clone()),
            audio: Box::new(audio.clone()),
            ui: Box::new(ui.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();

    game.start(GameMode::Classic);
    run_seconds(&mut game, 1.0);
    game.state_mut().run.combo = 6;
    let score = game.state().run.score;
    assert!(score > 0);

    place_obstacle_on_player(&mut game);
    game.update(FRAME);

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.state().run.combo, 0);
    assert_eq!(game.high_score(), score);
    assert_eq!(game.save_data().total_games_played, 1);

    let sounds = audio.0.borrow();
    assert!(sounds.contains(&SoundEffect::Collision));
    assert!(sounds.contains(&SoundEffect::GameOver));

    let summaries = ui.summaries.borrow();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].new_high_score);
    assert_eq!(ui.screens.borrow().last(), Some(&Screen::GameOver));

    // Persisted
    let saved = SaveStore::new(Box::new(mem)).load();
    assert_eq!(saved.high_score, score);
    assert_eq!(saved.total_games_played, 1);
    assert!(saved.achievements.contains("first_run"));

    // Frozen after game over
    game.update(FRAME);
    assert_eq!(game.state().run.score, score);
}

#[test]
fn lower_score_keeps_previous_best() {
    let previous = SaveData {
        high_score: 1_000_000,
        total_games_played: 4,
        ..SaveData::default()
    };
    let mem = storage_with(&previous);
    let mut game = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(mem.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    assert_eq!(game.high_score(), 1_000_000);

    game.start(GameMode::Classic);
    run_seconds(&mut game, 0.5);
    place_obstacle_on_player(&mut game);
    game.update(FRAME);

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.high_score(), 1_000_000);
    assert_eq!(game.save_data().total_games_played, 5);
    assert!(!game.last_summary().unwrap().new_high_score);
    assert_eq!(SaveStore::new(Box::new(mem)).load().total_games_played, 5);
}

#[test]
fn second_speed_boost_refreshes_single_timer() {
    let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
    game.start(GameMode::Classic);

    let state = game.state_mut();
    otter_run::sim::apply_power_up(state, PowerUpKind::SpeedBoost);
    run_seconds(&mut game, 3.0);

    let state = game.state_mut();
    let now = state.run.clock;
    otter_run::sim::apply_power_up(state, PowerUpKind::SpeedBoost);

    let statuses = game.active_power_ups();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].kind, PowerUpKind::SpeedBoost);
    assert_eq!(
        game.state().run.timers.expiry(PowerUpKind::SpeedBoost),
        Some(now + 5.0)
    );

    // Still slowed past the first boost's expiry
    run_seconds(&mut game, 3.0);
    let run = &game.state().run;
    assert!(run.scroll_speed < run.base_scroll_speed);
}

#[test]
fn shield_absorbs_one_hit() {
    let audio = RecordingAudio::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            audio: Box::new(audio.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    game.start(GameMode::Classic);
    game.state_mut().player.has_shield = true;
    game.state_mut().run.combo = 2;
    game.state_mut().run.combo_timer = 3.0;
    place_obstacle_on_player(&mut game);

    game.update(FRAME);

    let state = game.state();
    assert_eq!(state.phase, GamePhase::Playing);
    assert!(!state.player.has_shield);
    assert!(state.generator.obstacles.is_empty());
    assert_eq!(state.run.combo, 2);
    assert_eq!(audio.0.borrow().as_slice(), &[SoundEffect::Shield]);
}

#[test]
fn lane_moves_play_sound_only_when_accepted() {
    let audio = RecordingAudio::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            audio: Box::new(audio.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();

    game.handle_input(InputEvent::MoveLeft);
    assert!(audio.0.borrow().is_empty());

    game.start(GameMode::Classic);
    game.handle_input(InputEvent::MoveLeft);
    // Still moving: ignored
    game.handle_input(InputEvent::MoveRight);
    assert_eq!(audio.0.borrow().as_slice(), &[SoundEffect::Move]);

    run_seconds(&mut game, 1.0);
    assert_eq!(game.state().player.current_lane, 0);
}

#[test]
fn collectibles_route_sounds() {
    let audio = RecordingAudio::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            audio: Box::new(audio.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    game.start(GameMode::Classic);
    let state = game.state_mut();
    let pos = state.player.pos;
    state
        .generator
        .collectibles
        .acquire()
        .1
        .init(CollectibleKind::Gem, 1, pos, Vec2::splat(30.0));
    game.update(FRAME);

    assert_eq!(game.state().run.gems, 1);
    assert_eq!(game.state().run.combo, 2);
    assert!(audio.0.borrow().contains(&SoundEffect::Gem));
}

#[test]
fn collaborator_failures_are_swallowed() {
    let mut game = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(ReadOnlyStorage::default()),
            audio: Box::new(BrokenAudio),
            achievements: Some(Box::new(BrokenAchievements)),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    game.start(GameMode::Classic);
    game.handle_input(InputEvent::MoveRight);
    run_seconds(&mut game, 0.5);
    assert!(game.game_over());

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.save_data().total_games_played, 1);
    assert!(game.last_summary().is_some());
}

#[test]
fn corrupt_save_starts_fresh() {
    let mut mem = MemoryStorage::new();
    mem.set(SAVE_KEY, "\u{0}garbage").unwrap();
    let game = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(mem),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    assert_eq!(game.save_data(), &SaveData::default());
}

#[test]
fn achievements_unlock_once_and_persist() {
    let mem = MemoryStorage::new();
    let ui = RecordingUi::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(mem.clone()),
            ui: Box::new(ui.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();

    game.start(GameMode::Classic);
    game.game_over();
    assert_eq!(ui.achievements.borrow().as_slice(), &["first_run"]);

    game.restart();
    game.game_over();
    assert_eq!(ui.achievements.borrow().len(), 1);

    // A new game over the same storage remembers the unlock
    let ui2 = RecordingUi::default();
    let mut again = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(mem),
            ui: Box::new(ui2.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    again.start(GameMode::Classic);
    again.game_over();
    assert!(ui2.achievements.borrow().is_empty());
    assert_eq!(again.save_data().total_games_played, 3);
}

#[test]
fn combo_streak_unlocks_after_fatal_hit() {
    let ui = RecordingUi::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            ui: Box::new(ui.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    game.start(GameMode::Classic);

    let state = game.state_mut();
    let pos = state.player.pos;
    for _ in 0..5 {
        state
            .generator
            .collectibles
            .acquire()
            .1
            .init(CollectibleKind::Gem, 1, pos, Vec2::splat(30.0));
    }
    game.update(FRAME);
    assert_eq!(game.state().run.combo, 10);

    place_obstacle_on_player(&mut game);
    game.update(FRAME);

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(ui.achievements.borrow().contains(&"combo_10"));
    assert!(game.save_data().achievements.contains("combo_10"));
}

#[test]
fn fatal_hit_ends_frame_processing() {
    let mut game = Game::new(quiet(), Collaborators::headless()).unwrap();
    game.start(GameMode::Classic);

    let state = game.state_mut();
    let (pos, lane) = (state.player.pos, state.player.current_lane);
    state
        .generator
        .power_ups
        .acquire()
        .1
        .init(PowerUpKind::Magnet, lane, pos, Vec2::splat(40.0));
    state
        .generator
        .collectibles
        .acquire()
        .1
        .init(CollectibleKind::Coin, lane as u32, pos, Vec2::splat(30.0));
    place_obstacle_on_player(&mut game);

    game.update(FRAME);

    let state = game.state();
    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.run.coins, 0);
    assert_eq!(state.run.power_ups_collected, 0);
    assert_eq!(state.generator.power_ups.len(), 1);
    assert_eq!(state.generator.collectibles.len(), 1);
}

#[test]
fn time_trial_ends_on_timer() {
    let tuning = Tuning {
        time_trial_duration: 2.0,
        ..quiet()
    };
    let mut game = Game::new(tuning, Collaborators::headless()).unwrap();
    game.start(GameMode::TimeTrial);
    run_seconds(&mut game, 1.0);
    assert_eq!(game.phase(), GamePhase::Playing);
    run_seconds(&mut game, 1.2);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.save_data().total_games_played, 1);
}

#[test]
fn zen_scores_without_combo() {
    let mut zen = Game::new(quiet(), Collaborators::headless()).unwrap();
    zen.start(GameMode::Zen);
    zen.state_mut().run.combo = 20;
    zen.state_mut().run.combo_timer = 100.0;
    run_seconds(&mut zen, 1.0);
    // 120 px/s, no combo factor
    let score = zen.state().run.score;
    assert!((119..=120).contains(&score), "score {score}");
}

#[test]
fn frames_render_and_update_hud() {
    let ui = RecordingUi::default();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            ui: Box::new(ui.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    game.frame(0.0);
    assert_eq!(*ui.huds.borrow(), 0);

    game.start(GameMode::Classic);
    for i in 1..=30 {
        game.frame(i as f64 * 16.0);
    }
    assert_eq!(*ui.huds.borrow(), 30);
    assert!(game.state().run.distance > 0.0);
}

#[test]
fn settings_persist() {
    let mem = MemoryStorage::new();
    let mut game = Game::new(
        quiet(),
        Collaborators {
            storage: Box::new(mem.clone()),
            ..Collaborators::headless()
        },
    )
    .unwrap();
    game.set_sound_enabled(false);
    let saved = SaveStore::new(Box::new(mem)).load();
    assert!(!saved.settings.sound_enabled);
    assert!(saved.settings.music_enabled);
}
