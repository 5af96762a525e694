//! Fixed timestep simulation tick
//!
//! Order within a tick: clock and mode timer, difficulty, power-up expiry,
//! combo decay, player, spawning, entity movement, collisions, then distance
//! and score. A fatal collision freezes the run for the rest of the tick.

use glam::Vec2;
use rand::Rng;

use super::entity::{CollectibleKind, MagnetField, PowerUpKind, colors};
use super::state::{GameEvent, GameOverReason, GamePhase, GameState};

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }

    state.run.clock += dt as f64;

    if let Some(time_left) = state.run.time_left.as_mut() {
        *time_left -= dt;
        if *time_left <= 0.0 {
            *time_left = 0.0;
            state.end_run(GameOverReason::TimeUp);
            return;
        }
    }

    update_difficulty(state, dt);
    update_power_up_timers(state);
    update_combo(state, dt);

    state.player.update(dt);

    let (tuning, run, rng) = (&state.tuning, &state.run, &mut state.rng);
    state
        .generator
        .update(tuning, run.scroll_speed, run.difficulty, dt, rng);

    update_obstacles(state, dt);
    update_power_up_items(state, dt);
    update_collectibles(state, dt);
    update_particles(state, dt);

    if check_collisions(state) {
        return;
    }

    accrue_distance_and_score(state, dt);
}

/// Step the difficulty accumulator on its fixed interval
fn update_difficulty(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning;
    let run = &mut state.run;

    run.difficulty_timer += dt;
    if run.difficulty_timer < tuning.difficulty_interval {
        return;
    }
    run.difficulty_timer -= tuning.difficulty_interval;
    run.difficulty += tuning.difficulty_increase_rate;
    run.base_scroll_speed =
        tuning.clamp_speed(run.base_scroll_speed + tuning.difficulty_speed_step());

    log::debug!(
        "Difficulty {:.2}, base speed {:.0}",
        run.difficulty,
        run.base_scroll_speed
    );
    state.events.push(GameEvent::DifficultyUp {
        level: run.difficulty,
    });
    refresh_scroll_speed(state);
}

/// Effective speed = baseline x active slowdowns, clamped to the configured range
fn refresh_scroll_speed(state: &mut GameState) {
    let tuning = &state.tuning;
    let run = &mut state.run;
    let mut speed = run.base_scroll_speed;
    if run.timers.is_active(PowerUpKind::SpeedBoost, run.clock) {
        speed *= tuning.speed_boost_multiplier;
    }
    if run.timers.is_active(PowerUpKind::SlowMotion, run.clock) {
        speed *= tuning.slow_motion_multiplier;
    }
    run.scroll_speed = tuning.clamp_speed(speed);
}

/// Revert effects whose timer ran out
fn update_power_up_timers(state: &mut GameState) {
    let mut expired_any = false;
    while let Some(kind) = state.run.timers.pop_expired(state.run.clock) {
        match kind {
            PowerUpKind::ScoreMultiplier => state.run.score_multiplier = 1,
            PowerUpKind::Ghost => state.player.is_ghost = false,
            // Speed modifiers are recomputed below; magnet is read from its timer
            PowerUpKind::SpeedBoost | PowerUpKind::SlowMotion | PowerUpKind::Magnet => {}
            PowerUpKind::Shield => {}
        }
        state.events.push(GameEvent::PowerUpExpired(kind));
        expired_any = true;
    }
    if expired_any {
        refresh_scroll_speed(state);
    }
}

fn update_combo(state: &mut GameState, dt: f32) {
    let run = &mut state.run;
    if run.combo > 0 {
        run.combo_timer -= dt;
        if run.combo_timer <= 0.0 {
            run.combo = 0;
            run.combo_timer = 0.0;
        }
    }
}

/// Scroll obstacles; ones that leave the screen count as dodged
fn update_obstacles(state: &mut GameState, dt: f32) {
    let speed = state.run.scroll_speed;
    let height = state.tuning.canvas_height;
    let combo_timeout = state.tuning.combo_timeout;
    let run = &mut state.run;
    let events = &mut state.events;

    state.generator.obstacles.retain(|obstacle| {
        obstacle.update(dt, speed);
        if obstacle.is_off_screen(height) {
            run.obstacles_avoided += 1;
            run.add_combo(1, combo_timeout);
            events.push(GameEvent::ObstacleDodged);
            false
        } else {
            true
        }
    });
}

fn update_power_up_items(state: &mut GameState, dt: f32) {
    let speed = state.run.scroll_speed;
    let height = state.tuning.canvas_height;
    state.generator.power_ups.retain(|p| {
        p.update(dt, speed);
        !p.is_off_screen(height)
    });
}

/// Scroll collectibles, pulling those near the player while the magnet runs
fn update_collectibles(state: &mut GameState, dt: f32) {
    let speed = state.run.scroll_speed;
    let height = state.tuning.canvas_height;
    let magnet = state
        .run
        .timers
        .is_active(PowerUpKind::Magnet, state.run.clock)
        .then(|| MagnetField {
            center: state.player.center(),
            radius: state.tuning.magnet_radius,
            coin_pull: state.tuning.magnet_pull_coin,
            gem_pull: state.tuning.magnet_pull_gem,
        });

    state.generator.collectibles.retain(|c| {
        c.update(dt, speed, magnet.as_ref());
        !c.is_off_screen(height)
    });
}

fn update_particles(state: &mut GameState, dt: f32) {
    state.particles.retain(|p| p.update(dt));
}

/// Radial burst of particles
fn emit_particles(state: &mut GameState, center: Vec2, color: u32) {
    let count = state.tuning.particle_count;
    let speed = state.tuning.particle_speed;
    let lifetime = state.tuning.particle_lifetime;
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count as f32;
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let size = state.rng.random_range(3.0..6.0);
        state
            .particles
            .acquire()
            .1
            .init(center, vel, lifetime, color, size);
    }
}

/// Resolve overlaps: obstacles, then power-ups, then currency.
/// Returns true if the run ended.
fn check_collisions(state: &mut GameState) -> bool {
    let player_box = state.player.bounds();

    if !state.player.is_ghost {
        while let Some(handle) = state
            .generator
            .obstacles
            .find(|o| o.bounds().intersects(&player_box))
        {
            if !state.player.has_shield {
                let center = state.player.center();
                emit_particles(state, center, colors::COLLISION);
                state.end_run(GameOverReason::Collision);
                return true;
            }

            state.player.has_shield = false;
            let center = state
                .generator
                .obstacles
                .get(handle)
                .map(|o| o.bounds().center())
                .unwrap_or_else(|| state.player.center());
            state.generator.obstacles.release(handle);
            state.events.push(GameEvent::ShieldBlocked);
            emit_particles(state, center, colors::SHIELD);
        }
    }

    while let Some(handle) = state
        .generator
        .power_ups
        .find(|p| p.bounds().intersects(&player_box))
    {
        let Some((kind, center)) = state
            .generator
            .power_ups
            .get(handle)
            .map(|p| (p.kind, p.bounds().center()))
        else {
            break;
        };
        state.generator.power_ups.release(handle);
        apply_power_up(state, kind);
        emit_particles(state, center, colors::POWERUP);
    }

    while let Some(handle) = state
        .generator
        .collectibles
        .find(|c| c.bounds().intersects(&player_box))
    {
        let Some((kind, value, center)) = state
            .generator
            .collectibles
            .get(handle)
            .map(|c| (c.kind, c.value, c.bounds().center()))
        else {
            break;
        };
        state.generator.collectibles.release(handle);
        collect(state, kind, value);
        let color = match kind {
            CollectibleKind::Coin => colors::COIN,
            CollectibleKind::Gem => colors::GEM,
        };
        emit_particles(state, center, color);
    }

    false
}

/// Apply a power-up's pickup effect and (re)start its timer
pub fn apply_power_up(state: &mut GameState, kind: PowerUpKind) {
    let now = state.run.clock;
    state.run.power_ups_collected += 1;

    match kind {
        PowerUpKind::Shield => state.player.has_shield = true,
        PowerUpKind::ScoreMultiplier => state.run.score_multiplier = state.tuning.score_multiplier,
        PowerUpKind::Ghost => state.player.is_ghost = true,
        PowerUpKind::SpeedBoost | PowerUpKind::SlowMotion | PowerUpKind::Magnet => {}
    }
    if let Some(duration) = kind.duration(&state.tuning) {
        state.run.timers.activate(kind, now, duration);
    }

    state.events.push(GameEvent::PowerUpCollected(kind));
    refresh_scroll_speed(state);
}

fn collect(state: &mut GameState, kind: CollectibleKind, value: u32) {
    let tuning = &state.tuning;
    let run = &mut state.run;
    match kind {
        CollectibleKind::Coin => {
            run.coins += value;
            run.score += value as u64 * tuning.coin_score;
            run.add_combo(1, tuning.combo_timeout);
            state.events.push(GameEvent::CoinCollected { value });
        }
        CollectibleKind::Gem => {
            run.gems += value;
            run.score += value as u64 * tuning.gem_score;
            run.add_combo(2, tuning.combo_timeout);
            state.events.push(GameEvent::GemCollected { value });
        }
    }
}

fn accrue_distance_and_score(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning;
    let run = &mut state.run;

    run.distance += run.scroll_speed * dt;

    let combo_factor = if state.mode.uses_combo() {
        1.0 + run.combo as f32 * tuning.combo_step
    } else {
        1.0
    };
    run.score_carry += run.scroll_speed * dt * run.score_multiplier as f32 * combo_factor;
    let whole = run.score_carry.floor();
    run.score += whole as u64;
    run.score_carry -= whole;
}
