//! Game logic: the run state machine and the per-frame tick.
//!
//! Every function takes the world as `&mut GameState` and, where needed, an
//! RNG handle. Randomness only ever comes through that handle and time only
//! through the simulation clock, so a seeded RNG makes a run reproducible.

pub mod ai;
pub mod combat;
pub mod player;
pub mod waves;

use rand::Rng;
use tracing::info;

use crate::catalog::{music_for_wave, Difficulty, WAVES};
use crate::entities::{
    Arena, Buffs, GameState, Player, RunOutcome, RunStatus, RunSummary, Vec2,
};
use crate::events::GameEvent;
use crate::input::InputState;

/// Longest step a single frame may simulate. Longer gaps (a stalled
/// terminal, a resumed laptop) are truncated instead of replayed.
pub const MAX_FRAME_MS: f64 = 100.0;

const SHAKE_DECAY_PER_SEC: f64 = 2.0;
const HURT_FLASH_DECAY_PER_SEC: f64 = 1.8;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build an idle world for the given arena. Nothing moves until
/// `start_game` is called.
pub fn init_state(arena: Arena, difficulty: Difficulty) -> GameState {
    let profile = difficulty.profile();
    let player = Player::new(
        start_position(&arena),
        profile.player_health,
        profile.player_armor,
    );
    GameState {
        arena,
        difficulty,
        status: RunStatus::Idle,
        player,
        bullets: Vec::new(),
        enemies: Vec::new(),
        enemy_projectiles: Vec::new(),
        pickups: Vec::new(),
        explosions: Vec::new(),
        shockwaves: Vec::new(),
        wave_index: 0,
        wave_delay_until: None,
        score: 0.0,
        kills: 0,
        clock_ms: 0.0,
        last_frame_ms: None,
        last_shot_ms: None,
        buffs: Buffs::default(),
        effects_enabled: true,
        screen_shake: 0.0,
        hurt_flash: 0.0,
        crosshair_flash: None,
        summary: None,
        events: Vec::new(),
    }
}

fn start_position(arena: &Arena) -> Vec2 {
    Vec2::new(arena.width / 2.0, arena.height * 0.65)
}

// ── Run lifecycle ────────────────────────────────────────────────────────────

/// Reset the world and begin a fresh run. Works from any state, which is
/// also how a finished run is restarted.
pub fn start_game(
    state: &mut GameState,
    difficulty: Difficulty,
    timestamp_ms: f64,
    rng: &mut impl Rng,
) {
    let profile = difficulty.profile();

    state.difficulty = difficulty;
    state.status = RunStatus::Running;
    state.clock_ms = 0.0;
    state.last_frame_ms = Some(timestamp_ms);
    state.last_shot_ms = None;
    state.wave_index = 0;
    state.wave_delay_until = None;
    state.score = 0.0;
    state.kills = 0;
    state.buffs = Buffs::default();
    state.screen_shake = 0.0;
    state.hurt_flash = 0.0;
    state.crosshair_flash = None;
    state.summary = None;

    state.bullets.clear();
    state.enemies.clear();
    state.enemy_projectiles.clear();
    state.pickups.clear();
    state.explosions.clear();
    state.shockwaves.clear();

    state.player = Player::new(
        start_position(&state.arena),
        profile.player_health,
        profile.player_armor,
    );

    info!(difficulty = difficulty.key(), "run started");

    waves::spawn_wave(state, 0, rng);
    for kind in waves::STARTING_PICKUPS {
        waves::spawn_pickup(state, kind, rng);
    }
}

/// Freeze the tick. Only a running game can be paused.
pub fn pause_game(state: &mut GameState) {
    if state.status != RunStatus::Running {
        return;
    }
    state.status = RunStatus::Paused;
    state.emit(GameEvent::MusicStopped);
    info!(clock_ms = state.clock_ms, "run paused");
}

/// Continue a paused run. The frame baseline is reset to `timestamp_ms` so
/// the time spent paused is never fed into the simulation.
pub fn resume_game(state: &mut GameState, timestamp_ms: f64) {
    if state.status != RunStatus::Paused {
        return;
    }
    state.status = RunStatus::Running;
    state.last_frame_ms = Some(timestamp_ms);
    state.emit(GameEvent::Music(music_for_wave(state.wave_index)));
    info!(clock_ms = state.clock_ms, "run resumed");
}

/// Stop the run and freeze its statistics. Calling it on a finished run
/// does nothing, so the first outcome wins.
pub fn end_run(state: &mut GameState, outcome: RunOutcome) {
    if state.is_over() {
        return;
    }
    state.status = RunStatus::Ended(outcome);

    let cleared_current = usize::from(state.enemies.is_empty());
    let waves_cleared = (state.wave_index + cleared_current).min(WAVES.len());
    let summary = RunSummary {
        difficulty: state.difficulty,
        score: state.score.round().max(0.0) as u64,
        kills: state.kills,
        waves_cleared: waves_cleared as u32,
        time_secs: (state.clock_ms / 1000.0).round().max(0.0) as u64,
        victory: outcome == RunOutcome::Victory,
    };
    state.summary = Some(summary);

    state.emit(GameEvent::MusicStopped);
    state.emit(GameEvent::RunEnded { outcome });
    info!(
        ?outcome,
        score = summary.score,
        kills = summary.kills,
        waves = summary.waves_cleared,
        secs = summary.time_secs,
        "run ended"
    );
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the world for one rendered frame stamped `timestamp_ms`
/// (a monotonic wall-clock reading). Does nothing unless running.
pub fn frame(
    state: &mut GameState,
    timestamp_ms: f64,
    input: &InputState,
    rng: &mut impl Rng,
) {
    if !state.is_running() {
        return;
    }
    let baseline = state.last_frame_ms.unwrap_or(timestamp_ms);
    let dt_ms = (timestamp_ms - baseline).clamp(0.0, MAX_FRAME_MS);
    state.last_frame_ms = Some(timestamp_ms);
    tick(state, dt_ms / 1000.0, input, rng);
}

/// Advance the simulation by `dt` seconds.
///
/// Phases run in a fixed order: pending wave, player input, bullets,
/// enemies and wave progress, enemy projectiles, pickups, visual timers.
/// If the run ends part-way through, the remaining phases are skipped.
pub fn tick(state: &mut GameState, dt: f64, input: &InputState, rng: &mut impl Rng) {
    if !state.is_running() {
        return;
    }
    state.clock_ms += dt * 1000.0;
    let now = state.clock_ms;

    waves::advance_if_due(state, now, rng);

    player::handle_input(state, input, dt, now, rng);
    combat::update_bullets(state, dt, now);
    if !state.is_running() {
        return;
    }

    ai::update_enemies(state, dt, now, rng);
    if !state.is_running() {
        return;
    }
    waves::check_progress(state, now, rng);
    if !state.is_running() {
        return;
    }

    combat::update_enemy_projectiles(state, dt, now);
    if !state.is_running() {
        return;
    }

    player::update_pickups(state, now);
    update_visuals(state, dt, now);
}

/// Decay purely cosmetic timers.
fn update_visuals(state: &mut GameState, dt: f64, now: f64) {
    for explosion in state.explosions.iter_mut().chain(state.shockwaves.iter_mut()) {
        explosion.life -= dt;
    }
    state.explosions.retain(|e| e.life > 0.0);
    state.shockwaves.retain(|e| e.life > 0.0);

    if state.effects_enabled {
        state.screen_shake = (state.screen_shake - dt * SHAKE_DECAY_PER_SEC).max(0.0);
        state.hurt_flash = (state.hurt_flash - dt * HURT_FLASH_DECAY_PER_SEC).max(0.0);
    } else {
        state.screen_shake = 0.0;
        state.hurt_flash = 0.0;
    }

    if state.crosshair_flash.is_some_and(|f| now >= f.until_ms) {
        state.crosshair_flash = None;
    }
}

/// Drop keyboard/mouse state and pause, as when the window loses focus.
pub fn focus_lost(state: &mut GameState, input: &mut InputState) {
    input.clear();
    pause_game(state);
}
