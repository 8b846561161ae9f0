//! Wave director: spawning and the clear → intermission → next wave cycle.

use rand::Rng;
use tracing::debug;

use crate::catalog::{music_for_wave, Difficulty, EnemyKind, PickupKind, WAVES};
use crate::entities::{Arena, Enemy, EnemyTimers, GameState, Pickup, RunOutcome, Vec2};
use crate::events::{GameEvent, MusicIntensity};

/// Gap between clearing a wave and the next one arriving.
pub const WAVE_INTERMISSION_MS: f64 = 1200.0;

/// Pickups scattered when a run begins.
pub const STARTING_PICKUPS: [PickupKind; 5] = [
    PickupKind::Shells,
    PickupKind::Smg,
    PickupKind::Rockets,
    PickupKind::Cells,
    PickupKind::Cannonballs,
];

/// Pickups restocked at every intermission, before the random extras.
const INTERMISSION_PICKUPS: [PickupKind; 5] = [
    PickupKind::Health,
    PickupKind::Shells,
    PickupKind::Smg,
    PickupKind::Rockets,
    PickupKind::Cells,
];

const PICKUP_PADDING: f64 = 40.0;
const ANCHOR_JITTER: f64 = 40.0;

const FIRST_DIVE_DELAY_MS: f64 = 1200.0;
const FIRST_DIVE_JITTER_MS: f64 = 1400.0;
const FIRST_STOMP_DELAY_MS: f64 = 1800.0;

/// Enemies spawned for a group of `count` on this difficulty. Never zero.
pub fn scaled_count(count: u32, difficulty: Difficulty) -> u32 {
    let scaled = (f64::from(count) * difficulty.profile().enemy_count).round() as u32;
    scaled.max(1)
}

/// Spawn every group of wave `index`. An index past the script is ignored.
pub fn spawn_wave(state: &mut GameState, index: usize, rng: &mut impl Rng) {
    let Some(wave) = WAVES.get(index) else {
        return;
    };
    state.emit(GameEvent::Music(music_for_wave(index)));
    state.emit(GameEvent::WaveStarted { index });

    for group in wave.groups() {
        let count = scaled_count(group.count, state.difficulty);
        for _ in 0..count {
            spawn_enemy(state, group.kind, rng);
        }
        debug!(wave = index, kind = group.kind.name(), count, "spawned group");
    }
}

/// Spawn one enemy with stats scaled by the current difficulty.
pub fn spawn_enemy(state: &mut GameState, kind: EnemyKind, rng: &mut impl Rng) {
    let spec = kind.spec();
    let profile = state.difficulty.profile();
    let now = state.clock_ms;

    let health = (spec.health * profile.enemy_health).round();
    let timers = EnemyTimers {
        last_shot_ms: None,
        next_dive_ms: now + FIRST_DIVE_DELAY_MS + rng.gen::<f64>() * FIRST_DIVE_JITTER_MS,
        next_stomp_ms: now + FIRST_STOMP_DELAY_MS,
        strafe_dir: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
    };

    let pos = spawn_position(&state.arena, spec.radius, rng);
    state.enemies.push(Enemy {
        kind,
        pos,
        radius: spec.radius,
        speed: spec.speed * profile.enemy_speed,
        damage: (spec.damage * profile.enemy_damage).round(),
        health,
        max_health: health,
        color: spec.color,
        timers,
    });
}

/// Where a new enemy of the given radius appears: a random level anchor
/// with some jitter, or just past a random edge of the arena.
pub fn spawn_position(arena: &Arena, radius: f64, rng: &mut impl Rng) -> Vec2 {
    if !arena.spawn_anchors.is_empty() {
        let anchor = arena.spawn_anchors[rng.gen_range(0..arena.spawn_anchors.len())];
        let jitter = Vec2::new(
            rng.gen_range(-ANCHOR_JITTER..=ANCHOR_JITTER),
            rng.gen_range(-ANCHOR_JITTER..=ANCHOR_JITTER),
        );
        return anchor + jitter;
    }

    let offset = radius * 2.0;
    match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen::<f64>() * arena.width, -offset),
        1 => Vec2::new(arena.width + offset, rng.gen::<f64>() * arena.height),
        2 => Vec2::new(rng.gen::<f64>() * arena.width, arena.height + offset),
        _ => Vec2::new(-offset, rng.gen::<f64>() * arena.height),
    }
}

pub fn spawn_pickup(state: &mut GameState, kind: PickupKind, rng: &mut impl Rng) {
    let arena = &state.arena;
    let usable_w = (arena.width - PICKUP_PADDING * 2.0).max(0.0);
    let usable_h = (arena.height - PICKUP_PADDING * 2.0).max(0.0);
    let pos = Vec2::new(
        PICKUP_PADDING + rng.gen::<f64>() * usable_w,
        PICKUP_PADDING + rng.gen::<f64>() * usable_h,
    );
    state.pickups.push(Pickup {
        kind,
        pos,
        radius: kind.spec().radius,
    });
}

/// Replace whatever is lying around with a fresh intermission stock.
pub fn spawn_intermission_pickups(state: &mut GameState, rng: &mut impl Rng) {
    state.pickups.clear();
    for kind in INTERMISSION_PICKUPS {
        spawn_pickup(state, kind, rng);
    }
    if state.wave_index >= 4 {
        spawn_pickup(state, PickupKind::Cannonballs, rng);
    }
    if rng.gen::<f64>() > 0.4 {
        spawn_pickup(state, PickupKind::Armor, rng);
    }
    if rng.gen::<f64>() > 0.45 {
        spawn_pickup(state, PickupKind::SeriousDamage, rng);
    }
    if rng.gen::<f64>() > 0.5 {
        spawn_pickup(state, PickupKind::Haste, rng);
    }
}

/// Start the next wave once the pending intermission has elapsed.
pub fn advance_if_due(state: &mut GameState, now: f64, rng: &mut impl Rng) {
    let Some(until) = state.wave_delay_until else {
        return;
    };
    if now < until {
        return;
    }
    state.wave_delay_until = None;
    state.wave_index += 1;
    let index = state.wave_index;
    if index < WAVES.len() {
        spawn_wave(state, index, rng);
    }
}

/// Called after enemies have moved. When the field is clear, schedule
/// exactly one intermission, or win the run if the script is exhausted.
pub fn check_progress(state: &mut GameState, now: f64, rng: &mut impl Rng) {
    if !state.enemies.is_empty() || state.wave_delay_until.is_some() {
        return;
    }

    if state.wave_index + 1 < WAVES.len() {
        let until_ms = now + WAVE_INTERMISSION_MS;
        state.wave_delay_until = Some(until_ms);
        state.emit(GameEvent::Music(MusicIntensity::Calm));
        state.emit(GameEvent::IntermissionStarted { until_ms });
        spawn_intermission_pickups(state, rng);
        debug!(wave = state.wave_index, until_ms, "wave cleared");
    } else {
        super::end_run(state, RunOutcome::Victory);
    }
}
