//! Enemy behavior table.
//!
//! Each archetype maps to a pure `Behavior` that looks at one enemy and what
//! it can sense and returns an `Intent`. `update_enemies` applies intents to
//! the world, which keeps every behavior testable without a `GameState`.

use rand::{Rng, RngCore};

use crate::catalog::EnemyKind;
use crate::entities::{
    circles_touch, Enemy, EnemyProjectile, EnemyTimers, Explosion, GameState, Vec2,
};
use crate::events::{GameEvent, SoundCue};

use super::combat;

/// What an enemy perceives this tick.
#[derive(Clone, Copy, Debug)]
pub struct Sense {
    pub player: Vec2,
    /// Seconds.
    pub dt: f64,
    /// Simulation milliseconds.
    pub now: f64,
}

/// A boss ground slam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stomp {
    pub origin: Vec2,
    pub radius: f64,
    /// Damage dealt to the player, if the player was close enough.
    pub player_damage: Option<f64>,
}

/// What an enemy decided to do this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Intent {
    pub pos: Vec2,
    pub timers: EnemyTimers,
    pub projectiles: Vec<EnemyProjectile>,
    pub stomp: Option<Stomp>,
}

impl Intent {
    fn stay(enemy: &Enemy) -> Intent {
        Intent {
            pos: enemy.pos,
            timers: enemy.timers,
            projectiles: Vec::new(),
            stomp: None,
        }
    }
}

pub type Behavior = fn(&Enemy, &Sense, &mut dyn RngCore) -> Intent;

pub fn behavior(kind: EnemyKind) -> Behavior {
    match kind {
        EnemyKind::Gnaar | EnemyKind::Kamikaze | EnemyKind::Kleer => chase,
        EnemyKind::BioMech => bio_mech,
        EnemyKind::Werebull => werebull,
        EnemyKind::Harpy => harpy,
        EnemyKind::Reptiloid => reptiloid,
        EnemyKind::UghZan => ugh_zan,
    }
}

pub const STOMP_RADIUS: f64 = 180.0;
pub const STOMP_REACH: f64 = 200.0;
const STOMP_DAMAGE_FACTOR: f64 = 0.75;
const SHOCKWAVE_LIFE: f64 = 0.45;

const DEFAULT_SHOT_COLOR: &str = "#ff95ff";
const REPTILOID_SHOT_COLOR: &str = "#22d3ee";
const BOSS_SHOT_COLOR: &str = "#ff8f5e";

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Unit vector toward the player and the distance to it. A zero distance
/// counts as 1 so the direction stays finite.
fn heading(enemy: &Enemy, sense: &Sense) -> (Vec2, f64) {
    let delta = sense.player - enemy.pos;
    let mut dist = delta.length();
    if dist == 0.0 {
        dist = 1.0;
    }
    (delta * (1.0 / dist), dist)
}

/// Whether the ranged cooldown has elapsed. An enemy that never fired may
/// fire at once.
fn ready_to_fire(enemy: &Enemy, now: f64) -> bool {
    let Some(ranged) = enemy.kind.spec().ranged else {
        return false;
    };
    match enemy.timers.last_shot_ms {
        Some(last) => now - last > ranged.interval_ms(),
        None => true,
    }
}

fn shot(
    enemy: &Enemy,
    from: Vec2,
    angle: f64,
    radius: f64,
    explosion_radius: Option<f64>,
    color: &'static str,
) -> EnemyProjectile {
    let speed = enemy
        .kind
        .spec()
        .ranged
        .map_or(0.0, |r| r.projectile_speed);
    EnemyProjectile {
        pos: from,
        vel: Vec2::from_angle(angle) * speed,
        radius,
        damage: enemy.damage,
        explosion_radius,
        color,
    }
}

// ── Behaviors ────────────────────────────────────────────────────────────────

fn chase(enemy: &Enemy, sense: &Sense, _rng: &mut dyn RngCore) -> Intent {
    let (dir, _) = heading(enemy, sense);
    let mut intent = Intent::stay(enemy);
    intent.pos += dir * (enemy.speed * sense.dt);
    intent
}

/// Holds a firing range of roughly 270 to 310 units.
fn bio_mech(enemy: &Enemy, sense: &Sense, _rng: &mut dyn RngCore) -> Intent {
    let (dir, dist) = heading(enemy, sense);
    let step = enemy.speed * sense.dt;
    let mut intent = Intent::stay(enemy);

    if dist < 270.0 {
        intent.pos += dir * -step;
    } else if dist > 310.0 {
        intent.pos += dir * step;
    }

    if ready_to_fire(enemy, sense.now) {
        intent
            .projectiles
            .push(shot(enemy, intent.pos, dir.angle(), 6.0, None, DEFAULT_SHOT_COLOR));
        intent.timers.last_shot_ms = Some(sense.now);
    }
    intent
}

fn werebull(enemy: &Enemy, sense: &Sense, _rng: &mut dyn RngCore) -> Intent {
    let (dir, dist) = heading(enemy, sense);
    let charge = if dist > 240.0 { 1.25 } else { 1.05 };
    let mut intent = Intent::stay(enemy);
    intent.pos += dir * (enemy.speed * charge * sense.dt);
    intent
}

fn harpy(enemy: &Enemy, sense: &Sense, rng: &mut dyn RngCore) -> Intent {
    let (dir, dist) = heading(enemy, sense);
    let step = enemy.speed * sense.dt;
    let mut intent = Intent::stay(enemy);

    if dist > 240.0 {
        intent.pos += dir * step;
    } else if dist < 170.0 {
        intent.pos += dir * (-step * 0.9);
    } else {
        intent.pos += dir.perp() * (step * 0.7);
    }

    if ready_to_fire(enemy, sense.now) {
        intent
            .projectiles
            .push(shot(enemy, intent.pos, dir.angle(), 5.0, None, DEFAULT_SHOT_COLOR));
        intent.timers.last_shot_ms = Some(sense.now);
    }

    if sense.now >= enemy.timers.next_dive_ms && dist < 200.0 {
        intent.pos += dir * (step * 1.4);
        intent.timers.next_dive_ms = sense.now + 2000.0 + rng.gen::<f64>() * 1800.0;
    }
    intent
}

fn reptiloid(enemy: &Enemy, sense: &Sense, rng: &mut dyn RngCore) -> Intent {
    let (dir, dist) = heading(enemy, sense);
    let step = enemy.speed * sense.dt;
    let mut intent = Intent::stay(enemy);

    if dist > 280.0 {
        intent.pos += dir * step;
    } else if dist < 230.0 {
        intent.pos += dir * -step;
    } else {
        intent.pos += dir.perp() * (step * 0.7 * enemy.timers.strafe_dir);
    }

    if rng.gen::<f64>() > 0.995 {
        intent.timers.strafe_dir = -intent.timers.strafe_dir;
    }

    if ready_to_fire(enemy, sense.now) {
        let wobble = (rng.gen::<f64>() - 0.5) * 0.18;
        intent.projectiles.push(shot(
            enemy,
            intent.pos,
            dir.angle() + wobble,
            7.0,
            Some(46.0),
            REPTILOID_SHOT_COLOR,
        ));
        intent.timers.last_shot_ms = Some(sense.now);
    }
    intent
}

/// The boss: a slow advance, a three-shot explosive volley and a periodic
/// stomp that hurts anyone standing close.
fn ugh_zan(enemy: &Enemy, sense: &Sense, rng: &mut dyn RngCore) -> Intent {
    let (dir, dist) = heading(enemy, sense);
    let mut intent = Intent::stay(enemy);

    if dist > 220.0 {
        intent.pos += dir * (enemy.speed * sense.dt);
    }

    if ready_to_fire(enemy, sense.now) {
        for _ in 0..3 {
            let spread = (rng.gen::<f64>() - 0.5) * 0.25;
            intent.projectiles.push(shot(
                enemy,
                intent.pos,
                dir.angle() + spread,
                8.0,
                Some(70.0),
                BOSS_SHOT_COLOR,
            ));
        }
        intent.timers.last_shot_ms = Some(sense.now);
    }

    if sense.now >= enemy.timers.next_stomp_ms {
        let in_reach = intent.pos.distance(sense.player) <= STOMP_REACH;
        intent.stomp = Some(Stomp {
            origin: intent.pos,
            radius: STOMP_RADIUS,
            player_damage: in_reach.then_some(enemy.damage * STOMP_DAMAGE_FACTOR),
        });
        intent.timers.next_stomp_ms = sense.now + 2400.0 + rng.gen::<f64>() * 1200.0;
    }
    intent
}

// ── Dispatcher ───────────────────────────────────────────────────────────────

/// Run every enemy's behavior, then resolve body contact with the player.
/// A touching enemy deals its damage and is removed without scoring.
pub fn update_enemies<R: Rng>(state: &mut GameState, dt: f64, now: f64, rng: &mut R) {
    for i in (0..state.enemies.len()).rev() {
        let sense = Sense {
            player: state.player.pos,
            dt,
            now,
        };
        let enemy = &state.enemies[i];
        let intent = behavior(enemy.kind)(enemy, &sense, rng);

        let enemy = &mut state.enemies[i];
        enemy.pos = intent.pos;
        enemy.timers = intent.timers;

        if !intent.projectiles.is_empty() {
            state.enemy_projectiles.extend(intent.projectiles);
            state.emit(GameEvent::Sound(SoundCue::EnemyFire));
        }
        if let Some(stomp) = intent.stomp {
            state
                .shockwaves
                .push(Explosion::new(stomp.origin, stomp.radius, SHOCKWAVE_LIFE));
            if let Some(damage) = stomp.player_damage {
                combat::damage_player(state, damage, now);
            }
        }
        if !state.is_running() {
            return;
        }

        let enemy = &state.enemies[i];
        if circles_touch(enemy.pos, enemy.radius, state.player.pos, state.player.radius) {
            let enemy = state.enemies.remove(i);
            combat::damage_player(state, enemy.damage, now);
            if !state.is_running() {
                return;
            }
        }
    }
}
