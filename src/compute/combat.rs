//! Combat resolver: firing, projectile travel, hits, splash damage, damage
//! intake and scoring.

use rand::Rng;

use crate::catalog::{EnemyKind, WeaponSpec, SERIOUS_DAMAGE_MULTIPLIER};
use crate::entities::{
    circles_touch, Buffs, Bullet, CrosshairFlash, Explosion, FlashKind, GameState, RunOutcome,
    Vec2,
};
use crate::events::{GameEvent, SoundCue};

/// Seconds a player round survives.
pub const BULLET_LIFE: f64 = 1.6;
/// Share of incoming damage armor soaks up while it lasts.
pub const ARMOR_ABSORPTION: f64 = 0.6;

const MUZZLE_OFFSET: f64 = 6.0;
const BULLET_MARGIN: f64 = 20.0;
const PROJECTILE_MARGIN: f64 = 24.0;
const CROSSHAIR_FLASH_MS: f64 = 160.0;

const EXPLOSION_LIFE: f64 = 0.25;
const ENEMY_EXPLOSION_LIFE: f64 = 0.3;
const MELEE_BURST_LIFE: f64 = 0.12;

/// Multiplier on all damage the player deals.
pub fn damage_multiplier(buffs: &Buffs, now: f64) -> f64 {
    if now < buffs.serious_damage_until {
        SERIOUS_DAMAGE_MULTIPLIER
    } else {
        1.0
    }
}

pub fn flash_crosshair(state: &mut GameState, kind: FlashKind, now: f64) {
    state.crosshair_flash = Some(CrosshairFlash {
        kind,
        until_ms: now + CROSSHAIR_FLASH_MS,
    });
}

pub fn add_screen_shake(state: &mut GameState, amount: f64) {
    if !state.effects_enabled {
        return;
    }
    state.screen_shake = (state.screen_shake + amount).min(1.0);
}

// ── Player fire ──────────────────────────────────────────────────────────────

/// Pull the trigger of the weapon in hand, aiming at `aim`.
///
/// Returns whether a shot went off. A shot is refused while the weapon is
/// cooling down or its finite pool is empty; a refused shot leaves ammo
/// and the cooldown untouched.
pub fn try_shoot(state: &mut GameState, aim: Vec2, now: f64, rng: &mut impl Rng) -> bool {
    let weapon = state.player.weapon.spec();

    if let Some(last) = state.last_shot_ms {
        if now - last < weapon.interval_ms() {
            return false;
        }
    }
    if state.player.ammo.get(weapon.ammo).is_empty() {
        return false;
    }

    match weapon.melee_range {
        Some(range) => swing(state, weapon, range, now),
        None => {
            fire_pellets(state, weapon, aim, rng);
            state.player.ammo.consume(weapon.ammo);
        }
    }

    state.last_shot_ms = Some(now);
    state.emit(GameEvent::Sound(weapon.cue));
    true
}

/// Instant melee strike against everything in reach.
fn swing(state: &mut GameState, weapon: &WeaponSpec, range: f64, now: f64) {
    let damage = weapon.damage * damage_multiplier(&state.buffs, now);
    let origin = state.player.pos;
    let mut hit_any = false;

    for i in (0..state.enemies.len()).rev() {
        let enemy = &mut state.enemies[i];
        if enemy.pos.distance(origin) > range + enemy.radius {
            continue;
        }
        enemy.health -= damage;
        let (pos, dead) = (enemy.pos, enemy.health <= 0.0);
        hit_any = true;

        state
            .explosions
            .push(Explosion::new(pos, range * 0.4, MELEE_BURST_LIFE));
        if dead {
            let enemy = state.enemies.remove(i);
            register_kill(state, enemy.kind);
        }
    }

    if hit_any {
        flash_crosshair(state, FlashKind::Hit, now);
    }
}

fn fire_pellets(state: &mut GameState, weapon: &WeaponSpec, aim: Vec2, rng: &mut impl Rng) {
    let player = &state.player;
    let base_angle = (aim - player.pos).angle();
    let muzzle = player.radius + MUZZLE_OFFSET;
    let origin = player.pos;

    for _ in 0..weapon.pellets {
        let angle = base_angle + weapon.spread * (rng.gen::<f64>() - 0.5);
        let dir = Vec2::from_angle(angle);
        state.bullets.push(Bullet {
            pos: origin + dir * muzzle,
            vel: dir * weapon.speed,
            life: BULLET_LIFE,
            damage: weapon.damage,
            radius: weapon.bullet_radius,
            color: weapon.color,
            explosion_radius: weapon.blast.map(|b| b.radius),
            self_damage: weapon.blast.map_or(0.0, |b| b.self_damage),
        });
    }
}

// ── Projectile travel ────────────────────────────────────────────────────────

pub fn update_bullets(state: &mut GameState, dt: f64, now: f64) {
    let multiplier = damage_multiplier(&state.buffs, now);

    for i in (0..state.bullets.len()).rev() {
        if !state.is_running() {
            return;
        }

        let bullet = &mut state.bullets[i];
        bullet.pos += bullet.vel * dt;
        bullet.life -= dt;
        let (pos, radius) = (bullet.pos, bullet.radius);

        if bullet.life <= 0.0 || state.arena.is_outside(pos, BULLET_MARGIN) {
            let bullet = state.bullets.remove(i);
            if detonate(state, &bullet, pos, now) {
                flash_crosshair(state, FlashKind::Hit, now);
            }
            continue;
        }

        let target = (0..state.enemies.len())
            .rev()
            .find(|&j| circles_touch(state.enemies[j].pos, state.enemies[j].radius, pos, radius));
        let Some(j) = target else {
            continue;
        };

        let bullet = state.bullets.remove(i);
        if bullet.explosion_radius.is_some() {
            detonate(state, &bullet, pos, now);
        } else {
            let enemy = &mut state.enemies[j];
            enemy.health -= bullet.damage * multiplier;
            if enemy.health <= 0.0 {
                let enemy = state.enemies.remove(j);
                register_kill(state, enemy.kind);
            }
        }
        flash_crosshair(state, FlashKind::Hit, now);
    }
}

/// Blow up an explosive round at `at`. Non-explosive rounds do nothing.
///
/// Every enemy whose body overlaps the blast takes full buffed damage; the
/// shooter takes the round's self-damage share if caught in it. Returns
/// whether any enemy was hit.
pub fn detonate(state: &mut GameState, bullet: &Bullet, at: Vec2, now: f64) -> bool {
    let Some(blast_radius) = bullet.explosion_radius else {
        return false;
    };

    state
        .explosions
        .push(Explosion::new(at, blast_radius, EXPLOSION_LIFE));
    state.emit(GameEvent::Sound(SoundCue::Explosion));
    add_screen_shake(state, 0.25);

    let damage = bullet.damage * damage_multiplier(&state.buffs, now);
    let mut hit_enemy = false;

    for j in (0..state.enemies.len()).rev() {
        let enemy = &mut state.enemies[j];
        if !circles_touch(enemy.pos, enemy.radius, at, blast_radius) {
            continue;
        }
        enemy.health -= damage;
        hit_enemy = true;
        if enemy.health <= 0.0 {
            let enemy = state.enemies.remove(j);
            register_kill(state, enemy.kind);
        }
    }

    if bullet.self_damage > 0.0
        && circles_touch(state.player.pos, state.player.radius, at, blast_radius)
    {
        damage_player(state, bullet.damage * bullet.self_damage, now);
    }

    hit_enemy
}

pub fn update_enemy_projectiles(state: &mut GameState, dt: f64, now: f64) {
    for i in (0..state.enemy_projectiles.len()).rev() {
        if !state.is_running() {
            return;
        }

        let projectile = &mut state.enemy_projectiles[i];
        projectile.pos += projectile.vel * dt;
        let (pos, radius) = (projectile.pos, projectile.radius);

        if state.arena.is_outside(pos, PROJECTILE_MARGIN) {
            state.enemy_projectiles.remove(i);
            continue;
        }

        if circles_touch(pos, radius, state.player.pos, state.player.radius) {
            let projectile = state.enemy_projectiles.remove(i);
            if let Some(blast_radius) = projectile.explosion_radius {
                state
                    .explosions
                    .push(Explosion::new(pos, blast_radius, ENEMY_EXPLOSION_LIFE));
            }
            damage_player(state, projectile.damage, now);
        }
    }
}

// ── Damage intake & scoring ──────────────────────────────────────────────────

/// Apply `amount` of incoming damage to the player.
///
/// Armor soaks `ARMOR_ABSORPTION` of each hit for as long as it lasts; the
/// rest comes off health. Dropping to zero health loses the run. Damage
/// after the run has ended is ignored.
pub fn damage_player(state: &mut GameState, amount: f64, now: f64) {
    if state.is_over() {
        return;
    }

    let player = &mut state.player;
    let mut remaining = amount;
    if player.armor > 0.0 {
        let absorbed = player.armor.min(remaining * ARMOR_ABSORPTION);
        player.armor -= absorbed;
        remaining -= absorbed;
    }
    player.health -= remaining;
    let dead = player.health <= 0.0;

    state.emit(GameEvent::PlayerDamaged { amount });
    state.emit(GameEvent::Sound(SoundCue::Hurt));
    flash_crosshair(state, FlashKind::Hurt, now);
    if state.effects_enabled {
        state.hurt_flash = (state.hurt_flash + 0.6).min(1.0);
        add_screen_shake(state, 0.35);
    } else {
        state.hurt_flash = 0.0;
    }

    if dead {
        super::end_run(state, RunOutcome::Defeat);
    }
}

/// Count a kill and award its difficulty-scaled score.
pub fn register_kill(state: &mut GameState, kind: EnemyKind) {
    let score = kind.spec().score * state.difficulty.profile().score_multiplier;
    state.kills += 1;
    state.score += score;
    state.emit(GameEvent::EnemyKilled { kind, score });
}
