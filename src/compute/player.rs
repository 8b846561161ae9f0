//! Player controller: movement, weapon selection and pickup collection.

use rand::Rng;

use crate::catalog::{PickupEffect, PickupKind, WeaponKind, HASTE_MULTIPLIER};
use crate::entities::{circles_touch, Buffs, GameState, Vec2};
use crate::events::{GameEvent, SoundCue};
use crate::input::InputState;

use super::combat;

/// Closest the player may get to an arena edge.
pub const EDGE_MARGIN: f64 = 24.0;

pub fn speed_multiplier(buffs: &Buffs, now: f64) -> f64 {
    if now < buffs.haste_until {
        HASTE_MULTIPLIER
    } else {
        1.0
    }
}

/// Move along `dir` (any length; it is normalized) for `dt` seconds and
/// keep the player inside the arena.
pub fn move_player(state: &mut GameState, dir: Vec2, dt: f64, now: f64) {
    let speed = state.player.speed * speed_multiplier(&state.buffs, now);
    let len = dir.length();
    if len > 0.0 {
        state.player.pos += dir * (speed * dt / len);
    }

    let arena = &state.arena;
    let pos = &mut state.player.pos;
    pos.x = pos.x.clamp(EDGE_MARGIN, (arena.width - EDGE_MARGIN).max(EDGE_MARGIN));
    pos.y = pos.y.clamp(EDGE_MARGIN, (arena.height - EDGE_MARGIN).max(EDGE_MARGIN));
}

/// Apply one tick of held input: move, then fire if the trigger is down.
pub fn handle_input(
    state: &mut GameState,
    input: &InputState,
    dt: f64,
    now: f64,
    rng: &mut impl Rng,
) {
    move_player(state, input.direction(), dt, now);
    if input.firing {
        combat::try_shoot(state, input.aim, now, rng);
    }
}

/// Select the weapon in 1-based `slot`. Returns false (and changes
/// nothing) for a slot outside 1..=8.
pub fn switch_weapon(state: &mut GameState, slot: usize) -> bool {
    let Some(&weapon) = slot.checked_sub(1).and_then(|i| WeaponKind::SLOTS.get(i)) else {
        return false;
    };
    state.player.weapon = weapon;
    true
}

/// Step through the slots by `direction`, wrapping at both ends.
pub fn cycle_weapon(state: &mut GameState, direction: i32) {
    let len = WeaponKind::SLOTS.len() as i64;
    let current = state.player.weapon.slot() as i64;
    let next = (current + i64::from(direction)).rem_euclid(len);
    state.player.weapon = WeaponKind::SLOTS[next as usize];
}

/// Collect every pickup the player is standing on.
pub fn update_pickups(state: &mut GameState, now: f64) {
    for i in (0..state.pickups.len()).rev() {
        let pickup = &state.pickups[i];
        if !circles_touch(pickup.pos, pickup.radius, state.player.pos, state.player.radius) {
            continue;
        }
        let pickup = state.pickups.remove(i);
        apply_pickup(state, pickup.kind, now);
    }
}

pub fn apply_pickup(state: &mut GameState, kind: PickupKind, now: f64) {
    let player = &mut state.player;
    match kind.spec().effect {
        // A pickup never lowers health, so Easy's 120 survives a health pack.
        PickupEffect::Heal { amount, cap } => {
            player.health = player.health.max((player.health + amount).min(cap));
        }
        PickupEffect::Armor { amount, cap } => {
            player.armor = player.armor.max((player.armor + amount).min(cap));
        }
        PickupEffect::Ammo { kind, amount, cap } => player.ammo.refill(kind, amount, cap),
        PickupEffect::SeriousDamage { duration_ms } => {
            state.buffs.serious_damage_until = now + duration_ms;
        }
        PickupEffect::Haste { duration_ms } => state.buffs.haste_until = now + duration_ms,
    }

    let cue = if kind.is_buff() {
        SoundCue::Buff
    } else {
        SoundCue::Pickup
    };
    state.emit(GameEvent::Sound(cue));
    state.emit(GameEvent::PickupCollected { kind });
}
