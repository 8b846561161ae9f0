use arena_shooter::catalog::*;
use arena_shooter::compute::player::*;
use arena_shooter::compute::*;
use arena_shooter::entities::*;
use arena_shooter::events::*;
use arena_shooter::input::InputState;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_state(difficulty: Difficulty, rng: &mut StdRng) -> GameState {
    let mut s = init_state(Arena::default(), difficulty);
    start_game(&mut s, difficulty, 0.0, rng);
    s.enemies.clear();
    s.pickups.clear();
    s.events.clear();
    s
}

fn drop_pickup_on_player(s: &mut GameState, kind: PickupKind) {
    s.pickups.push(Pickup {
        kind,
        pos: s.player.pos,
        radius: kind.spec().radius,
    });
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn diagonal_movement_is_normalized() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    let start = s.player.pos;

    move_player(&mut s, Vec2::new(1.0, 1.0), 0.5, 0.0);
    assert!((s.player.pos.distance(start) - 120.0).abs() < 1e-9);
    assert!((s.player.pos.x - s.player.pos.y - (start.x - start.y)).abs() < 1e-9);
}

#[test]
fn haste_speeds_the_player_up() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    s.buffs.haste_until = 1000.0;
    let start = s.player.pos;

    move_player(&mut s, Vec2::new(1.0, 0.0), 0.1, 500.0);
    assert!((s.player.pos.x - (start.x + 30.0)).abs() < 1e-9);

    move_player(&mut s, Vec2::new(1.0, 0.0), 0.1, 1000.0);
    assert!((s.player.pos.x - (start.x + 54.0)).abs() < 1e-9);
}

#[test]
fn player_stays_inside_the_edges() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);

    move_player(&mut s, Vec2::new(-1.0, -1.0), 10.0, 0.0);
    assert_eq!(s.player.pos, Vec2::new(EDGE_MARGIN, EDGE_MARGIN));

    move_player(&mut s, Vec2::new(1.0, 1.0), 10.0, 0.0);
    assert_eq!(
        s.player.pos,
        Vec2::new(s.arena.width - EDGE_MARGIN, s.arena.height - EDGE_MARGIN)
    );
}

#[test]
fn no_direction_no_movement() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    let start = s.player.pos;
    move_player(&mut s, Vec2::ZERO, 1.0, 0.0);
    assert_eq!(s.player.pos, start);
}

#[test]
fn held_trigger_fires_toward_the_aim() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    let input = InputState {
        aim: s.player.pos + Vec2::new(100.0, 0.0),
        firing: true,
        ..InputState::default()
    };

    handle_input(&mut s, &input, 0.016, 0.0, &mut rng);
    assert_eq!(s.bullets.len(), 1);
    assert!(s.bullets[0].vel.x > 0.0);
    assert!(s.bullets[0].vel.y.abs() < 1e-9);
}

// ── Weapons ───────────────────────────────────────────────────────────────────

#[test]
fn number_slots_select_weapons() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);

    assert!(switch_weapon(&mut s, 4));
    assert_eq!(s.player.weapon, WeaponKind::RocketLauncher);
    assert!(!switch_weapon(&mut s, 0));
    assert!(!switch_weapon(&mut s, 9));
    assert_eq!(s.player.weapon, WeaponKind::RocketLauncher);
}

#[test]
fn cycling_wraps_both_ways() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);

    cycle_weapon(&mut s, -1);
    assert_eq!(s.player.weapon, WeaponKind::Knife);
    cycle_weapon(&mut s, 1);
    assert_eq!(s.player.weapon, WeaponKind::Revolver);
    cycle_weapon(&mut s, 1);
    assert_eq!(s.player.weapon, WeaponKind::Shotgun);
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[test]
fn health_and_armor_respect_their_caps() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    s.player.health = 90.0;
    s.player.armor = 70.0;

    apply_pickup(&mut s, PickupKind::Health, 0.0);
    apply_pickup(&mut s, PickupKind::Armor, 0.0);
    assert_eq!(s.player.health, 100.0);
    assert_eq!(s.player.armor, 75.0);
}

#[test]
fn heal_never_lowers_a_high_easy_pool() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Easy, &mut rng);
    assert_eq!(s.player.health, 120.0);

    apply_pickup(&mut s, PickupKind::Health, 0.0);
    assert_eq!(s.player.health, 120.0);
}

#[test]
fn ammo_refills_up_to_the_cap() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    s.player.ammo.set(AmmoKind::Shells, Ammo::Rounds(35));

    apply_pickup(&mut s, PickupKind::Shells, 0.0);
    assert_eq!(s.player.ammo.get(AmmoKind::Shells), Ammo::Rounds(40));

    apply_pickup(&mut s, PickupKind::Rockets, 0.0);
    assert_eq!(s.player.ammo.get(AmmoKind::Rockets), Ammo::Rounds(9));
}

#[test]
fn buffs_restart_instead_of_stacking() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);

    apply_pickup(&mut s, PickupKind::SeriousDamage, 1000.0);
    assert_eq!(s.buffs.serious_damage_until, 12_000.0);
    apply_pickup(&mut s, PickupKind::SeriousDamage, 5000.0);
    assert_eq!(s.buffs.serious_damage_until, 16_000.0);

    apply_pickup(&mut s, PickupKind::Haste, 2000.0);
    assert_eq!(s.buffs.haste_until, 11_000.0);
    assert_eq!(speed_multiplier(&s.buffs, 10_999.0), HASTE_MULTIPLIER);
    assert_eq!(speed_multiplier(&s.buffs, 11_000.0), 1.0);
}

#[test]
fn walking_over_pickups_collects_them() {
    let mut rng = seeded_rng();
    let mut s = make_state(Difficulty::Normal, &mut rng);
    drop_pickup_on_player(&mut s, PickupKind::Cells);
    drop_pickup_on_player(&mut s, PickupKind::Haste);
    s.pickups.push(Pickup {
        kind: PickupKind::Health,
        pos: Vec2::new(40.0, 40.0),
        radius: 14.0,
    });

    update_pickups(&mut s, 0.0);

    assert_eq!(s.pickups.len(), 1);
    assert_eq!(s.pickups[0].kind, PickupKind::Health);
    assert_eq!(s.player.ammo.get(AmmoKind::Cells), Ammo::Rounds(104));
    assert_eq!(s.buffs.haste_until, HASTE_DURATION_MS);
    assert!(s.events.contains(&GameEvent::Sound(SoundCue::Pickup)));
    assert!(s.events.contains(&GameEvent::Sound(SoundCue::Buff)));
    assert!(s.events.contains(&GameEvent::PickupCollected {
        kind: PickupKind::Cells
    }));
}
