use arena_shooter::catalog::*;
use arena_shooter::compute::combat::*;
use arena_shooter::compute::player::switch_weapon;
use arena_shooter::compute::waves::spawn_enemy;
use arena_shooter::compute::*;
use arena_shooter::entities::*;
use arena_shooter::events::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A running game with the starting wave and pickups removed.
fn empty_arena(difficulty: Difficulty, rng: &mut StdRng) -> GameState {
    let mut s = init_state(Arena::default(), difficulty);
    start_game(&mut s, difficulty, 0.0, rng);
    s.enemies.clear();
    s.pickups.clear();
    s.events.clear();
    s
}

fn place_enemy(s: &mut GameState, kind: EnemyKind, pos: Vec2, rng: &mut StdRng) {
    spawn_enemy(s, kind, rng);
    if let Some(enemy) = s.enemies.last_mut() {
        enemy.pos = pos;
    }
}

fn bullet_at(pos: Vec2, weapon: WeaponKind) -> Bullet {
    let spec = weapon.spec();
    Bullet {
        pos,
        vel: Vec2::new(spec.speed, 0.0),
        life: BULLET_LIFE,
        damage: spec.damage,
        radius: spec.bullet_radius,
        color: spec.color,
        explosion_radius: spec.blast.map(|b| b.radius),
        self_damage: spec.blast.map_or(0.0, |b| b.self_damage),
    }
}

fn count<F: Fn(&GameEvent) -> bool>(s: &GameState, pred: F) -> usize {
    s.events.iter().filter(|e| pred(*e)).count()
}

// ── Damage intake ─────────────────────────────────────────────────────────────

#[test]
fn armor_soaks_most_of_a_hit() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    s.player.health = 100.0;
    s.player.armor = 20.0;

    damage_player(&mut s, 25.0, 0.0);
    assert!((s.player.armor - 5.0).abs() < 1e-9);
    assert!((s.player.health - 90.0).abs() < 1e-9);

    damage_player(&mut s, 25.0, 0.0);
    assert_eq!(s.player.armor, 0.0);
    assert!((s.player.health - 70.0).abs() < 1e-9);
}

#[test]
fn damage_feedback_respects_the_effects_toggle() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);

    damage_player(&mut s, 5.0, 100.0);
    assert!((s.hurt_flash - 0.6).abs() < 1e-9);
    assert!((s.screen_shake - 0.35).abs() < 1e-9);
    assert_eq!(
        s.crosshair_flash,
        Some(CrosshairFlash {
            kind: FlashKind::Hurt,
            until_ms: 260.0,
        })
    );
    assert!(s.events.contains(&GameEvent::Sound(SoundCue::Hurt)));

    s.effects_enabled = false;
    s.screen_shake = 0.0;
    damage_player(&mut s, 5.0, 200.0);
    assert_eq!(s.hurt_flash, 0.0);
    assert_eq!(s.screen_shake, 0.0);
}

#[test]
fn lethal_damage_ends_the_run() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Hard, &mut rng);
    damage_player(&mut s, 90.0, 0.0);
    assert_eq!(s.status, RunStatus::Ended(RunOutcome::Defeat));
}

#[test]
fn damage_after_the_run_is_ignored() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    end_run(&mut s, RunOutcome::Victory);
    let health = s.player.health;
    let events = s.events.len();

    damage_player(&mut s, 50.0, 0.0);
    assert_eq!(s.player.health, health);
    assert_eq!(s.events.len(), events);
    assert_eq!(s.status, RunStatus::Ended(RunOutcome::Victory));
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn revolver_respects_its_fire_interval() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    let aim = Vec2::new(480.0, 0.0);

    assert!(try_shoot(&mut s, aim, 1000.0, &mut rng));
    assert!(!try_shoot(&mut s, aim, 1100.0, &mut rng));
    assert!(try_shoot(&mut s, aim, 1250.0, &mut rng));
    assert_eq!(s.bullets.len(), 2);
    assert_eq!(s.player.current_ammo(), Ammo::Unlimited);
    assert_eq!(count(&s, |e| *e == GameEvent::Sound(SoundCue::Revolver)), 2);
}

#[test]
fn shotgun_fires_a_spread_for_one_shell() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    assert!(switch_weapon(&mut s, 2));

    assert!(try_shoot(&mut s, Vec2::new(480.0, 0.0), 0.0, &mut rng));
    assert_eq!(s.bullets.len(), 7);
    assert_eq!(s.player.ammo.get(AmmoKind::Shells), Ammo::Rounds(19));

    let muzzle = s.player.radius + 6.0;
    for b in &s.bullets {
        assert!((b.pos.distance(s.player.pos) - muzzle).abs() < 1e-9);
        // Aim is straight up; every pellet stays inside the cone.
        let off = (b.vel.angle() + std::f64::consts::FRAC_PI_2).abs();
        assert!(off <= 0.12 + 1e-9);
    }
}

#[test]
fn empty_pool_refuses_to_fire() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    assert!(switch_weapon(&mut s, 4));
    s.player.ammo.set(AmmoKind::Rockets, Ammo::Rounds(0));

    assert!(!try_shoot(&mut s, Vec2::new(0.0, 0.0), 5000.0, &mut rng));
    assert!(s.bullets.is_empty());
    assert_eq!(s.last_shot_ms, None);
    assert!(s.events.is_empty());
}

#[test]
fn knife_hits_only_what_is_in_reach() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    assert!(switch_weapon(&mut s, 8));
    let at = s.player.pos;
    place_enemy(&mut s, EnemyKind::Gnaar, at + Vec2::new(100.0, 0.0), &mut rng);
    place_enemy(&mut s, EnemyKind::Gnaar, at + Vec2::new(60.0, 0.0), &mut rng);

    assert!(try_shoot(&mut s, at + Vec2::new(1.0, 0.0), 0.0, &mut rng));

    assert!(s.bullets.is_empty());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].health, 42.0);
    assert_eq!(s.kills, 1);
    assert_eq!(s.score, 18.0);
    assert_eq!(s.explosions.len(), 1);
    assert_eq!(s.crosshair_flash.map(|f| f.kind), Some(FlashKind::Hit));
    assert!(s.events.contains(&GameEvent::Sound(SoundCue::Knife)));
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[test]
fn serious_damage_doubles_bullet_damage() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    let target = Vec2::new(200.0, 200.0);
    place_enemy(&mut s, EnemyKind::Kleer, target, &mut rng);
    s.buffs.serious_damage_until = 5000.0;
    s.bullets.push(bullet_at(target, WeaponKind::Revolver));

    update_bullets(&mut s, 0.001, 1000.0);

    assert!(s.bullets.is_empty());
    assert!((s.enemies[0].health - 4.0).abs() < 1e-9);
    assert_eq!(s.crosshair_flash.map(|f| f.kind), Some(FlashKind::Hit));
}

#[test]
fn a_killing_shot_scores() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    let target = Vec2::new(200.0, 200.0);
    place_enemy(&mut s, EnemyKind::Kamikaze, target, &mut rng);
    s.enemies[0].health = 10.0;
    s.bullets.push(bullet_at(target, WeaponKind::Revolver));

    update_bullets(&mut s, 0.001, 0.0);

    assert!(s.enemies.is_empty());
    assert_eq!(s.kills, 1);
    assert_eq!(s.score, 25.0);
}

#[test]
fn stray_bullets_leave_the_arena() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    s.bullets.push(bullet_at(Vec2::new(s.arena.width + 19.0, 100.0), WeaponKind::Revolver));

    update_bullets(&mut s, 0.01, 0.0);
    assert!(s.bullets.is_empty());
    assert!(s.explosions.is_empty());
    assert_eq!(s.crosshair_flash, None);
}

#[test]
fn rocket_splash_catches_the_shooter() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    s.player.health = 100.0;
    s.player.armor = 0.0;
    let at = s.player.pos;

    let rocket = bullet_at(at, WeaponKind::RocketLauncher);
    let hit = detonate(&mut s, &rocket, at, 0.0);

    assert!(!hit);
    assert!((s.player.health - 30.0).abs() < 1e-9);
    assert_eq!(count(&s, |e| matches!(e, GameEvent::PlayerDamaged { .. })), 1);
    assert!(s.events.contains(&GameEvent::PlayerDamaged { amount: 70.0 }));
    assert!(s.events.contains(&GameEvent::Sound(SoundCue::Explosion)));
    assert_eq!(s.explosions.len(), 1);
    assert_eq!(s.explosions[0].radius, 72.0);
}

#[test]
fn expiring_rocket_detonates_where_it_stops() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    let spot = Vec2::new(150.0, 150.0);
    place_enemy(&mut s, EnemyKind::Gnaar, spot + Vec2::new(40.0, 0.0), &mut rng);
    place_enemy(&mut s, EnemyKind::Gnaar, spot + Vec2::new(0.0, 300.0), &mut rng);
    let mut rocket = bullet_at(spot, WeaponKind::RocketLauncher);
    rocket.vel = Vec2::ZERO;
    rocket.life = 0.01;
    s.bullets.push(rocket);

    update_bullets(&mut s, 0.016, 0.0);

    assert!(s.bullets.is_empty());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.kills, 1);
    assert_eq!(s.crosshair_flash.map(|f| f.kind), Some(FlashKind::Hit));
}

#[test]
fn enemy_rounds_hit_and_explode_on_the_player() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    s.enemy_projectiles.push(EnemyProjectile {
        pos: s.player.pos,
        vel: Vec2::ZERO,
        radius: 7.0,
        damage: 30.0,
        explosion_radius: Some(46.0),
        color: "#22d3ee",
    });

    update_enemy_projectiles(&mut s, 0.016, 0.0);

    assert!(s.enemy_projectiles.is_empty());
    assert_eq!(s.explosions.len(), 1);
    assert_eq!(s.player.armor, 0.0);
    assert!((s.player.health - 80.0).abs() < 1e-9);
}

#[test]
fn enemy_rounds_expire_past_the_margin() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    s.enemy_projectiles.push(EnemyProjectile {
        pos: Vec2::new(-30.0, 100.0),
        vel: Vec2::ZERO,
        radius: 5.0,
        damage: 30.0,
        explosion_radius: None,
        color: "#ff95ff",
    });
    s.enemy_projectiles.push(EnemyProjectile {
        pos: Vec2::new(-20.0, 100.0),
        vel: Vec2::ZERO,
        radius: 5.0,
        damage: 30.0,
        explosion_radius: None,
        color: "#ff95ff",
    });

    update_enemy_projectiles(&mut s, 0.016, 0.0);
    assert_eq!(s.enemy_projectiles.len(), 1);
    assert_eq!(s.enemy_projectiles[0].pos.x, -20.0);
    assert_eq!(s.player.health, 100.0);
}

// ── Scoring ───────────────────────────────────────────────────────────────────

#[test]
fn kill_score_scales_with_difficulty() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Hard, &mut rng);
    register_kill(&mut s, EnemyKind::Werebull);

    assert_eq!(s.score, 100.0);
    assert_eq!(s.kills, 1);
    assert!(s.events.contains(&GameEvent::EnemyKilled {
        kind: EnemyKind::Werebull,
        score: 100.0,
    }));
}

#[test]
fn screen_shake_is_capped() {
    let mut rng = seeded_rng();
    let mut s = empty_arena(Difficulty::Normal, &mut rng);
    for _ in 0..10 {
        add_screen_shake(&mut s, 0.25);
    }
    assert_eq!(s.screen_shake, 1.0);
    assert_eq!(damage_multiplier(&s.buffs, 0.0), 1.0);
}
