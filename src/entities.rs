//! All world entity types. Pure data; behavior lives in `compute`.

use std::ops::{Add, AddAssign, Mul, Sub};

use crate::catalog::{AmmoKind, Difficulty, EnemyKind, PickupKind, WeaponKind};
use crate::config::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::events::GameEvent;

// ── Geometry ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    pub fn from_angle(angle: f64) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Counter-clockwise perpendicular.
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Whether two circles touch or overlap.
pub fn circles_touch(a: Vec2, ra: f64, b: Vec2, rb: f64) -> bool {
    a.distance(b) <= ra + rb
}

// ── Arena ────────────────────────────────────────────────────────────────────

/// The fixed playing field. World units; the origin is the top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    /// Level-defined spawn points. Empty means enemies enter from the edges.
    pub spawn_anchors: Vec<Vec2>,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Arena {
        Arena {
            width,
            height,
            spawn_anchors: Vec::new(),
        }
    }

    pub fn with_anchors(mut self, anchors: Vec<Vec2>) -> Arena {
        self.spawn_anchors = anchors;
        self
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True when `p` lies more than `margin` outside the field.
    pub fn is_outside(&self, p: Vec2, margin: f64) -> bool {
        p.x < -margin || p.x > self.width + margin || p.y < -margin || p.y > self.height + margin
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new(ARENA_WIDTH, ARENA_HEIGHT)
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ammo {
    Unlimited,
    Rounds(u32),
}

impl Ammo {
    pub fn is_empty(self) -> bool {
        self == Ammo::Rounds(0)
    }
}

/// One pool per `AmmoKind`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmmoPools([Ammo; AmmoKind::COUNT]);

impl AmmoPools {
    /// Pools at the start of a run.
    pub fn starting() -> AmmoPools {
        let mut pools = AmmoPools([Ammo::Rounds(0); AmmoKind::COUNT]);
        pools.set(AmmoKind::Knife, Ammo::Unlimited);
        pools.set(AmmoKind::Revolver, Ammo::Unlimited);
        pools.set(AmmoKind::Shells, Ammo::Rounds(20));
        pools.set(AmmoKind::Bullets, Ammo::Rounds(120));
        pools.set(AmmoKind::Rockets, Ammo::Rounds(6));
        pools.set(AmmoKind::Cells, Ammo::Rounds(80));
        pools.set(AmmoKind::Cannonballs, Ammo::Rounds(3));
        pools
    }

    pub fn get(&self, kind: AmmoKind) -> Ammo {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: AmmoKind, ammo: Ammo) {
        self.0[kind.index()] = ammo;
    }

    /// Spend one round. Returns false if the pool is finite and empty.
    pub fn consume(&mut self, kind: AmmoKind) -> bool {
        match self.get(kind) {
            Ammo::Unlimited => true,
            Ammo::Rounds(0) => false,
            Ammo::Rounds(n) => {
                self.set(kind, Ammo::Rounds(n - 1));
                true
            }
        }
    }

    /// Add rounds up to `cap`. Unlimited pools are unaffected.
    pub fn refill(&mut self, kind: AmmoKind, amount: u32, cap: u32) {
        if let Ammo::Rounds(n) = self.get(kind) {
            self.set(kind, Ammo::Rounds(n.saturating_add(amount).min(cap)));
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    /// Units per second before buffs.
    pub speed: f64,
    pub health: f64,
    pub armor: f64,
    pub weapon: WeaponKind,
    pub ammo: AmmoPools,
    pub radius: f64,
}

pub const PLAYER_RADIUS: f64 = 14.0;
pub const PLAYER_SPEED: f64 = 240.0;

impl Player {
    pub fn new(pos: Vec2, health: f64, armor: f64) -> Player {
        Player {
            pos,
            speed: PLAYER_SPEED,
            health,
            armor,
            weapon: WeaponKind::Revolver,
            ammo: AmmoPools::starting(),
            radius: PLAYER_RADIUS,
        }
    }

    /// Ammo left for the weapon in hand.
    pub fn current_ammo(&self) -> Ammo {
        self.ammo.get(self.weapon.spec().ammo)
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// A player-fired round.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds until the round expires.
    pub life: f64,
    pub damage: f64,
    pub radius: f64,
    pub color: &'static str,
    pub explosion_radius: Option<f64>,
    pub self_damage: f64,
}

/// A round fired by a ranged archetype.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub damage: f64,
    pub explosion_radius: Option<f64>,
    pub color: &'static str,
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Per-enemy behavior clocks, all in simulation milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTimers {
    /// `None` until the first shot, so ranged enemies open fire at once.
    pub last_shot_ms: Option<f64>,
    pub next_dive_ms: f64,
    pub next_stomp_ms: f64,
    /// +1 or -1: which way the enemy circles while strafing.
    pub strafe_dir: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f64,
    pub speed: f64,
    pub damage: f64,
    pub health: f64,
    pub max_health: f64,
    pub color: &'static str,
    pub timers: EnemyTimers,
}

impl Enemy {
    /// Remaining health in `0.0..=1.0`, for health rings and the boss bar.
    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

// ── Pickups & visuals ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f64,
}

/// A short-lived visual ring (explosions, melee bursts, boss stomps).
/// Carries no gameplay weight; it only decays.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f64,
    pub life: f64,
    pub max_life: f64,
}

impl Explosion {
    pub fn new(pos: Vec2, radius: f64, life: f64) -> Explosion {
        Explosion {
            pos,
            radius,
            life,
            max_life: life,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashKind {
    Hit,
    Hurt,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrosshairFlash {
    pub kind: FlashKind,
    pub until_ms: f64,
}

// ── Run state ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Paused,
    Ended(RunOutcome),
}

/// Buff expiry timestamps on the simulation clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Buffs {
    pub serious_damage_until: f64,
    pub haste_until: f64,
}

/// Frozen statistics of a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub difficulty: Difficulty,
    pub score: u64,
    pub kills: u32,
    pub waves_cleared: u32,
    /// Whole seconds of simulated play.
    pub time_secs: u64,
    pub victory: bool,
}

/// The whole world. Owned by the driver and passed explicitly to every
/// simulation call.
#[derive(Clone, Debug)]
pub struct GameState {
    pub arena: Arena,
    pub difficulty: Difficulty,
    pub status: RunStatus,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub enemy_projectiles: Vec<EnemyProjectile>,
    pub pickups: Vec<Pickup>,
    pub explosions: Vec<Explosion>,
    pub shockwaves: Vec<Explosion>,
    pub wave_index: usize,
    /// Set while an intermission is pending; doubles as the guard that keeps
    /// a cleared wave from scheduling twice.
    pub wave_delay_until: Option<f64>,
    pub score: f64,
    pub kills: u32,
    /// Simulation clock in milliseconds. Only advances while running.
    pub clock_ms: f64,
    /// Wall-clock timestamp of the previous frame, the baseline for dt.
    pub last_frame_ms: Option<f64>,
    pub last_shot_ms: Option<f64>,
    pub buffs: Buffs,
    pub effects_enabled: bool,
    pub screen_shake: f64,
    pub hurt_flash: f64,
    pub crosshair_flash: Option<CrosshairFlash>,
    pub summary: Option<RunSummary>,
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, RunStatus::Ended(_))
    }

    /// The boss, if one is alive.
    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.kind.is_boss())
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
