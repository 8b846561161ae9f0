//! Static balance tables: difficulty profiles, weapons, enemy archetypes,
//! pickups and the wave script.
//!
//! Every category is a closed enum mapped to an immutable descriptor, so
//! lookups are exhaustive and there is no stringly-typed dispatch. Names
//! only appear at the edges (persisted documents, HUD text) through
//! `key()` / `label()` and `from_key()`.

use serde::{Deserialize, Serialize};

use crate::events::{MusicIntensity, SoundCue};

// ── Difficulty ───────────────────────────────────────────────────────────────

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Multipliers applied to enemies at spawn time plus the player's starting
/// stats for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    pub label: &'static str,
    pub enemy_health: f64,
    pub enemy_damage: f64,
    pub enemy_count: f64,
    pub enemy_speed: f64,
    pub player_health: f64,
    pub player_armor: f64,
    pub score_multiplier: f64,
}

const EASY: DifficultyProfile = DifficultyProfile {
    label: "Easy",
    enemy_health: 0.9,
    enemy_damage: 0.85,
    enemy_count: 0.85,
    enemy_speed: 0.95,
    player_health: 120.0,
    player_armor: 25.0,
    score_multiplier: 0.75,
};

const NORMAL: DifficultyProfile = DifficultyProfile {
    label: "Normal",
    enemy_health: 1.0,
    enemy_damage: 1.0,
    enemy_count: 1.0,
    enemy_speed: 1.0,
    player_health: 100.0,
    player_armor: 10.0,
    score_multiplier: 1.0,
};

const HARD: DifficultyProfile = DifficultyProfile {
    label: "Hard",
    enemy_health: 1.2,
    enemy_damage: 1.25,
    enemy_count: 1.15,
    enemy_speed: 1.08,
    player_health: 90.0,
    player_armor: 0.0,
    score_multiplier: 1.25,
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
        }
    }

    /// Key used in persisted documents.
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_key(key: &str) -> Option<Difficulty> {
        Difficulty::ALL.into_iter().find(|d| d.key() == key)
    }
}

// ── Ammunition ───────────────────────────────────────────────────────────────

/// Ammo pool a weapon draws from. Several weapons may share one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AmmoKind {
    Knife,
    Revolver,
    Shells,
    Bullets,
    Rockets,
    Cells,
    Cannonballs,
}

impl AmmoKind {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        self as usize
    }
}

// ── Weapons ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Revolver,
    Shotgun,
    TommyGun,
    RocketLauncher,
    LaserGun,
    Cannon,
    DoubleBarrel,
    Knife,
}

/// Splash parameters for explosive rounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blast {
    pub radius: f64,
    /// Fraction of the round's base damage dealt to the shooter when caught
    /// in the blast.
    pub self_damage: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponSpec {
    pub name: &'static str,
    /// Shots per second.
    pub fire_rate: f64,
    pub speed: f64,
    pub damage: f64,
    pub pellets: u32,
    /// Total cone width in radians.
    pub spread: f64,
    pub ammo: AmmoKind,
    pub bullet_radius: f64,
    pub blast: Option<Blast>,
    /// Reach of a melee swing; `None` for projectile weapons.
    pub melee_range: Option<f64>,
    pub color: &'static str,
    pub cue: SoundCue,
}

impl WeaponSpec {
    /// Minimum milliseconds between two shots.
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.fire_rate
    }
}

const DEFAULT_BULLET_RADIUS: f64 = 4.0;

const REVOLVER: WeaponSpec = WeaponSpec {
    name: "Revolver",
    fire_rate: 4.0,
    speed: 620.0,
    damage: 28.0,
    pellets: 1,
    spread: 0.0,
    ammo: AmmoKind::Revolver,
    bullet_radius: DEFAULT_BULLET_RADIUS,
    blast: None,
    melee_range: None,
    color: "#ffd166",
    cue: SoundCue::Revolver,
};

const SHOTGUN: WeaponSpec = WeaponSpec {
    name: "Shotgun",
    fire_rate: 1.35,
    speed: 540.0,
    damage: 12.0,
    pellets: 7,
    spread: 0.24,
    ammo: AmmoKind::Shells,
    bullet_radius: DEFAULT_BULLET_RADIUS,
    blast: None,
    melee_range: None,
    color: "#ff9b5f",
    cue: SoundCue::Shotgun,
};

const TOMMY_GUN: WeaponSpec = WeaponSpec {
    name: "Tommy Gun",
    fire_rate: 9.0,
    speed: 700.0,
    damage: 10.0,
    pellets: 1,
    spread: 0.05,
    ammo: AmmoKind::Bullets,
    bullet_radius: DEFAULT_BULLET_RADIUS,
    blast: None,
    melee_range: None,
    color: "#76b3fa",
    cue: SoundCue::TommyGun,
};

const ROCKET_LAUNCHER: WeaponSpec = WeaponSpec {
    name: "Rocket Launcher",
    fire_rate: 0.9,
    speed: 440.0,
    damage: 140.0,
    pellets: 1,
    spread: 0.0,
    ammo: AmmoKind::Rockets,
    bullet_radius: 6.0,
    blast: Some(Blast {
        radius: 72.0,
        self_damage: 0.5,
    }),
    melee_range: None,
    color: "#f87171",
    cue: SoundCue::Rocket,
};

const LASER_GUN: WeaponSpec = WeaponSpec {
    name: "Laser Gun",
    fire_rate: 7.0,
    speed: 880.0,
    damage: 16.0,
    pellets: 2,
    spread: 0.06,
    ammo: AmmoKind::Cells,
    bullet_radius: DEFAULT_BULLET_RADIUS,
    blast: None,
    melee_range: None,
    color: "#7ce7ff",
    cue: SoundCue::Laser,
};

const CANNON: WeaponSpec = WeaponSpec {
    name: "Cannon",
    fire_rate: 0.45,
    speed: 360.0,
    damage: 220.0,
    pellets: 1,
    spread: 0.02,
    ammo: AmmoKind::Cannonballs,
    bullet_radius: 8.0,
    blast: Some(Blast {
        radius: 110.0,
        self_damage: 0.35,
    }),
    melee_range: None,
    color: "#ffe08a",
    cue: SoundCue::Cannon,
};

const DOUBLE_BARREL: WeaponSpec = WeaponSpec {
    name: "Double-Barrel",
    fire_rate: 0.9,
    speed: 520.0,
    damage: 24.0,
    pellets: 10,
    spread: 0.3,
    ammo: AmmoKind::Shells,
    bullet_radius: DEFAULT_BULLET_RADIUS,
    blast: None,
    melee_range: None,
    color: "#fbbf24",
    cue: SoundCue::Shotgun,
};

const KNIFE: WeaponSpec = WeaponSpec {
    name: "Knife",
    fire_rate: 2.4,
    speed: 0.0,
    damage: 50.0,
    pellets: 0,
    spread: 0.0,
    ammo: AmmoKind::Knife,
    bullet_radius: 0.0,
    blast: None,
    melee_range: Some(70.0),
    color: "#fcd34d",
    cue: SoundCue::Knife,
};

impl WeaponKind {
    /// Slot order: number keys 1..=8 select these in sequence.
    pub const SLOTS: [WeaponKind; 8] = [
        WeaponKind::Revolver,
        WeaponKind::Shotgun,
        WeaponKind::TommyGun,
        WeaponKind::RocketLauncher,
        WeaponKind::LaserGun,
        WeaponKind::Cannon,
        WeaponKind::DoubleBarrel,
        WeaponKind::Knife,
    ];

    pub fn spec(self) -> &'static WeaponSpec {
        match self {
            WeaponKind::Revolver => &REVOLVER,
            WeaponKind::Shotgun => &SHOTGUN,
            WeaponKind::TommyGun => &TOMMY_GUN,
            WeaponKind::RocketLauncher => &ROCKET_LAUNCHER,
            WeaponKind::LaserGun => &LASER_GUN,
            WeaponKind::Cannon => &CANNON,
            WeaponKind::DoubleBarrel => &DOUBLE_BARREL,
            WeaponKind::Knife => &KNIFE,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn slot(self) -> usize {
        WeaponKind::SLOTS
            .iter()
            .position(|&w| w == self)
            .unwrap_or(0)
    }

    pub fn from_name(name: &str) -> Option<WeaponKind> {
        WeaponKind::SLOTS.into_iter().find(|w| w.name() == name)
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Gnaar,
    Kamikaze,
    Kleer,
    BioMech,
    Werebull,
    Harpy,
    Reptiloid,
    UghZan,
}

/// Ranged attack parameters for archetypes that shoot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedAttack {
    pub fire_rate: f64,
    pub projectile_speed: f64,
}

impl RangedAttack {
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.fire_rate
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpec {
    pub name: &'static str,
    pub radius: f64,
    pub speed: f64,
    pub damage: f64,
    pub health: f64,
    pub color: &'static str,
    pub ranged: Option<RangedAttack>,
    /// Base score per kill, before the difficulty multiplier.
    pub score: f64,
}

const GNAAR: EnemySpec = EnemySpec {
    name: "Gnaar",
    radius: 13.0,
    speed: 120.0,
    damage: 20.0,
    health: 42.0,
    color: "#9ca3af",
    ranged: None,
    score: 18.0,
};

const KAMIKAZE: EnemySpec = EnemySpec {
    name: "Kamikaze",
    radius: 14.0,
    speed: 140.0,
    damage: 25.0,
    health: 35.0,
    color: "#f25f5c",
    ranged: None,
    score: 25.0,
};

const KLEER: EnemySpec = EnemySpec {
    name: "Kleer",
    radius: 16.0,
    speed: 120.0,
    damage: 32.0,
    health: 60.0,
    color: "#c9d1d9",
    ranged: None,
    score: 40.0,
};

const BIO_MECH: EnemySpec = EnemySpec {
    name: "BioMech",
    radius: 22.0,
    speed: 70.0,
    damage: 18.0,
    health: 120.0,
    color: "#9f7aea",
    ranged: Some(RangedAttack {
        fire_rate: 1.4,
        projectile_speed: 380.0,
    }),
    score: 55.0,
};

const WEREBULL: EnemySpec = EnemySpec {
    name: "Werebull",
    radius: 18.0,
    speed: 220.0,
    damage: 42.0,
    health: 140.0,
    color: "#f59e0b",
    ranged: None,
    score: 80.0,
};

const HARPY: EnemySpec = EnemySpec {
    name: "Harpy",
    radius: 14.0,
    speed: 170.0,
    damage: 18.0,
    health: 70.0,
    color: "#f9a8d4",
    ranged: Some(RangedAttack {
        fire_rate: 1.8,
        projectile_speed: 420.0,
    }),
    score: 45.0,
};

const REPTILOID: EnemySpec = EnemySpec {
    name: "Reptiloid",
    radius: 18.0,
    speed: 90.0,
    damage: 30.0,
    health: 130.0,
    color: "#22d3ee",
    ranged: Some(RangedAttack {
        fire_rate: 1.1,
        projectile_speed: 360.0,
    }),
    score: 70.0,
};

const UGH_ZAN: EnemySpec = EnemySpec {
    name: "UghZan",
    radius: 32.0,
    speed: 55.0,
    damage: 55.0,
    health: 1200.0,
    color: "#f97316",
    ranged: Some(RangedAttack {
        fire_rate: 1.1,
        projectile_speed: 320.0,
    }),
    score: 500.0,
};

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Gnaar,
        EnemyKind::Kamikaze,
        EnemyKind::Kleer,
        EnemyKind::BioMech,
        EnemyKind::Werebull,
        EnemyKind::Harpy,
        EnemyKind::Reptiloid,
        EnemyKind::UghZan,
    ];

    pub fn spec(self) -> &'static EnemySpec {
        match self {
            EnemyKind::Gnaar => &GNAAR,
            EnemyKind::Kamikaze => &KAMIKAZE,
            EnemyKind::Kleer => &KLEER,
            EnemyKind::BioMech => &BIO_MECH,
            EnemyKind::Werebull => &WEREBULL,
            EnemyKind::Harpy => &HARPY,
            EnemyKind::Reptiloid => &REPTILOID,
            EnemyKind::UghZan => &UGH_ZAN,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn is_boss(self) -> bool {
        self == EnemyKind::UghZan
    }

    pub fn from_name(name: &str) -> Option<EnemyKind> {
        EnemyKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

// ── Pickups ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupKind {
    Health,
    Armor,
    Shells,
    Smg,
    Rockets,
    Cells,
    Cannonballs,
    SeriousDamage,
    Haste,
}

/// What collecting a pickup does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickupEffect {
    Heal { amount: f64, cap: f64 },
    Armor { amount: f64, cap: f64 },
    Ammo { kind: AmmoKind, amount: u32, cap: u32 },
    SeriousDamage { duration_ms: f64 },
    Haste { duration_ms: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub radius: f64,
    pub color: &'static str,
    pub effect: PickupEffect,
}

pub const SERIOUS_DAMAGE_DURATION_MS: f64 = 11_000.0;
pub const HASTE_DURATION_MS: f64 = 9_000.0;
pub const SERIOUS_DAMAGE_MULTIPLIER: f64 = 2.0;
pub const HASTE_MULTIPLIER: f64 = 1.25;

const PICKUP_HEALTH: PickupSpec = PickupSpec {
    key: "health",
    label: "+HP",
    radius: 14.0,
    color: "#4ade80",
    effect: PickupEffect::Heal {
        amount: 30.0,
        cap: 100.0,
    },
};

const PICKUP_ARMOR: PickupSpec = PickupSpec {
    key: "armor",
    label: "+AR",
    radius: 14.0,
    color: "#60a5fa",
    effect: PickupEffect::Armor {
        amount: 20.0,
        cap: 75.0,
    },
};

const PICKUP_SHELLS: PickupSpec = PickupSpec {
    key: "shells",
    label: "Shells",
    radius: 14.0,
    color: "#f4a261",
    effect: PickupEffect::Ammo {
        kind: AmmoKind::Shells,
        amount: 8,
        cap: 40,
    },
};

const PICKUP_SMG: PickupSpec = PickupSpec {
    key: "smg",
    label: "SMG",
    radius: 14.0,
    color: "#93c5fd",
    effect: PickupEffect::Ammo {
        kind: AmmoKind::Bullets,
        amount: 40,
        cap: 240,
    },
};

const PICKUP_ROCKETS: PickupSpec = PickupSpec {
    key: "rockets",
    label: "Rockets",
    radius: 14.0,
    color: "#fb7185",
    effect: PickupEffect::Ammo {
        kind: AmmoKind::Rockets,
        amount: 3,
        cap: 12,
    },
};

const PICKUP_CELLS: PickupSpec = PickupSpec {
    key: "cells",
    label: "Cells",
    radius: 14.0,
    color: "#7ce7ff",
    effect: PickupEffect::Ammo {
        kind: AmmoKind::Cells,
        amount: 24,
        cap: 160,
    },
};

const PICKUP_CANNONBALLS: PickupSpec = PickupSpec {
    key: "cannonballs",
    label: "Cannon",
    radius: 14.0,
    color: "#ffd166",
    effect: PickupEffect::Ammo {
        kind: AmmoKind::Cannonballs,
        amount: 2,
        cap: 8,
    },
};

const PICKUP_SERIOUS: PickupSpec = PickupSpec {
    key: "serious",
    label: "Serious",
    radius: 16.0,
    color: "#bf34ff",
    effect: PickupEffect::SeriousDamage {
        duration_ms: SERIOUS_DAMAGE_DURATION_MS,
    },
};

const PICKUP_HASTE: PickupSpec = PickupSpec {
    key: "haste",
    label: "Speed",
    radius: 16.0,
    color: "#2dd4bf",
    effect: PickupEffect::Haste {
        duration_ms: HASTE_DURATION_MS,
    },
};

impl PickupKind {
    pub const ALL: [PickupKind; 9] = [
        PickupKind::Health,
        PickupKind::Armor,
        PickupKind::Shells,
        PickupKind::Smg,
        PickupKind::Rockets,
        PickupKind::Cells,
        PickupKind::Cannonballs,
        PickupKind::SeriousDamage,
        PickupKind::Haste,
    ];

    pub fn spec(self) -> &'static PickupSpec {
        match self {
            PickupKind::Health => &PICKUP_HEALTH,
            PickupKind::Armor => &PICKUP_ARMOR,
            PickupKind::Shells => &PICKUP_SHELLS,
            PickupKind::Smg => &PICKUP_SMG,
            PickupKind::Rockets => &PICKUP_ROCKETS,
            PickupKind::Cells => &PICKUP_CELLS,
            PickupKind::Cannonballs => &PICKUP_CANNONBALLS,
            PickupKind::SeriousDamage => &PICKUP_SERIOUS,
            PickupKind::Haste => &PICKUP_HASTE,
        }
    }

    pub fn is_buff(self) -> bool {
        matches!(self, PickupKind::SeriousDamage | PickupKind::Haste)
    }

    pub fn from_key(key: &str) -> Option<PickupKind> {
        PickupKind::ALL.into_iter().find(|p| p.spec().key == key)
    }
}

// ── Waves ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveGroup {
    pub kind: EnemyKind,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wave {
    pub primary: WaveGroup,
    pub bonus: Option<WaveGroup>,
}

impl Wave {
    const fn single(kind: EnemyKind, count: u32) -> Wave {
        Wave {
            primary: WaveGroup { kind, count },
            bonus: None,
        }
    }

    const fn with_bonus(kind: EnemyKind, count: u32, bonus: EnemyKind, bonus_count: u32) -> Wave {
        Wave {
            primary: WaveGroup { kind, count },
            bonus: Some(WaveGroup {
                kind: bonus,
                count: bonus_count,
            }),
        }
    }

    /// Primary group first, then the bonus group if any.
    pub fn groups(&self) -> impl Iterator<Item = WaveGroup> {
        std::iter::once(self.primary).chain(self.bonus)
    }
}

pub const WAVES: [Wave; 10] = [
    Wave::single(EnemyKind::Gnaar, 8),
    Wave::single(EnemyKind::Kamikaze, 6),
    Wave::single(EnemyKind::Kamikaze, 10),
    Wave::single(EnemyKind::Kleer, 6),
    Wave::with_bonus(EnemyKind::Kleer, 7, EnemyKind::Kamikaze, 8),
    Wave::with_bonus(EnemyKind::BioMech, 3, EnemyKind::Kamikaze, 8),
    Wave::with_bonus(EnemyKind::Werebull, 4, EnemyKind::Kamikaze, 6),
    Wave::with_bonus(EnemyKind::Harpy, 8, EnemyKind::Kleer, 6),
    Wave::with_bonus(EnemyKind::Reptiloid, 5, EnemyKind::BioMech, 2),
    Wave::single(EnemyKind::UghZan, 1),
];

/// Music intensity while the given wave is being fought.
pub fn music_for_wave(index: usize) -> MusicIntensity {
    let Some(wave) = WAVES.get(index) else {
        return MusicIntensity::Calm;
    };
    if wave.primary.kind.is_boss() {
        MusicIntensity::Boss
    } else if index >= 7 {
        MusicIntensity::Combat
    } else if index >= 4 {
        MusicIntensity::Build
    } else {
        MusicIntensity::Calm
    }
}
