//! Discrete happenings the simulation reports to its collaborators.
//!
//! The simulation never calls audio or UI code directly: it appends
//! `GameEvent`s to `GameState::events` and the driver drains them after each
//! frame.

use crate::catalog::{EnemyKind, PickupKind};
use crate::entities::RunOutcome;

/// Named sound effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Revolver,
    Shotgun,
    TommyGun,
    Rocket,
    Laser,
    Cannon,
    Knife,
    Explosion,
    Pickup,
    Buff,
    Hurt,
    EnemyFire,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Revolver => "revolver",
            SoundCue::Shotgun => "shotgun",
            SoundCue::TommyGun => "tommy",
            SoundCue::Rocket => "rocket",
            SoundCue::Laser => "laser",
            SoundCue::Cannon => "cannon",
            SoundCue::Knife => "knife",
            SoundCue::Explosion => "explosion",
            SoundCue::Pickup => "pickup",
            SoundCue::Buff => "buff",
            SoundCue::Hurt => "hurt",
            SoundCue::EnemyFire => "enemyFire",
        }
    }
}

/// Background music mood, derived from wave progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MusicIntensity {
    Calm,
    Build,
    Combat,
    Boss,
}

impl MusicIntensity {
    /// Tempo of the backing beat.
    pub fn bpm(self) -> u32 {
        match self {
            MusicIntensity::Calm => 96,
            MusicIntensity::Build => 110,
            MusicIntensity::Combat => 124,
            MusicIntensity::Boss => 134,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Sound(SoundCue),
    Music(MusicIntensity),
    MusicStopped,
    WaveStarted { index: usize },
    IntermissionStarted { until_ms: f64 },
    EnemyKilled { kind: EnemyKind, score: f64 },
    PlayerDamaged { amount: f64 },
    PickupCollected { kind: PickupKind },
    RunEnded { outcome: RunOutcome },
}
