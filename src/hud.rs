//! Text the heads-up display shows, derived from a `GameState` snapshot.
//! Formatting only; nothing here mutates the world.

use std::collections::VecDeque;
use std::fmt;

use crate::catalog::{HASTE_DURATION_MS, SERIOUS_DAMAGE_DURATION_MS, WAVES};
use crate::entities::{Ammo, GameState};

pub const BOSS_LABEL: &str = "Ugh-Zan III";

#[derive(Clone, Debug, PartialEq)]
pub struct BossBar {
    pub label: &'static str,
    /// Remaining health in `0.0..=1.0`.
    pub fraction: f64,
}

/// Fill level and countdown of one timed buff.
#[derive(Clone, Debug, PartialEq)]
pub struct BuffMeter {
    pub label: &'static str,
    pub active: bool,
    /// `0.0..=1.0` of the full duration left.
    pub fill: f64,
    /// Whole seconds left, rounded up.
    pub seconds: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudText {
    pub health: String,
    pub armor: String,
    pub weapon: String,
    pub ammo: String,
    pub wave: String,
    pub waves_remaining: String,
    pub score: String,
    pub status: String,
    pub buffs: [BuffMeter; 2],
    pub boss: Option<BossBar>,
}

impl HudText {
    pub fn from_state(state: &GameState) -> HudText {
        let now = state.clock_ms;
        let player = &state.player;
        let waves_left = WAVES.len().saturating_sub(state.wave_index + 1);

        let buffs = [
            buff_meter(
                "Serious Damage",
                state.buffs.serious_damage_until,
                SERIOUS_DAMAGE_DURATION_MS,
                now,
            ),
            buff_meter("Speed Boost", state.buffs.haste_until, HASTE_DURATION_MS, now),
        ];

        HudText {
            health: format!("{:.0}", player.health),
            armor: format!("{:.0}", player.armor),
            weapon: player.weapon.name().to_string(),
            ammo: match player.current_ammo() {
                Ammo::Unlimited => "∞".to_string(),
                Ammo::Rounds(n) => n.to_string(),
            },
            wave: format!("{} / {}", state.wave_index + 1, WAVES.len()),
            waves_remaining: waves_left.to_string(),
            score: format!("{:.0}", state.score),
            status: status_line(state, &buffs),
            boss: state.boss().map(|boss| BossBar {
                label: BOSS_LABEL,
                fraction: boss.health_ratio(),
            }),
            buffs,
        }
    }
}

fn buff_meter(label: &'static str, until: f64, duration: f64, now: f64) -> BuffMeter {
    let remaining = (until - now).max(0.0);
    BuffMeter {
        label,
        active: remaining > 0.0,
        fill: (remaining / duration).min(1.0),
        seconds: (remaining / 1000.0).ceil() as u64,
    }
}

/// Intermission countdown and active buffs, joined by bullets, or "None".
fn status_line(state: &GameState, buffs: &[BuffMeter]) -> String {
    let now = state.clock_ms;
    let mut labels = Vec::new();

    if let Some(until) = state.wave_delay_until.filter(|&until| until > now) {
        labels.push(format!("Next wave in {:.1}s", (until - now) / 1000.0));
    }
    labels.extend(
        buffs
            .iter()
            .filter(|b| b.active)
            .map(|b| b.label.to_string()),
    );

    if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join(" • ")
    }
}

/// Arm length in cells for a crosshair of `size` pixels: 0 at the smallest
/// setting, 3 at the largest.
pub fn crosshair_arm_cells(size: u32) -> u16 {
    (size / 12).saturating_sub(1).min(3) as u16
}

/// Rolling frame-time average for the optional stats readout.
#[derive(Debug, Default)]
pub struct FrameStats {
    samples: VecDeque<f64>,
}

impl FrameStats {
    pub const WINDOW: usize = 120;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame_ms: f64) {
        self.samples.push_back(frame_ms);
        if self.samples.len() > Self::WINDOW {
            self.samples.pop_front();
        }
    }

    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn fps(&self) -> f64 {
        let avg = self.average_ms();
        if avg > 0.0 {
            1000.0 / avg
        } else {
            0.0
        }
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} FPS ({:.1} ms)", self.fps(), self.average_ms())
    }
}
