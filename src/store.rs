//! Persistence: a minimal key/value store plus the two documents kept in
//! it, the user's settings and the per-difficulty best runs.
//!
//! Loading never fails. A missing, unreadable or malformed document is
//! logged and replaced by defaults, and every field is normalized on the
//! way in so out-of-range values cannot reach the game.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::Difficulty;
use crate::entities::RunSummary;

pub const SETTINGS_KEY: &str = "settings";
pub const BEST_RUNS_KEY: &str = "best_runs";

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage i/o error: {err}"),
            Self::Json(err) => write!(f, "malformed document: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

// ── Backends ─────────────────────────────────────────────────────────────────

pub trait KeyValueStore {
    /// `Ok(None)` when nothing was ever stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes a sibling temp file and renames it over the target, so a
    /// crash mid-write leaves the previous document intact.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

/// In-memory store for tests and for running without a data directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and parse a stored JSON document. `Ok(None)` if absent.
fn read_json(store: &impl KeyValueStore, key: &str) -> Result<Option<Value>, StoreError> {
    match store.get(key)? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

pub const VOLUME_RANGE: (f64, f64) = (0.0, 1.0);
pub const SENSITIVITY_RANGE: (f64, f64) = (0.4, 2.0);
pub const CROSSHAIR_SIZE_RANGE: (u32, u32) = (14, 48);
pub const DEFAULT_CROSSHAIR_COLOR: &str = "#ffffff";
/// Colours offered by the menu; any other `#rrggbb` loaded from disk is kept.
pub const CROSSHAIR_PRESETS: [&str; 5] = ["#ffffff", "#22d3ee", "#facc15", "#f472b6", "#4ade80"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub volume: f64,
    pub audio_enabled: bool,
    pub music_enabled: bool,
    pub effects_enabled: bool,
    pub stats_enabled: bool,
    pub sensitivity: f64,
    pub difficulty: Difficulty,
    pub crosshair_size: u32,
    pub crosshair_color: String,
    pub music_volume: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            volume: 1.0,
            audio_enabled: true,
            music_enabled: true,
            effects_enabled: true,
            stats_enabled: false,
            sensitivity: 1.0,
            difficulty: Difficulty::Normal,
            crosshair_size: 24,
            crosshair_color: DEFAULT_CROSSHAIR_COLOR.to_string(),
            music_volume: 1.0,
        }
    }
}

impl Settings {
    /// Build settings from an arbitrary JSON value, field by field. Missing
    /// or mistyped fields take their default; numbers are clamped.
    pub fn from_json(raw: &Value) -> Settings {
        let d = Settings::default();
        let num = |key: &str| raw.get(key).and_then(Value::as_f64);
        let flag = |key: &str, fallback: bool| {
            raw.get(key).and_then(Value::as_bool).unwrap_or(fallback)
        };

        Settings {
            volume: clamp_volume(num("volume").unwrap_or(d.volume)),
            audio_enabled: flag("audioEnabled", d.audio_enabled),
            music_enabled: flag("musicEnabled", d.music_enabled),
            effects_enabled: flag("effectsEnabled", d.effects_enabled),
            stats_enabled: flag("statsEnabled", d.stats_enabled),
            sensitivity: clamp_sensitivity(num("sensitivity").unwrap_or(d.sensitivity)),
            difficulty: raw
                .get("difficulty")
                .and_then(Value::as_str)
                .and_then(Difficulty::from_key)
                .unwrap_or(d.difficulty),
            crosshair_size: clamp_crosshair_size(
                num("crosshairSize").unwrap_or(f64::from(d.crosshair_size)),
            ),
            crosshair_color: normalize_color(
                raw.get("crosshairColor").and_then(Value::as_str),
                DEFAULT_CROSSHAIR_COLOR,
            ),
            music_volume: clamp_volume(num("musicVolume").unwrap_or(d.music_volume)),
        }
    }

    pub fn load(store: &impl KeyValueStore) -> Settings {
        match read_json(store, SETTINGS_KEY) {
            Ok(Some(raw)) => Settings::from_json(&raw),
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!(error = %err, "could not load settings, using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(SETTINGS_KEY, &serde_json::to_string(self)?)
    }
}

pub fn clamp_volume(v: f64) -> f64 {
    clamp_finite(v, VOLUME_RANGE, 1.0)
}

pub fn clamp_sensitivity(v: f64) -> f64 {
    clamp_finite(v, SENSITIVITY_RANGE, 1.0)
}

pub fn clamp_crosshair_size(v: f64) -> u32 {
    let (lo, hi) = CROSSHAIR_SIZE_RANGE;
    clamp_finite(v.round(), (f64::from(lo), f64::from(hi)), 24.0) as u32
}

/// The preset after `current`, wrapping; the first preset for custom colours.
pub fn next_crosshair_preset(current: &str) -> &'static str {
    CROSSHAIR_PRESETS
        .iter()
        .position(|&c| c == current)
        .map(|i| CROSSHAIR_PRESETS[(i + 1) % CROSSHAIR_PRESETS.len()])
        .unwrap_or(CROSSHAIR_PRESETS[0])
}

fn clamp_finite(v: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    if v.is_nan() {
        return fallback;
    }
    v.clamp(lo, hi)
}

/// `#rrggbb` in lowercase, or `fallback` for anything else.
pub fn normalize_color(value: Option<&str>, fallback: &str) -> String {
    let Some(hex) = value.map(str::trim).and_then(|v| v.strip_prefix('#')) else {
        return fallback.to_string();
    };
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{}", hex.to_ascii_lowercase())
    } else {
        fallback.to_string()
    }
}

// ── Best runs ────────────────────────────────────────────────────────────────

/// Personal bests for one difficulty. `time` is the fastest victory in
/// seconds, 0 when there has been none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestRun {
    pub score: u64,
    pub kills: u32,
    pub waves: u32,
    pub time: u64,
}

impl BestRun {
    pub fn has_data(&self) -> bool {
        self.score > 0 || self.kills > 0 || self.waves > 0 || self.time > 0
    }

    /// Fold a finished run in. Each field only ever improves; the time only
    /// counts for a victory. Returns whether anything changed.
    pub fn record(&mut self, run: &RunSummary) -> bool {
        let mut changed = false;
        if run.score > self.score {
            self.score = run.score;
            changed = true;
        }
        if run.kills > self.kills {
            self.kills = run.kills;
            changed = true;
        }
        if run.waves_cleared > self.waves {
            self.waves = run.waves_cleared;
            changed = true;
        }
        if run.victory && run.time_secs > 0 && (self.time == 0 || run.time_secs < self.time) {
            self.time = run.time_secs;
            changed = true;
        }
        changed
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRuns(BTreeMap<Difficulty, BestRun>);

impl Default for BestRuns {
    fn default() -> Self {
        BestRuns(Difficulty::ALL.into_iter().map(|d| (d, BestRun::default())).collect())
    }
}

impl BestRuns {
    /// Entries for known difficulties are read one by one; unknown keys and
    /// malformed entries are dropped.
    pub fn from_json(raw: &Value) -> BestRuns {
        let mut runs = BestRuns::default();
        let Some(map) = raw.as_object() else {
            return runs;
        };
        for (key, entry) in map {
            let Some(difficulty) = Difficulty::from_key(key) else {
                continue;
            };
            match BestRun::deserialize(entry) {
                Ok(best) => {
                    runs.0.insert(difficulty, best);
                }
                Err(err) => {
                    warn!(difficulty = key.as_str(), error = %err, "dropping bad best-run entry");
                }
            }
        }
        runs
    }

    pub fn load(store: &impl KeyValueStore) -> BestRuns {
        match read_json(store, BEST_RUNS_KEY) {
            Ok(Some(raw)) => BestRuns::from_json(&raw),
            Ok(None) => BestRuns::default(),
            Err(err) => {
                warn!(error = %err, "could not load best runs, resetting");
                BestRuns::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(BEST_RUNS_KEY, &serde_json::to_string(self)?)
    }

    pub fn get(&self, difficulty: Difficulty) -> BestRun {
        self.0.get(&difficulty).copied().unwrap_or_default()
    }

    pub fn record(&mut self, run: &RunSummary) -> bool {
        self.0.entry(run.difficulty).or_default().record(run)
    }

    pub fn reset(&mut self) {
        *self = BestRuns::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, BestRun)> + '_ {
        self.0.iter().map(|(&d, &b)| (d, b))
    }
}

/// `m:ss`-style duration used by the best-runs table, e.g. `3m 07s`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}m {:02}s", seconds / 60, seconds % 60)
}
