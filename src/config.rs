use std::{env, path::PathBuf, time::Duration};

// Runtime constants (not gameplay tuning).

/// Target frame pacing for the terminal loop, about 60 Hz.
pub const FRAME_BUDGET: Duration = Duration::from_millis(16);

pub const LOG_FILE_NAME: &str = "arena_shooter.log";

/// World size of the arena. The renderer scales it to the terminal.
pub const ARENA_WIDTH: f64 = 960.0;
pub const ARENA_HEIGHT: f64 = 600.0;

/// Where settings, best runs and the log live.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = env::var_os("ARENA_SHOOTER_DATA_DIR").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = env::var_os("HOME").unwrap_or_else(|| ".".into());
    PathBuf::from(home).join(".arena_shooter")
}

/// Pointer-style aim step per arrow key press, in world units, before the
/// sensitivity setting is applied.
pub fn aim_step() -> f64 {
    env::var("ARENA_SHOOTER_AIM_STEP")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v > 0.0)
        .unwrap_or(24.0)
}
