/// Rendering layer: all terminal output lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// session. No game logic is performed; world coordinates are scaled onto
/// the terminal grid and drawn with crossterm commands.
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use arena_shooter::catalog::{Difficulty, EnemyKind, WAVES};
use arena_shooter::entities::{FlashKind, GameState, RunOutcome, RunStatus, Vec2};
use arena_shooter::hud::{crosshair_arm_cells, HudText};
use arena_shooter::session::Session;
use arena_shooter::store::{format_duration, KeyValueStore};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_LABEL: Color = Color::DarkGrey;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_ARMOR: Color = Color::Blue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_STATUS: Color = Color::Cyan;
const C_BOSS_BAR: Color = Color::DarkRed;
const C_PLAYER: Color = Color::White;
const C_HURT: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

const FLASH_HIT: &str = "#22c55e";
const FLASH_HURT: &str = "#ef4444";

/// Rows reserved above the arena (two HUD lines) and below it (hint).
const TOP_ROWS: u16 = 2;
const BOTTOM_ROWS: u16 = 1;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write, S: KeyValueStore>(
    out: &mut W,
    session: &Session<S>,
) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let state = session.state();
    let view = Viewport::fit(state, width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let hud = session.hud();
    draw_hud(out, session, &hud, width)?;
    draw_border(out, &view)?;

    for pickup in &state.pickups {
        let spec = pickup.kind.spec();
        let glyph = spec.label.chars().next().unwrap_or('?');
        let (col, row) = view.cell(pickup.pos);
        put(out, col, row, glyph, hex(spec.color))?;
    }
    for ring in state.explosions.iter().chain(&state.shockwaves) {
        draw_ring(out, &view, ring.pos, ring.radius * (ring.life / ring.max_life).max(0.2))?;
    }
    for enemy in &state.enemies {
        let (col, row) = view.cell(enemy.pos);
        put(out, col, row, enemy_glyph(enemy.kind), hex(enemy.color))?;
    }
    for bullet in &state.bullets {
        let (col, row) = view.cell(bullet.pos);
        put(out, col, row, '•', hex(bullet.color))?;
    }
    for projectile in &state.enemy_projectiles {
        let (col, row) = view.cell(projectile.pos);
        let glyph = if projectile.explosion_radius.is_some() { '●' } else { '∙' };
        put(out, col, row, glyph, hex(projectile.color))?;
    }

    draw_player(out, &view, state)?;
    if state.is_running() {
        draw_crosshair(out, &view, session)?;
    }
    draw_controls_hint(out, height)?;

    match state.status {
        RunStatus::Paused => {
            draw_banner(out, width, height, &["PAUSED", "Esc - Resume  Q - Quit"])?;
        }
        RunStatus::Ended(outcome) => draw_summary(out, session, outcome, width, height)?,
        RunStatus::Idle | RunStatus::Running => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── World → terminal mapping ──────────────────────────────────────────────────

/// Maps arena coordinates onto the terminal cells inside the border.
struct Viewport {
    left: u16,
    top: u16,
    cols: u16,
    rows: u16,
    scale_x: f64,
    scale_y: f64,
    shake: (i32, i32),
}

impl Viewport {
    fn fit(state: &GameState, width: u16, height: u16) -> Viewport {
        let cols = width.saturating_sub(2).max(1);
        let rows = height.saturating_sub(TOP_ROWS + BOTTOM_ROWS + 2).max(1);
        // Shake jitters the whole field by up to a cell, driven by the clock so
        // rendering stays free of randomness.
        let amp = if state.effects_enabled { state.screen_shake } else { 0.0 };
        let phase = state.clock_ms / 23.0;
        let shake = (
            (phase.sin() * amp * 1.5).round() as i32,
            (phase.cos() * amp).round() as i32,
        );
        Viewport {
            left: 1,
            top: TOP_ROWS + 1,
            cols,
            rows,
            scale_x: f64::from(cols) / state.arena.width,
            scale_y: f64::from(rows) / state.arena.height,
            shake,
        }
    }

    fn cell(&self, p: Vec2) -> (u16, u16) {
        let col = (p.x * self.scale_x).floor() as i32 + self.shake.0;
        let row = (p.y * self.scale_y).floor() as i32 + self.shake.1;
        let col = col.clamp(0, i32::from(self.cols) - 1) as u16;
        let row = row.clamp(0, i32::from(self.rows) - 1) as u16;
        (self.left + col, self.top + row)
    }
}

fn put<W: Write>(out: &mut W, col: u16, row: u16, glyph: char, color: Color) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

/// `#rrggbb` to a true-colour value; anything else falls back to white.
fn hex(color: &str) -> Color {
    let parsed = color
        .strip_prefix('#')
        .filter(|h| h.len() == 6)
        .and_then(|h| u32::from_str_radix(h, 16).ok());
    match parsed {
        Some(rgb) => Color::Rgb {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        },
        None => Color::White,
    }
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = usize::from(view.cols);
    let top = view.top - 1;
    let bottom = view.top + view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, top))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;
    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;

    for row in view.top..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols + 1, row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (rows 0 and 1) ────────────────────────────────────────────────────────

fn draw_hud<W: Write, S: KeyValueStore>(
    out: &mut W,
    session: &Session<S>,
    hud: &HudText,
    width: u16,
) -> std::io::Result<()> {
    let fields: [(&str, &str, Color); 6] = [
        ("HP ", hud.health.as_str(), C_HUD_HEALTH),
        ("AR ", hud.armor.as_str(), C_HUD_ARMOR),
        ("", hud.weapon.as_str(), C_PLAYER),
        ("Ammo ", hud.ammo.as_str(), C_PLAYER),
        ("Wave ", hud.wave.as_str(), C_HUD_STATUS),
        ("Score ", hud.score.as_str(), C_HUD_SCORE),
    ];

    out.queue(cursor::MoveTo(1, 0))?;
    for (label, value, color) in fields {
        out.queue(style::SetForegroundColor(C_HUD_LABEL))?;
        out.queue(Print(label))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(format!("{value}   ")))?;
    }

    // Difficulty tag, and the stats readout when enabled, on the right
    let difficulty = session.settings().difficulty;
    let mut right = format!("[ {} ]", difficulty.profile().label.to_uppercase());
    if let Some(stats) = session.frame_stats() {
        right = format!("{stats}  {right}");
    }
    let rx = width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(difficulty_color(difficulty)))?;
    out.queue(Print(&right))?;

    // Status line, buff timers and the boss bar
    out.queue(cursor::MoveTo(1, 1))?;
    out.queue(style::SetForegroundColor(C_HUD_LABEL))?;
    out.queue(Print("Status "))?;
    out.queue(style::SetForegroundColor(C_HUD_STATUS))?;
    out.queue(Print(&hud.status))?;
    for meter in hud.buffs.iter().filter(|m| m.active) {
        out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
        out.queue(Print(format!("  {} {}s", bar(meter.fill, 8), meter.seconds)))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LABEL))?;
    out.queue(Print(format!("  Waves left {}", hud.waves_remaining)))?;

    if let Some(boss) = &hud.boss {
        let text = format!("{} {}", boss.label, bar(boss.fraction, 20));
        let bx = width.saturating_sub(text.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(bx, 1))?;
        out.queue(style::SetForegroundColor(C_BOSS_BAR))?;
        out.queue(Print(text))?;
    }
    Ok(())
}

fn bar(fraction: f64, cells: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * cells as f64).round() as usize).min(cells);
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled))
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Normal => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn enemy_glyph(kind: EnemyKind) -> char {
    match kind {
        EnemyKind::Gnaar => 'g',
        EnemyKind::Kamikaze => 'k',
        EnemyKind::Kleer => 'K',
        EnemyKind::BioMech => 'B',
        EnemyKind::Werebull => 'W',
        EnemyKind::Harpy => 'h',
        EnemyKind::Reptiloid => 'R',
        EnemyKind::UghZan => '◉',
    }
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, state: &GameState) -> std::io::Result<()> {
    let (col, row) = view.cell(state.player.pos);
    let color = if state.hurt_flash > 0.3 { C_HURT } else { C_PLAYER };
    put(out, col, row, '@', color)
}

fn draw_crosshair<W: Write, S: KeyValueStore>(
    out: &mut W,
    view: &Viewport,
    session: &Session<S>,
) -> std::io::Result<()> {
    let state = session.state();
    let color = match state.crosshair_flash {
        Some(flash) if flash.kind == FlashKind::Hurt => FLASH_HURT,
        Some(_) => FLASH_HIT,
        None => session.settings().crosshair_color.as_str(),
    };
    let color = hex(color);
    let (col, row) = view.cell(session.input().aim);
    put(out, col, row, '+', color)?;

    // Arms stop at the arena edge.
    let arms = crosshair_arm_cells(session.settings().crosshair_size);
    let right = view.left + view.cols - 1;
    let bottom = view.top + view.rows - 1;
    for step in 1..=arms {
        if col >= view.left + step {
            put(out, col - step, row, '─', color)?;
        }
        if col + step <= right {
            put(out, col + step, row, '─', color)?;
        }
        if row >= view.top + step {
            put(out, col, row - step, '│', color)?;
        }
        if row + step <= bottom {
            put(out, col, row + step, '│', color)?;
        }
    }
    Ok(())
}

/// Eight points around a circle; enough to read as a ring on a terminal.
fn draw_ring<W: Write>(out: &mut W, view: &Viewport, center: Vec2, radius: f64) -> std::io::Result<()> {
    for step in 0..8 {
        let angle = f64::from(step) * std::f64::consts::FRAC_PI_4;
        let (col, row) = view.cell(center + Vec2::from_angle(angle) * radius);
        put(out, col, row, '·', Color::DarkYellow)?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "WASD : Move   Arrows/Mouse : Aim   SPACE/Click : Fire   1-8 Q E : Weapon   Esc : Pause",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(out: &mut W, width: u16, height: u16, lines: &[&str]) -> std::io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        let color = if i == 0 { Color::Yellow } else { Color::White };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(*line))?;
    }
    Ok(())
}

fn draw_summary<W: Write, S: KeyValueStore>(
    out: &mut W,
    session: &Session<S>,
    outcome: RunOutcome,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let Some(summary) = session.state().summary else {
        return Ok(());
    };

    let (title, blurb, title_color) = match outcome {
        RunOutcome::Victory => (
            "Victory!",
            "You felled Ugh-Zan III and survived the full gauntlet.",
            Color::Green,
        ),
        RunOutcome::Defeat => (
            "Garo has fallen",
            "Enemies overwhelmed Garo. Try again to push further.",
            Color::Red,
        ),
    };

    let mut lines: Vec<(String, Color)> = vec![
        (title.to_string(), title_color),
        (blurb.to_string(), Color::White),
        (String::new(), Color::White),
        (format!("Difficulty: {}", summary.difficulty.profile().label), Color::Yellow),
        (format!("Score: {}", summary.score), Color::Yellow),
        (format!("Kills: {}", summary.kills), Color::Yellow),
        (format!("Waves cleared: {} / {}", summary.waves_cleared, WAVES.len()), Color::Yellow),
        (format!("Time: {}", format_duration(summary.time_secs)), Color::Yellow),
        (String::new(), Color::White),
        ("Best runs".to_string(), Color::Cyan),
    ];

    for (difficulty, best) in session.best_runs().iter() {
        let row = if best.has_data() {
            format!(
                "{:<7} score {:>6}  waves {:>2}  kills {:>4}  fastest {}",
                difficulty.profile().label,
                best.score,
                best.waves,
                best.kills,
                if best.time > 0 {
                    format_duration(best.time)
                } else {
                    "-".to_string()
                },
            )
        } else {
            format!("{:<7} -", difficulty.profile().label)
        };
        lines.push((row, C_HINT));
    }
    lines.push((String::new(), Color::White));
    lines.push(("R - Play Again  M - Menu  Q - Quit".to_string(), Color::White));

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (text, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(text))?;
    }
    Ok(())
}

/// World point under a terminal cell, for mouse aiming. The inverse of the
/// mapping `render` uses, minus screen shake.
pub fn cell_to_world(state: &GameState, width: u16, height: u16, col: u16, row: u16) -> Vec2 {
    let mut view = Viewport::fit(state, width, height);
    view.shake = (0, 0);
    let x = (f64::from(col.saturating_sub(view.left)) + 0.5) / view.scale_x;
    let y = (f64::from(row.saturating_sub(view.top)) + 0.5) / view.scale_y;
    Vec2::new(x.min(state.arena.width), y.min(state.arena.height))
}
