//! Terminal front end: menu, input thread, frame loop.
//!
//! Usage:
//!   arena_shooter [--difficulty easy|normal|hard] [--seed N] [--data-dir DIR]
//!   RUST_LOG=debug arena_shooter     (log goes to <data dir>/arena_shooter.log)

mod display;

use std::fs::{self, OpenOptions};
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::{info, warn};

use arena_shooter::audio::{AudioBackend, BellAudio};
use arena_shooter::catalog::Difficulty;
use arena_shooter::config;
use arena_shooter::entities::{Arena, RunStatus, Vec2};
use arena_shooter::input::KeyTracker;
use arena_shooter::session::Session;
use arena_shooter::store::{format_duration, FileStore};

#[derive(Parser)]
#[command(name = "arena_shooter")]
#[command(about = "Top-down wave shooter for the terminal")]
struct Args {
    /// Difficulty to preselect (saved as the new default)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
    /// Seed the RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Where settings, best runs and the log are kept
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Restore default settings before starting
    #[arg(long)]
    reset_settings: bool,
    /// Forget all best runs before starting
    #[arg(long)]
    reset_best_runs: bool,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_key(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown difficulty `{s}` (expected easy, normal or hard)"))
}

type GameSession = Session<FileStore>;

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is in raw mode for the whole run, so logs go to a file.
fn init_tracing(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(config::LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Difficulty),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut GameSession,
) -> std::io::Result<MenuResult> {
    loop {
        draw_menu(out, session)?;

        // Block until the user makes a choice
        let Ok(event) = rx.recv() else {
            return Ok(MenuResult::Quit);
        };
        let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) = event else {
            continue;
        };
        let settings = session.settings().clone();
        match code {
            KeyCode::Char('1') => return Ok(MenuResult::Start(Difficulty::Easy)),
            KeyCode::Char('2') => return Ok(MenuResult::Start(Difficulty::Normal)),
            KeyCode::Char('3') => return Ok(MenuResult::Start(Difficulty::Hard)),
            KeyCode::Enter => return Ok(MenuResult::Start(settings.difficulty)),
            KeyCode::Char('a') | KeyCode::Char('A') => {
                session.set_audio_enabled(!settings.audio_enabled);
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                session.set_music_enabled(!settings.music_enabled);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                session.set_effects_enabled(!settings.effects_enabled);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                session.set_stats_enabled(!settings.stats_enabled);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => session.set_volume(settings.volume + 0.1),
            KeyCode::Char('-') => session.set_volume(settings.volume - 0.1),
            KeyCode::Char(']') => session.set_music_volume(settings.music_volume + 0.1),
            KeyCode::Char('[') => session.set_music_volume(settings.music_volume - 0.1),
            KeyCode::Char('.') => session.set_sensitivity(settings.sensitivity + 0.1),
            KeyCode::Char(',') => session.set_sensitivity(settings.sensitivity - 0.1),
            KeyCode::Char(')') => {
                session.set_crosshair_size(f64::from(settings.crosshair_size) + 2.0);
            }
            KeyCode::Char('(') => {
                session.set_crosshair_size(f64::from(settings.crosshair_size) - 2.0);
            }
            KeyCode::Char('x') | KeyCode::Char('X') => session.cycle_crosshair_color(),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(MenuResult::Quit);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => {}
        }
    }
}

fn draw_menu<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;
    let left = cx.saturating_sub(24);

    let title = "★  GARO'S FIRST ENCOUNTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(9),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(left, cy.saturating_sub(7)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty (Enter keeps the saved one):"))?;

    let saved = session.settings().difficulty;
    let options: [(&str, Difficulty, Color, &str); 3] = [
        ("1", Difficulty::Easy, Color::Green, "More health and armor, gentler foes"),
        ("2", Difficulty::Normal, Color::Yellow, "The intended gauntlet"),
        ("3", Difficulty::Hard, Color::Red, "No armor, tougher and faster foes"),
    ];
    for (i, (key, difficulty, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(5) + i as u16;
        let marker = if *difficulty == saved { "›" } else { " " };
        let best = session.best_runs().get(*difficulty);
        let best = if best.has_data() {
            format!("best {} pts, {} waves", best.score, best.waves)
        } else {
            String::new()
        };
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("{marker}[{key}] ")))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", difficulty.profile().label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" - {desc}  {best}")))?;
    }

    // Fastest clears
    out.queue(cursor::MoveTo(left, cy))?;
    out.queue(Print("Fastest clears: "))?;
    for (difficulty, best) in session.best_runs().iter() {
        let time = if best.time > 0 { format_duration(best.time) } else { "-".to_string() };
        out.queue(Print(format!("{} {}   ", difficulty.profile().label, time)))?;
    }

    let settings = session.settings();
    let on_off = |on: bool| if on { "on" } else { "off" };
    let toggles = format!(
        "[A]udio {}  [M]usic {}  [F]x {}  [S]tats {}  Volume {:.0}% (+/-)  Music {:.0}% ([/])",
        on_off(settings.audio_enabled),
        on_off(settings.music_enabled),
        on_off(settings.effects_enabled),
        on_off(settings.stats_enabled),
        settings.volume * 100.0,
        settings.music_volume * 100.0,
    );
    out.queue(cursor::MoveTo(left, cy + 2))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(toggles))?;

    let aim = format!(
        "Sensitivity {:.1} (,/.)  Crosshair {}px ((/))  Colour {} [X]",
        settings.sensitivity, settings.crosshair_size, settings.crosshair_color,
    );
    out.queue(cursor::MoveTo(left, cy + 3))?;
    out.queue(Print(aim))?;

    // Pickup legend
    out.queue(cursor::MoveTo(left, cy + 4))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Pickups: + health  + armor  ammo crates  S serious damage  S speed boost"))?;

    out.queue(cursor::MoveTo(left, cy + 6))?;
    out.queue(Print("WASD : Move   Mouse/Arrows : Aim   SPACE/Click : Fire   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Held keys go through a `KeyTracker`: terminals with keyboard enhancement
/// report releases, classic ones only repeat presses and keys expire after a
/// few silent frames. The tracked state is copied into the session's input
/// once per frame, so movement and firing combine freely.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let origin = Instant::now();
    let now_ms = || origin.elapsed().as_secs_f64() * 1000.0;
    let aim_step = config::aim_step();

    let mut keys: KeyTracker<KeyCode> = KeyTracker::new();
    let mut mouse_firing = false;

    session.start(now_ms());

    loop {
        let frame_start = Instant::now();
        keys.next_frame();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        keys.press(normalize(code));
                        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                            return Ok(true);
                        }
                        if let Some(quit) = on_key_press(session, code, aim_step, now_ms()) {
                            return Ok(quit);
                        }
                    }
                    KeyEventKind::Repeat => {
                        keys.press(normalize(code));
                        nudge_aim(session, code, aim_step);
                    }
                    KeyEventKind::Release => keys.release(&normalize(code)),
                },
                Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                    let (width, height) = terminal::size()?;
                    let point = display::cell_to_world(session.state(), width, height, column, row);
                    match kind {
                        MouseEventKind::Moved | MouseEventKind::Drag(_) => session.aim_at(point),
                        MouseEventKind::Down(MouseButton::Left) => {
                            session.aim_at(point);
                            mouse_firing = true;
                        }
                        MouseEventKind::Up(MouseButton::Left) => mouse_firing = false,
                        MouseEventKind::ScrollUp => session.cycle_weapon(-1),
                        MouseEventKind::ScrollDown => session.cycle_weapon(1),
                        _ => {}
                    }
                }
                Event::FocusLost => {
                    keys.clear();
                    mouse_firing = false;
                    session.focus_lost();
                }
                _ => {}
            }
        }

        // ── Apply held-key state every frame ──────────────────────────────────
        let input = session.input_mut();
        input.up = keys.is_held(&KeyCode::Char('w'));
        input.down = keys.is_held(&KeyCode::Char('s'));
        input.left = keys.is_held(&KeyCode::Char('a'));
        input.right = keys.is_held(&KeyCode::Char('d'));
        input.firing = mouse_firing || keys.is_held(&KeyCode::Char(' '));

        session.frame(now_ms());
        display::render(out, session)?;

        let elapsed = frame_start.elapsed();
        if elapsed < config::FRAME_BUDGET {
            thread::sleep(config::FRAME_BUDGET - elapsed);
        }
    }
}

/// Letters are tracked case-insensitively so Shift doesn't drop a held key.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// One-shot actions. `Some(true)` quits, `Some(false)` returns to the menu.
fn on_key_press(
    session: &mut GameSession,
    code: KeyCode,
    aim_step: f64,
    now: f64,
) -> Option<bool> {
    let state = session.state();
    let running = state.is_running();
    let paused = state.status == RunStatus::Paused;
    let over = state.is_over();

    match normalize(code) {
        KeyCode::Esc if running || paused => {
            session.toggle_pause(now);
        }
        KeyCode::Char('q') if paused || over => return Some(true),
        KeyCode::Char('q') => session.cycle_weapon(-1),
        KeyCode::Char('e') => session.cycle_weapon(1),
        KeyCode::Char(c @ '1'..='8') => {
            let slot = c.to_digit(10).map_or(0, |d| d as usize);
            session.switch_weapon(slot);
        }
        KeyCode::Char('r') if over => {
            session.start(now);
        }
        KeyCode::Char('m') if over || paused => return Some(false),
        other => nudge_aim(session, other, aim_step),
    }
    None
}

fn nudge_aim(session: &mut GameSession, code: KeyCode, step: f64) {
    let delta = match code {
        KeyCode::Up => Vec2::new(0.0, -step),
        KeyCode::Down => Vec2::new(0.0, step),
        KeyCode::Left => Vec2::new(-step, 0.0),
        KeyCode::Right => Vec2::new(step, 0.0),
        _ => return,
    };
    session.aim_by(delta);
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(config::data_dir);
    init_tracing(&data_dir)?;

    let audio = BellAudio::open().map(|bell| Box::new(bell) as Box<dyn AudioBackend>);
    let mut session = Session::new(FileStore::new(&data_dir), audio, Arena::default(), args.seed);
    if args.reset_settings {
        session.reset_settings();
    }
    if args.reset_best_runs {
        session.reset_best_runs();
    }
    if let Some(difficulty) = args.difficulty {
        session.set_difficulty(difficulty);
    }
    info!(data_dir = %data_dir.display(), seed = ?args.seed, "starting");

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;
    let focus_events = out.execute(EnableFocusChange).is_ok();

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(err) => {
                warn!(error = %err, "terminal event read failed");
                break;
            }
        }
    });

    let result = run(&mut out, &rx, &mut session);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    if focus_events {
        let _ = out.execute(DisableFocusChange);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("terminal i/o failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut GameSession,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx, session)? {
            MenuResult::Quit => break,
            MenuResult::Start(difficulty) => {
                session.set_difficulty(difficulty);
                if game_loop(out, session, rx)? {
                    break;
                }
                // Otherwise loop back to the menu
            }
        }
    }
    info!("exiting");
    Ok(())
}
