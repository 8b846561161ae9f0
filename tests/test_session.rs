use std::cell::RefCell;
use std::rc::Rc;

use arena_shooter::audio::*;
use arena_shooter::catalog::*;
use arena_shooter::entities::*;
use arena_shooter::events::*;
use arena_shooter::session::Session;
use arena_shooter::store::*;

#[derive(Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl AudioBackend for Recorder {
    fn play(&mut self, cue: SoundCue, _volume: f64) -> Result<(), AudioError> {
        self.calls.borrow_mut().push(format!("play {}", cue.name()));
        Ok(())
    }

    fn start_music(&mut self, intensity: MusicIntensity, _volume: f64) -> Result<(), AudioError> {
        self.calls.borrow_mut().push(format!("music {}", intensity.bpm()));
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        self.calls.borrow_mut().push("stop".to_string());
        Ok(())
    }
}

fn silent_session(store: MemoryStore) -> Session<MemoryStore> {
    Session::new(store, Ok(Box::new(LogAudio)), Arena::default(), Some(7))
}

fn recorded_session() -> (Session<MemoryStore>, Rc<RefCell<Vec<String>>>) {
    let recorder = Recorder::default();
    let calls = Rc::clone(&recorder.calls);
    let session = Session::new(
        MemoryStore::new(),
        Ok(Box::new(recorder)),
        Arena::default(),
        Some(7),
    );
    (session, calls)
}

fn enemy_round_on_player(session: &mut Session<MemoryStore>) {
    let state = session.state_mut();
    let pos = state.player.pos;
    state.enemy_projectiles.push(EnemyProjectile {
        pos,
        vel: Vec2::ZERO,
        radius: 5.0,
        damage: 30.0,
        explosion_radius: None,
        color: "#ff95ff",
    });
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn new_session_is_idle_and_aims_at_the_center() {
    let session = silent_session(MemoryStore::new());
    assert_eq!(session.state().status, RunStatus::Idle);
    assert_eq!(session.input().aim, Vec2::new(480.0, 300.0));
    assert_eq!(session.settings(), &Settings::default());
    assert!(session.frame_stats().is_none());
}

#[test]
fn start_reports_the_first_wave() {
    let mut session = silent_session(MemoryStore::new());
    let events = session.start(0.0);
    assert!(events.contains(&GameEvent::WaveStarted { index: 0 }));
    assert!(session.state().is_running());
    assert!(session.state().events.is_empty());
}

#[test]
fn toggle_pause_flips_between_running_and_paused() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);

    session.toggle_pause(100.0);
    assert_eq!(session.state().status, RunStatus::Paused);
    session.toggle_pause(200.0);
    assert_eq!(session.state().status, RunStatus::Running);
    assert_eq!(session.state().last_frame_ms, Some(200.0));
}

#[test]
fn focus_loss_pauses_and_releases_keys() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    session.input_mut().firing = true;
    session.input_mut().left = true;

    session.focus_lost();
    assert_eq!(session.state().status, RunStatus::Paused);
    assert!(!session.input().firing && !session.input().left);
}

#[test]
fn aim_follows_sensitivity() {
    let mut session = silent_session(MemoryStore::new());
    session.set_sensitivity(2.0);
    session.aim_by(Vec2::new(10.0, -5.0));
    assert_eq!(session.input().aim, Vec2::new(500.0, 290.0));

    session.aim_at(Vec2::new(5.0, 6.0));
    assert_eq!(session.input().aim, Vec2::new(5.0, 6.0));
}

#[test]
fn weapon_selection_goes_through_the_session() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    assert!(session.switch_weapon(6));
    assert_eq!(session.state().player.weapon, WeaponKind::Cannon);
    session.cycle_weapon(1);
    assert_eq!(session.state().player.weapon, WeaponKind::DoubleBarrel);
    assert_eq!(session.hud().weapon, "Double-Barrel");
}

// ── Audio ─────────────────────────────────────────────────────────────────────

#[test]
fn missing_audio_turns_the_toggles_off() {
    let mut session = Session::new(
        MemoryStore::new(),
        Err(AudioError::Unavailable("no device")),
        Arena::default(),
        Some(7),
    );
    assert!(!session.settings().audio_enabled);
    assert!(!session.settings().music_enabled);

    session.set_audio_enabled(true);
    session.set_music_enabled(true);
    assert!(!session.settings().audio_enabled);
    assert!(!session.settings().music_enabled);

    session.reset_settings();
    assert!(!session.settings().audio_enabled);
}

#[test]
fn events_reach_the_audio_backend() {
    let (mut session, calls) = recorded_session();
    session.start(0.0);
    assert_eq!(*calls.borrow(), ["music 96"]);

    session.pause();
    session.resume(50.0);
    session.set_music_enabled(false);
    assert_eq!(*calls.borrow(), ["music 96", "stop", "music 96", "stop"]);

    session.input_mut().firing = true;
    session.frame(66.0);
    assert!(calls.borrow().iter().any(|c| c == "play revolver"));
}

#[test]
fn muted_audio_plays_nothing() {
    let (mut session, calls) = recorded_session();
    session.set_audio_enabled(false);
    session.start(0.0);
    session.input_mut().firing = true;
    session.frame(16.0);
    assert!(calls.borrow().is_empty());
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[test]
fn settings_persist_across_sessions() {
    let mut session = silent_session(MemoryStore::new());
    session.set_difficulty(Difficulty::Hard);
    session.set_volume(0.3);
    session.set_crosshair_color("#00FF00");
    session.set_crosshair_size(100.0);

    let reopened = silent_session(session.store().clone());
    let settings = reopened.settings();
    assert_eq!(settings.difficulty, Difficulty::Hard);
    assert_eq!(settings.volume, 0.3);
    assert_eq!(settings.crosshair_color, "#00ff00");
    assert_eq!(settings.crosshair_size, 48);
    assert_eq!(reopened.state().difficulty, Difficulty::Hard);
    assert_eq!(reopened.state().player.health, 90.0);
}

#[test]
fn volumes_are_clamped_and_saved() {
    let mut session = silent_session(MemoryStore::new());
    session.set_music_volume(1.7);
    session.set_volume(-0.2);
    assert_eq!(session.settings().music_volume, 1.0);
    assert_eq!(session.settings().volume, 0.0);

    let saved = Settings::load(session.store());
    assert_eq!(saved.music_volume, 1.0);
    assert_eq!(saved.volume, 0.0);
}

#[test]
fn aim_settings_step_within_their_ranges() {
    let mut session = silent_session(MemoryStore::new());
    session.set_crosshair_size(f64::from(session.settings().crosshair_size) + 2.0);
    assert_eq!(session.settings().crosshair_size, 26);
    session.set_crosshair_size(10.0);
    assert_eq!(session.settings().crosshair_size, 14);

    session.set_sensitivity(session.settings().sensitivity + 0.1);
    assert!((session.settings().sensitivity - 1.1).abs() < 1e-9);
    session.set_sensitivity(5.0);
    assert_eq!(session.settings().sensitivity, 2.0);

    let saved = Settings::load(session.store());
    assert_eq!(saved.crosshair_size, 14);
    assert_eq!(saved.sensitivity, 2.0);
}

#[test]
fn crosshair_color_cycles_through_presets() {
    let mut session = silent_session(MemoryStore::new());
    assert_eq!(session.settings().crosshair_color, CROSSHAIR_PRESETS[0]);
    for preset in CROSSHAIR_PRESETS.iter().skip(1) {
        session.cycle_crosshair_color();
        assert_eq!(session.settings().crosshair_color, *preset);
    }
    session.cycle_crosshair_color();
    assert_eq!(session.settings().crosshair_color, CROSSHAIR_PRESETS[0]);

    session.set_crosshair_color("#123456");
    session.cycle_crosshair_color();
    assert_eq!(session.settings().crosshair_color, CROSSHAIR_PRESETS[0]);
    assert_eq!(Settings::load(session.store()).crosshair_color, CROSSHAIR_PRESETS[0]);
}

#[test]
fn difficulty_change_waits_for_the_next_run() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    session.set_difficulty(Difficulty::Easy);
    assert_eq!(session.state().difficulty, Difficulty::Normal);

    session.start(100.0);
    assert_eq!(session.state().difficulty, Difficulty::Easy);
    assert_eq!(session.state().enemies.len(), 7);
}

#[test]
fn effects_toggle_reaches_the_world() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    session.state_mut().screen_shake = 0.8;

    session.set_effects_enabled(false);
    assert!(!session.state().effects_enabled);
    assert_eq!(session.state().screen_shake, 0.0);
}

#[test]
fn stats_are_only_sampled_when_enabled() {
    let mut session = silent_session(MemoryStore::new());
    session.set_stats_enabled(true);
    session.start(0.0);
    session.frame(20.0);
    session.frame(40.0);

    let stats = session.frame_stats().expect("stats enabled");
    assert!((stats.average_ms() - 20.0).abs() < 1e-9);

    session.set_stats_enabled(false);
    assert!(session.frame_stats().is_none());
}

// ── Best runs ─────────────────────────────────────────────────────────────────

#[test]
fn defeat_records_score_but_not_time() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    {
        let state = session.state_mut();
        state.score = 250.0;
        state.kills = 5;
        state.player.health = 1.0;
        state.player.armor = 0.0;
    }
    enemy_round_on_player(&mut session);

    let events = session.frame(16.0);
    assert!(events.contains(&GameEvent::RunEnded {
        outcome: RunOutcome::Defeat
    }));

    let best = session.best_runs().get(Difficulty::Normal);
    assert_eq!(best.score, 250);
    assert_eq!(best.kills, 5);
    assert_eq!(best.time, 0);
    assert_eq!(BestRuns::load(session.store()).get(Difficulty::Normal), best);
}

#[test]
fn victory_records_the_clear_time() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    {
        let state = session.state_mut();
        state.wave_index = WAVES.len() - 1;
        state.enemies.clear();
        state.clock_ms = 61_000.0;
    }

    session.frame(16.0);
    assert_eq!(session.state().status, RunStatus::Ended(RunOutcome::Victory));

    let best = session.best_runs().get(Difficulty::Normal);
    assert_eq!(best.time, 61);
    assert_eq!(best.waves, 10);

    // Further frames on a finished run change nothing.
    session.frame(32.0);
    assert_eq!(session.best_runs().get(Difficulty::Normal), best);
}

#[test]
fn reset_best_runs_wipes_the_store() {
    let mut session = silent_session(MemoryStore::new());
    session.start(0.0);
    {
        let state = session.state_mut();
        state.score = 40.0;
        state.player.health = 1.0;
        state.player.armor = 0.0;
    }
    enemy_round_on_player(&mut session);
    session.frame(16.0);
    assert!(session.best_runs().get(Difficulty::Normal).has_data());

    session.reset_best_runs();
    assert_eq!(session.best_runs(), &BestRuns::default());
    assert_eq!(BestRuns::load(session.store()), BestRuns::default());
}

#[test]
fn same_seed_same_session() {
    let run = || {
        let mut session = silent_session(MemoryStore::new());
        session.start(0.0);
        session.input_mut().firing = true;
        for i in 1..=40 {
            session.frame(f64::from(i) * 16.0);
        }
        let state = session.state();
        (
            state.enemies.iter().map(|e| e.pos).collect::<Vec<_>>(),
            state.bullets.len(),
        )
    };
    assert_eq!(run(), run());
}
