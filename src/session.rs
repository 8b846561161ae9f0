//! The driver a front end talks to: owns the world, the RNG, the user's
//! settings and best runs, the store they persist to and the audio
//! director, and routes simulation events to them after every call.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::audio::{AudioBackend, AudioDirector, AudioError, LogAudio};
use crate::catalog::{music_for_wave, Difficulty};
use crate::compute;
use crate::compute::player;
use crate::entities::{Arena, GameState, Vec2};
use crate::events::GameEvent;
use crate::hud::{FrameStats, HudText};
use crate::input::InputState;
use crate::store::{self, BestRuns, KeyValueStore, Settings};

pub struct Session<S: KeyValueStore> {
    state: GameState,
    input: InputState,
    settings: Settings,
    best_runs: BestRuns,
    store: S,
    audio: AudioDirector,
    audio_available: bool,
    rng: StdRng,
    stats: FrameStats,
    /// Set once the finished run has been folded into the best runs.
    recorded: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Load settings and best runs from `store` and build an idle world.
    ///
    /// A failed audio backend is not fatal: the session runs silent and the
    /// audio toggles read as off.
    pub fn new(
        store: S,
        audio: Result<Box<dyn AudioBackend>, AudioError>,
        arena: Arena,
        seed: Option<u64>,
    ) -> Self {
        let settings = Settings::load(&store);
        let best_runs = BestRuns::load(&store);

        let (backend, audio_available) = match audio {
            Ok(backend) => (backend, true),
            Err(err) => {
                warn!(error = %err, "audio disabled for this session");
                (Box::new(LogAudio) as Box<dyn AudioBackend>, false)
            }
        };

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let input = InputState {
            aim: arena.center(),
            ..InputState::default()
        };
        let state = compute::init_state(arena, settings.difficulty);

        let mut session = Session {
            state,
            input,
            settings,
            best_runs,
            store,
            audio: AudioDirector::new(backend),
            audio_available,
            rng,
            stats: FrameStats::new(),
            recorded: false,
        };
        if !audio_available {
            session.settings.audio_enabled = false;
            session.settings.music_enabled = false;
        }
        session.apply_settings();
        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct world access for tooling and scripted scenarios.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn best_runs(&self) -> &BestRuns {
        &self.best_runs
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Mutable held-input state; the front end writes key and button
    /// state here before each `frame`.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn frame_stats(&self) -> Option<&FrameStats> {
        self.settings.stats_enabled.then_some(&self.stats)
    }

    pub fn hud(&self) -> HudText {
        HudText::from_state(&self.state)
    }

    // ── Run control ──────────────────────────────────────────────────────────

    /// Begin (or restart) a run on the configured difficulty.
    pub fn start(&mut self, timestamp_ms: f64) -> Vec<GameEvent> {
        compute::start_game(
            &mut self.state,
            self.settings.difficulty,
            timestamp_ms,
            &mut self.rng,
        );
        self.recorded = false;
        self.stats = FrameStats::new();
        self.dispatch_events()
    }

    pub fn pause(&mut self) -> Vec<GameEvent> {
        compute::pause_game(&mut self.state);
        self.dispatch_events()
    }

    pub fn resume(&mut self, timestamp_ms: f64) -> Vec<GameEvent> {
        compute::resume_game(&mut self.state, timestamp_ms);
        self.dispatch_events()
    }

    pub fn toggle_pause(&mut self, timestamp_ms: f64) -> Vec<GameEvent> {
        if self.state.is_running() {
            self.pause()
        } else {
            self.resume(timestamp_ms)
        }
    }

    pub fn focus_lost(&mut self) -> Vec<GameEvent> {
        compute::focus_lost(&mut self.state, &mut self.input);
        self.dispatch_events()
    }

    /// Advance one rendered frame and hand back what happened in it.
    pub fn frame(&mut self, timestamp_ms: f64) -> Vec<GameEvent> {
        if self.settings.stats_enabled && self.state.is_running() {
            if let Some(last) = self.state.last_frame_ms {
                self.stats.record((timestamp_ms - last).max(0.0));
            }
        }
        compute::frame(&mut self.state, timestamp_ms, &self.input, &mut self.rng);
        let events = self.dispatch_events();
        self.record_finished_run();
        events
    }

    pub fn switch_weapon(&mut self, slot: usize) -> bool {
        player::switch_weapon(&mut self.state, slot)
    }

    pub fn cycle_weapon(&mut self, direction: i32) {
        player::cycle_weapon(&mut self.state, direction);
    }

    pub fn aim_at(&mut self, point: Vec2) {
        self.input.aim_absolute(point);
    }

    /// Move the aim by a raw pointer delta, scaled by the sensitivity
    /// setting.
    pub fn aim_by(&mut self, delta: Vec2) {
        let sensitivity = self.settings.sensitivity;
        self.input.aim_relative(delta, sensitivity, &self.state.arena);
    }

    // ── Settings ─────────────────────────────────────────────────────────────

    /// Takes effect on the next `start`.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
        if !self.state.is_running() && !self.state.is_over() {
            self.state.difficulty = difficulty;
        }
        self.persist_settings();
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.settings.volume = store::clamp_volume(volume);
        self.apply_and_persist();
    }

    pub fn set_music_volume(&mut self, volume: f64) {
        self.settings.music_volume = store::clamp_volume(volume);
        self.apply_and_persist();
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.settings.sensitivity = store::clamp_sensitivity(sensitivity);
        self.persist_settings();
    }

    pub fn set_crosshair_size(&mut self, size: f64) {
        self.settings.crosshair_size = store::clamp_crosshair_size(size);
        self.persist_settings();
    }

    pub fn set_crosshair_color(&mut self, color: &str) {
        self.settings.crosshair_color =
            store::normalize_color(Some(color), &self.settings.crosshair_color);
        self.persist_settings();
    }

    pub fn cycle_crosshair_color(&mut self) {
        let next = store::next_crosshair_preset(&self.settings.crosshair_color);
        self.set_crosshair_color(next);
    }

    /// Ignored while no audio backend is available.
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        if !self.audio_available {
            return;
        }
        self.settings.audio_enabled = enabled;
        self.apply_and_persist();
    }

    /// Ignored while no audio backend is available.
    pub fn set_music_enabled(&mut self, enabled: bool) {
        if !self.audio_available {
            return;
        }
        self.settings.music_enabled = enabled;
        self.apply_and_persist();
    }

    pub fn set_effects_enabled(&mut self, enabled: bool) {
        self.settings.effects_enabled = enabled;
        self.apply_and_persist();
    }

    pub fn set_stats_enabled(&mut self, enabled: bool) {
        self.settings.stats_enabled = enabled;
        if !enabled {
            self.stats = FrameStats::new();
        }
        self.persist_settings();
    }

    pub fn reset_settings(&mut self) {
        self.settings = Settings::default();
        if !self.audio_available {
            self.settings.audio_enabled = false;
            self.settings.music_enabled = false;
        }
        self.apply_and_persist();
        info!("settings reset");
    }

    pub fn reset_best_runs(&mut self) {
        self.best_runs.reset();
        if let Err(err) = self.best_runs.save(&mut self.store) {
            warn!(error = %err, "could not persist best runs");
        }
        info!("best runs reset");
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Push the current settings into the world and the audio director.
    fn apply_settings(&mut self) {
        self.state.effects_enabled = self.settings.effects_enabled;
        if !self.settings.effects_enabled {
            self.state.screen_shake = 0.0;
            self.state.hurt_flash = 0.0;
        }

        self.audio.audio_enabled = self.settings.audio_enabled;
        self.audio.music_enabled = self.settings.music_enabled;
        self.audio.volume = self.settings.volume;
        self.audio.music_volume = self.settings.music_volume;

        let result = if !self.settings.audio_enabled || !self.settings.music_enabled {
            self.audio.stop_music()
        } else if self.state.is_running() {
            self.audio.set_music(music_for_wave(self.state.wave_index))
        } else {
            Ok(())
        };
        if let Err(err) = result {
            warn!(error = %err, "audio backend error");
        }
    }

    fn apply_and_persist(&mut self) {
        self.apply_settings();
        self.persist_settings();
    }

    fn persist_settings(&mut self) {
        if let Err(err) = self.settings.save(&mut self.store) {
            warn!(error = %err, "could not persist settings");
        }
    }

    /// Drain the world's event queue into the audio director and the log.
    fn dispatch_events(&mut self) -> Vec<GameEvent> {
        let events = std::mem::take(&mut self.state.events);
        for event in &events {
            if let Err(err) = self.audio.handle(event) {
                warn!(error = %err, "audio backend error");
            }
            match event {
                GameEvent::WaveStarted { index } => info!(wave = index + 1, "wave started"),
                GameEvent::EnemyKilled { kind, score } => {
                    debug!(kind = kind.name(), score, "enemy killed");
                }
                GameEvent::PickupCollected { kind } => {
                    debug!(pickup = kind.spec().key, "pickup collected");
                }
                _ => {}
            }
        }
        events
    }

    fn record_finished_run(&mut self) {
        if self.recorded {
            return;
        }
        let Some(summary) = self.state.summary else {
            return;
        };
        self.recorded = true;
        if self.best_runs.record(&summary) {
            info!(difficulty = summary.difficulty.key(), "new personal best");
            if let Err(err) = self.best_runs.save(&mut self.store) {
                warn!(error = %err, "could not persist best runs");
            }
        }
    }
}
