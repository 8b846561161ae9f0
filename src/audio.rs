//! Sound output. The simulation only emits `GameEvent`s; `AudioDirector`
//! turns the audible ones into backend calls.

use std::fmt;
use std::io::{self, IsTerminal, Write};

use tracing::trace;

use crate::events::{GameEvent, MusicIntensity, SoundCue};

#[derive(Debug)]
pub enum AudioError {
    /// No device or terminal to play through.
    Unavailable(&'static str),
    Io(io::Error),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "audio unavailable: {why}"),
            Self::Io(err) => write!(f, "audio output failed: {err}"),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<io::Error> for AudioError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Something that can make noise.
pub trait AudioBackend {
    fn play(&mut self, cue: SoundCue, volume: f64) -> Result<(), AudioError>;
    fn start_music(&mut self, intensity: MusicIntensity, volume: f64) -> Result<(), AudioError>;
    fn stop_music(&mut self) -> Result<(), AudioError>;
}

/// Writes every call to the trace log. Useful headless and in tests.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioBackend for LogAudio {
    fn play(&mut self, cue: SoundCue, volume: f64) -> Result<(), AudioError> {
        trace!(cue = cue.name(), volume, "sfx");
        Ok(())
    }

    fn start_music(&mut self, intensity: MusicIntensity, volume: f64) -> Result<(), AudioError> {
        trace!(?intensity, bpm = intensity.bpm(), volume, "music");
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        trace!("music stopped");
        Ok(())
    }
}

/// Rings the terminal bell for the cues worth noticing. Music is silent.
#[derive(Debug)]
pub struct BellAudio<W: Write> {
    out: W,
}

impl BellAudio<io::Stdout> {
    /// Bell on stdout; fails when stdout is not a terminal.
    pub fn open() -> Result<Self, AudioError> {
        let out = io::stdout();
        if !out.is_terminal() {
            return Err(AudioError::Unavailable("stdout is not a terminal"));
        }
        Ok(BellAudio { out })
    }
}

impl<W: Write> BellAudio<W> {
    pub fn with_writer(out: W) -> Self {
        BellAudio { out }
    }
}

impl<W: Write> AudioBackend for BellAudio<W> {
    fn play(&mut self, cue: SoundCue, volume: f64) -> Result<(), AudioError> {
        if volume <= 0.0 || !matches!(cue, SoundCue::Hurt | SoundCue::Explosion) {
            return Ok(());
        }
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }

    fn start_music(&mut self, _intensity: MusicIntensity, _volume: f64) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Routes simulation events to a backend, honoring the user's toggles and
/// volumes and never restarting music that is already at the requested
/// intensity.
pub struct AudioDirector {
    backend: Box<dyn AudioBackend>,
    pub audio_enabled: bool,
    pub music_enabled: bool,
    pub volume: f64,
    pub music_volume: f64,
    playing: Option<MusicIntensity>,
}

impl AudioDirector {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        AudioDirector {
            backend,
            audio_enabled: true,
            music_enabled: true,
            volume: 1.0,
            music_volume: 1.0,
            playing: None,
        }
    }

    /// Intensity currently playing, if any.
    pub fn playing(&self) -> Option<MusicIntensity> {
        self.playing
    }

    pub fn handle(&mut self, event: &GameEvent) -> Result<(), AudioError> {
        match *event {
            GameEvent::Sound(cue) => self.play(cue),
            GameEvent::Music(intensity) => self.set_music(intensity),
            GameEvent::MusicStopped => self.stop_music(),
            _ => Ok(()),
        }
    }

    pub fn play(&mut self, cue: SoundCue) -> Result<(), AudioError> {
        if !self.audio_enabled {
            return Ok(());
        }
        self.backend.play(cue, self.volume)
    }

    pub fn set_music(&mut self, intensity: MusicIntensity) -> Result<(), AudioError> {
        if !self.audio_enabled || !self.music_enabled || self.playing == Some(intensity) {
            return Ok(());
        }
        self.playing = Some(intensity);
        self.backend.start_music(intensity, self.music_volume)
    }

    pub fn stop_music(&mut self) -> Result<(), AudioError> {
        if self.playing.take().is_none() {
            return Ok(());
        }
        self.backend.stop_music()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

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

    fn director() -> (AudioDirector, Rc<RefCell<Vec<String>>>) {
        let recorder = Recorder::default();
        let calls = Rc::clone(&recorder.calls);
        (AudioDirector::new(Box::new(recorder)), calls)
    }

    #[test]
    fn music_is_not_restarted_at_the_same_intensity() {
        let (mut audio, calls) = director();
        audio.set_music(MusicIntensity::Calm).unwrap();
        audio.set_music(MusicIntensity::Calm).unwrap();
        audio.set_music(MusicIntensity::Boss).unwrap();
        audio.stop_music().unwrap();
        audio.stop_music().unwrap();
        assert_eq!(*calls.borrow(), ["music 96", "music 134", "stop"]);
    }

    #[test]
    fn disabled_audio_swallows_everything() {
        let (mut audio, calls) = director();
        audio.audio_enabled = false;
        audio.handle(&GameEvent::Sound(SoundCue::Hurt)).unwrap();
        audio.handle(&GameEvent::Music(MusicIntensity::Combat)).unwrap();
        assert!(calls.borrow().is_empty());
        assert_eq!(audio.playing(), None);
    }

    #[test]
    fn bell_rings_only_for_loud_cues() {
        let mut bell = BellAudio::with_writer(Vec::new());
        bell.play(SoundCue::Revolver, 1.0).unwrap();
        bell.play(SoundCue::Hurt, 1.0).unwrap();
        bell.play(SoundCue::Explosion, 0.0).unwrap();
        assert_eq!(bell.out, b"\x07");
    }
}
