use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::catalog::TrackDescriptor;
use crate::config::AudioSettings;
use crate::error::{PlayerError, Result};

use super::tap::SignalTap;
use super::thread::spawn_audio_thread;
use super::types::{EngineCmd, EngineEvent, clamp_volume};

/// Transport operations over a single playback source.
///
/// Every call is fire-and-forget; the engine acknowledges through the
/// [`EngineEvent`]s it pushes to its subscriber.
pub trait Engine {
    /// Stop current playback and bind to `track`. Returns the load generation
    /// that subsequent events for this track will carry.
    fn load(&mut self, track: &TrackDescriptor) -> u64;
    /// Start or resume playback. No-op when nothing is loaded.
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump to `seconds`, clamped to the track length. No-op while the length is unknown.
    fn seek(&mut self, seconds: f64);
    /// Set the output volume, clamped to `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Get the signal tap, creating it on first use. Later calls return the same tap.
    fn signal_tap(&mut self) -> Result<SignalTap>;
}

/// `rodio`-backed engine. Owns the audio thread; events are pushed to the
/// channel handed to [`AudioEngine::new`].
pub struct AudioEngine {
    tx: Sender<EngineCmd>,
    generation: u64,
    tap: Arc<OnceLock<SignalTap>>,
    output_available: bool,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioEngine {
    pub fn new(events: Sender<EngineEvent>, audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<bool>(1);
        let tap = Arc::new(OnceLock::new());

        let audio_handle = spawn_audio_thread(rx, events, tap.clone(), audio_settings, ready_tx);
        let output_available = ready_rx.recv().unwrap_or(false);

        Self {
            tx,
            generation: 0,
            tap,
            output_available,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn output_available(&self) -> bool {
        self.output_available
    }

    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!("audio thread is gone, command dropped");
        }
    }

    /// Fade out, stop the audio thread and wait for it.
    pub fn quit_softly(&self, fade_out: Duration) {
        let handle = self.join.lock().ok().and_then(|mut j| j.take());
        let Some(handle) = handle else {
            return;
        };

        self.send(EngineCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        let _ = handle.join();
    }
}

impl Engine for AudioEngine {
    fn load(&mut self, track: &TrackDescriptor) -> u64 {
        self.generation += 1;
        self.send(EngineCmd::Load {
            generation: self.generation,
            track: track.clone(),
        });
        self.generation
    }

    fn play(&mut self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(EngineCmd::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.send(EngineCmd::Seek(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(EngineCmd::SetVolume(clamp_volume(volume)));
    }

    fn signal_tap(&mut self) -> Result<SignalTap> {
        if !self.output_available {
            return Err(PlayerError::AnalysisUnavailable(
                "no audio output device".to_string(),
            ));
        }
        Ok(self.tap.get_or_init(SignalTap::new).clone())
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.quit_softly(Duration::ZERO);
    }
}
