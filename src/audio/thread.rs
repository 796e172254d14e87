use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::catalog::TrackDescriptor;
use crate::config::AudioSettings;

use super::sink::{create_sink_at, probe_duration};
use super::tap::SignalTap;
use super::types::{EndCause, EngineCmd, EngineEvent, clamp_seek, clamp_volume};

/// Spawn the audio thread. It reports on `ready` whether an output device could
/// be opened, then serves commands until `Quit` or until the sender is dropped.
pub(super) fn spawn_audio_thread(
    rx: Receiver<EngineCmd>,
    events: Sender<EngineEvent>,
    tap: Arc<OnceLock<SignalTap>>,
    audio_settings: AudioSettings,
    ready: SyncSender<bool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                tracing::error!(error = %e, "no audio output device");
                None
            }
        };
        let _ = ready.send(stream.is_some());

        let tick_every = Duration::from_millis(audio_settings.time_update_ms.max(1));
        let mut deck = Deck::new(stream, tap, events, clamp_volume(audio_settings.volume));
        let mut last_tick = Instant::now();

        loop {
            match rx.recv_timeout(tick_every) {
                Ok(EngineCmd::Quit { fade_out_ms }) => {
                    deck.shutdown(fade_out_ms);
                    break;
                }
                Ok(cmd) => deck.apply(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // Commands may keep the channel busy; still emit time updates on schedule.
            if last_tick.elapsed() >= tick_every {
                deck.tick();
                last_tick = Instant::now();
            }
        }
    })
}

/// The track currently bound to the deck.
struct Loaded {
    generation: u64,
    path: PathBuf,
    duration: Option<Duration>,
    /// Position the sink started from when it was rebuilt for a seek.
    offset: Duration,
    ended: bool,
}

/// Everything the audio thread owns.
struct Deck {
    stream: Option<OutputStream>,
    tap: Arc<OnceLock<SignalTap>>,
    events: Sender<EngineEvent>,
    sink: Option<Sink>,
    loaded: Option<Loaded>,
    volume: f32,
    playing: bool,
}

impl Deck {
    fn new(
        stream: Option<OutputStream>,
        tap: Arc<OnceLock<SignalTap>>,
        events: Sender<EngineEvent>,
        volume: f32,
    ) -> Self {
        Self {
            stream,
            tap,
            events,
            sink: None,
            loaded: None,
            volume,
            playing: false,
        }
    }

    fn apply(&mut self, cmd: EngineCmd) {
        match cmd {
            EngineCmd::Load { generation, track } => self.load(generation, &track),
            EngineCmd::Play => {
                if let Some(s) = self.sink.as_ref() {
                    s.play();
                    self.playing = true;
                }
            }
            EngineCmd::Pause => {
                if let Some(s) = self.sink.as_ref() {
                    s.pause();
                }
                self.playing = false;
            }
            EngineCmd::Seek(target) => self.seek(target),
            EngineCmd::SetVolume(v) => {
                self.volume = v;
                if let Some(s) = self.sink.as_ref() {
                    s.set_volume(v);
                }
            }
            EngineCmd::Quit { .. } => {}
        }
    }

    fn emit(&self, event: EngineEvent) {
        // The receiver only disappears during shutdown.
        let _ = self.events.send(event);
    }

    fn load(&mut self, generation: u64, track: &TrackDescriptor) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.loaded = None;
        self.playing = false;

        let Some(path) = track.audio.local_path() else {
            self.fail(generation, track, "remote resources are not fetched".to_string());
            return;
        };
        let Some(stream) = self.stream.as_ref() else {
            self.fail(generation, track, "no audio output device".to_string());
            return;
        };

        match create_sink_at(stream, path, Duration::ZERO, &self.tap) {
            Ok((sink, decoded)) => {
                let duration = decoded.or_else(|| probe_duration(path));
                sink.set_volume(self.volume);
                tracing::info!(
                    generation,
                    title = %track.title,
                    duration = ?duration,
                    "loaded track"
                );
                self.sink = Some(sink);
                self.loaded = Some(Loaded {
                    generation,
                    path: path.to_path_buf(),
                    duration,
                    offset: Duration::ZERO,
                    ended: false,
                });
                self.emit_time();
            }
            Err(e) => self.fail(generation, track, e.to_string()),
        }
    }

    fn fail(&self, generation: u64, track: &TrackDescriptor, reason: String) {
        tracing::warn!(generation, audio = %track.audio, %reason, "track unavailable");
        self.emit(EngineEvent::Ended {
            generation,
            cause: EndCause::Unavailable(reason),
        });
    }

    fn seek(&mut self, target: f64) {
        let (Some(loaded), Some(sink)) = (self.loaded.as_mut(), self.sink.as_ref()) else {
            return;
        };
        let Some(target) = clamp_seek(target, loaded.duration.map(|d| d.as_secs_f64())) else {
            tracing::debug!("seek ignored, duration unknown");
            return;
        };
        let pos = Duration::from_secs_f64(target);

        match sink.try_seek(pos) {
            Ok(()) => loaded.offset = Duration::ZERO,
            Err(e) => {
                // Rebuild the sink and skip into the file instead.
                tracing::debug!(error = %e, "try_seek failed, rebuilding sink");
                let Some(stream) = self.stream.as_ref() else {
                    return;
                };
                match create_sink_at(stream, &loaded.path, pos, &self.tap) {
                    Ok((new_sink, _)) => {
                        new_sink.set_volume(self.volume);
                        if self.playing {
                            new_sink.play();
                        }
                        sink.stop();
                        self.sink = Some(new_sink);
                        loaded.offset = pos;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "seek failed");
                        return;
                    }
                }
            }
        }
        self.emit_time();
    }

    fn position(&self) -> Duration {
        let Some(loaded) = self.loaded.as_ref() else {
            return Duration::ZERO;
        };
        let pos = loaded.offset + self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos);
        match loaded.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn emit_time(&self) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        self.emit(EngineEvent::TimeUpdate {
            generation: loaded.generation,
            current: self.position().as_secs_f64(),
            duration: loaded.duration.map(|d| d.as_secs_f64()),
        });
    }

    /// Periodic work: report the clock and detect the end of the track.
    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let finished = match (self.loaded.as_ref(), self.sink.as_ref()) {
            (Some(loaded), Some(sink)) if !loaded.ended => sink.empty(),
            _ => return,
        };

        self.emit_time();
        if finished {
            self.playing = false;
            if let Some(loaded) = self.loaded.as_mut() {
                loaded.ended = true;
                let generation = loaded.generation;
                self.emit(EngineEvent::Ended {
                    generation,
                    cause: EndCause::Finished,
                });
            }
        }
    }

    fn shutdown(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.take() {
            // Fade out gently before stopping.
            fade_out_sink(&s, self.volume, fade_out_ms);
            s.stop();
        }
        self.playing = false;
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
