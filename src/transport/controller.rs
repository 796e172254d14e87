use crate::audio::{EndCause, Engine, EngineEvent, clamp_volume};
use crate::catalog::{TrackCatalog, TrackDescriptor};
use crate::error::{PlayerError, Result};
use crate::progress::{ProgressTracker, ProgressView};

use super::model::{PlaybackState, TransportState};

/// Coordinates the catalog, the engine and the playback state.
///
/// All state changes go through these methods; engine events are fed back in
/// with [`TransportController::handle_event`], one at a time.
pub struct TransportController<E: Engine> {
    catalog: TrackCatalog,
    engine: E,
    state: PlaybackState,
    progress: ProgressTracker,
    /// Generation returned by the engine for the current track.
    generation: u64,
    /// Loads that failed in a row; used to stop when nothing is playable.
    consecutive_failures: usize,
    /// Every track failed on the last lap; the engine has nothing bound.
    exhausted: bool,
}

impl<E: Engine> TransportController<E> {
    /// Bind the first track and apply `volume`. The transport starts `Stopped`.
    pub fn new(catalog: TrackCatalog, mut engine: E, volume: f32) -> Self {
        let volume = clamp_volume(volume);
        engine.set_volume(volume);

        let mut controller = Self {
            catalog,
            engine,
            state: PlaybackState::new(volume),
            progress: ProgressTracker::default(),
            generation: 0,
            consecutive_failures: 0,
            exhausted: false,
        };
        controller.load(0);
        controller
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressView {
        self.progress.view()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn current_track(&self) -> &TrackDescriptor {
        &self.catalog[self.state.current_index]
    }

    /// Whether the transport stopped because no track in the catalog could be loaded.
    pub fn all_unavailable(&self) -> bool {
        self.exhausted
    }

    fn load(&mut self, index: usize) {
        let Some(track) = self.catalog.get(index) else {
            return;
        };
        self.generation = self.engine.load(track);
        self.exhausted = false;
        self.state.current_index = index;
        self.state.current_time = 0.0;
        self.state.duration = None;
        self.progress.reset();
    }

    /// Load track `index`, keeping the current play intent.
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        if index >= self.catalog.len() {
            return Err(PlayerError::IndexOutOfRange {
                index,
                len: self.catalog.len(),
            });
        }

        tracing::debug!(index, "select track");
        self.consecutive_failures = 0;
        self.load(index);
        if self.state.is_playing() {
            self.engine.play();
        }
        Ok(())
    }

    /// Start or resume playback. After a lap of failed loads the current
    /// track is loaded again first.
    pub fn play(&mut self) {
        if self.exhausted {
            tracing::info!(index = self.state.current_index, "retrying playback");
            self.load_and_play(self.state.current_index);
            return;
        }
        if self.state.transport != TransportState::Playing {
            self.engine.play();
            self.state.transport = TransportState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state.transport == TransportState::Playing {
            self.engine.pause();
            self.state.transport = TransportState::Paused;
        }
    }

    pub fn toggle_play(&mut self) {
        match self.state.transport {
            TransportState::Stopped | TransportState::Paused => self.play(),
            TransportState::Playing => self.pause(),
        }
    }

    /// Skip forward, wrapping to the first track. Always ends up playing.
    pub fn next(&mut self) {
        self.consecutive_failures = 0;
        self.advance();
    }

    /// Skip back, wrapping to the last track. Always ends up playing.
    pub fn previous(&mut self) {
        self.consecutive_failures = 0;
        let index = self.catalog.wrap_prev(self.state.current_index);
        self.load_and_play(index);
    }

    fn advance(&mut self) {
        let index = self.catalog.wrap_next(self.state.current_index);
        self.load_and_play(index);
    }

    fn load_and_play(&mut self, index: usize) {
        self.load(index);
        self.engine.play();
        self.state.transport = TransportState::Playing;
    }

    /// Move past a track that failed to load. Playback only continues if it
    /// was already running; a stopped or paused transport stays that way.
    fn skip_unavailable(&mut self, reason: &str) {
        self.consecutive_failures += 1;
        tracing::warn!(
            index = self.state.current_index,
            %reason,
            "track unavailable, skipping"
        );
        if self.consecutive_failures >= self.catalog.len() {
            tracing::error!("no playable track in the playlist, stopping");
            self.state.transport = TransportState::Stopped;
            self.consecutive_failures = 0;
            self.exhausted = true;
            return;
        }

        let index = self.catalog.wrap_next(self.state.current_index);
        if self.state.is_playing() {
            self.load_and_play(index);
        } else {
            self.load(index);
        }
    }

    /// Seek to `fraction` of the current track. Returns the requested time in seconds.
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Option<f64> {
        self.progress
            .on_user_seek(fraction, self.state.duration, &mut self.engine)
    }

    /// Scrub relative to the last reported position.
    pub fn seek_by(&mut self, delta_seconds: f64) {
        let Some(duration) = self.state.duration else {
            return;
        };
        let target = (self.state.current_time + delta_seconds).clamp(0.0, duration);
        self.engine.seek(target);
    }

    /// Set the volume, clamped to `[0, 1]`. Returns the applied value.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = clamp_volume(volume);
        self.state.volume = volume;
        self.engine.set_volume(volume);
        volume
    }

    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.set_volume(self.state.volume + delta)
    }

    /// Apply one engine event. Events from an earlier load are dropped.
    /// Returns whether the event was applied.
    pub fn handle_event(&mut self, event: EngineEvent) -> bool {
        if event.generation() != self.generation {
            tracing::trace!(?event, current = self.generation, "stale engine event");
            return false;
        }

        match event {
            EngineEvent::TimeUpdate {
                current, duration, ..
            } => {
                self.consecutive_failures = 0;
                let duration = duration.filter(|d| d.is_finite() && *d >= 0.0);
                let current = if current.is_finite() { current.max(0.0) } else { 0.0 };
                self.state.duration = duration;
                self.state.current_time = match duration {
                    Some(d) => current.min(d),
                    None => current,
                };
                self.progress
                    .on_time_update(self.state.current_time, self.state.duration);
            }
            EngineEvent::Ended {
                cause: EndCause::Finished,
                ..
            } => {
                self.consecutive_failures = 0;
                self.advance();
            }
            EngineEvent::Ended {
                cause: EndCause::Unavailable(reason),
                ..
            } => self.skip_unavailable(&reason),
        }
        true
    }
}
