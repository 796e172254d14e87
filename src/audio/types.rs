//! Audio-related small types.
//!
//! Commands sent to the audio thread, the events it pushes back to its
//! subscriber, and the clamping rules shared by every engine.

use crate::catalog::TrackDescriptor;

#[derive(Debug)]
pub enum EngineCmd {
    /// Stop whatever is playing and bind to `track`. Leaves the new track paused.
    Load { generation: u64, track: TrackDescriptor },
    /// Resume or start playback of the loaded track.
    Play,
    /// Pause, keeping the position.
    Pause,
    /// Jump to an absolute position in seconds.
    Seek(f64),
    /// Set the output volume, already clamped to `[0, 1]`.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Why a loaded track stopped producing audio.
#[derive(Debug, Clone, PartialEq)]
pub enum EndCause {
    /// Playback reached the end of the resource.
    Finished,
    /// The resource could not be opened or decoded.
    Unavailable(String),
}

/// Events pushed by an engine. Every event names the load generation it belongs to
/// so that late events from a replaced track can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TimeUpdate {
        generation: u64,
        current: f64,
        duration: Option<f64>,
    },
    Ended {
        generation: u64,
        cause: EndCause,
    },
}

impl EngineEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::TimeUpdate { generation, .. } | Self::Ended { generation, .. } => *generation,
        }
    }
}

/// Clamp a requested volume into `[0, 1]`. NaN counts as silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Clamp a seek target into `[0, duration]`. Seeking is impossible while the
/// duration is unknown.
pub fn clamp_seek(target: f64, duration: Option<f64>) -> Option<f64> {
    let duration = duration.filter(|d| d.is_finite() && *d >= 0.0)?;
    if target.is_nan() {
        return Some(0.0);
    }
    Some(target.clamp(0.0, duration))
}
