//! Transport state types: `TransportState` and `PlaybackState`.

/// Where the transport state machine currently is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The player's state, owned by the transport controller.
///
/// `current_index` always points into the catalog, and `current_time` never
/// exceeds a known `duration`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub transport: TransportState,
    pub current_time: f64,
    /// Unknown until the engine reports the track length.
    pub duration: Option<f64>,
    pub volume: f32,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_index: 0,
            transport: TransportState::Stopped,
            current_time: 0.0,
            duration: None,
            volume,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport == TransportState::Playing
    }
}
