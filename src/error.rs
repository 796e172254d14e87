//! Error type shared by the player core.

/// Result alias that carries [`PlayerError`].
pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// A track selection outside `[0, len)`. State is left untouched.
    #[error("track {index} is out of range (playlist has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    /// An audio or cover resource could not be opened or decoded.
    #[error("{locator} is unavailable: {reason}")]
    ResourceUnavailable { locator: String, reason: String },

    /// The signal tap / analysis graph could not be constructed.
    #[error("audio analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("playlist entry #{position} is invalid: {reason}")]
    InvalidTrack { position: usize, reason: String },

    #[error("no playable tracks were found")]
    EmptyCatalog,

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    pub fn unavailable(locator: impl ToString, reason: impl ToString) -> Self {
        Self::ResourceUnavailable {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }
}
