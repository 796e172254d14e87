//! Transport: the playback state machine.
//!
//! `TransportController` owns the `PlaybackState` and is the only place it
//! changes: user commands (select/play/pause/next/previous/seek/volume) and
//! engine events (time updates, end of track) both go through it.

mod controller;
mod model;

pub use controller::TransportController;
pub use model::*;
