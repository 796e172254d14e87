//! Audio subsystem: the playback engine.
//!
//! [`Engine`] is the seam the transport controller drives. [`AudioEngine`]
//! implements it on top of a dedicated `rodio` thread that decodes the
//! current track, pushes time/ended events and feeds the [`SignalTap`].

mod engine;
mod sink;
mod tap;
mod thread;
mod types;

#[cfg(test)]
pub mod fake;

pub use engine::{AudioEngine, Engine};
pub use tap::SignalTap;
pub use types::*;
