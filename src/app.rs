//! Application module: exposes the presentation model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the playlist cursor, the
//! follow-playback flag and the status line.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
