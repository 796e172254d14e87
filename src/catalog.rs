//! Track catalog: the immutable playlist every other module indexes into.
//!
//! Tracks come either from the `[[playlist.tracks]]` config entries or from
//! scanning a directory of audio files.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;
