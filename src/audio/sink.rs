//! Utilities for creating `rodio` sinks from local audio files.
//!
//! The helper here encapsulates opening/decoding a file, wrapping it with the
//! signal tap and preparing a paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{PlayerError, Result};

use super::tap::{SignalTap, TappedSource};

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the duration the decoder reports, which many formats leave unknown.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    tap: &Arc<OnceLock<SignalTap>>,
) -> Result<(Sink, Option<Duration>)> {
    let file = File::open(path).map_err(|e| PlayerError::unavailable(path.display(), e))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::unavailable(path.display(), e))?;
    let total = decoder.total_duration();

    // `skip_duration` is the fallback seeking primitive; even Duration::ZERO is fine.
    let source = TappedSource::new(decoder.skip_duration(start_at), tap.clone());

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

/// Read the duration from the file's metadata when the decoder cannot tell.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
