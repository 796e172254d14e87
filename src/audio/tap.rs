//! Signal tap: a side channel exposing the most recent audio samples.
//!
//! Decoded sources are wrapped in [`TappedSource`], which copies a mono
//! downmix of every frame into a fixed ring of atomics once the tap exists.
//! Readers take a snapshot without locking; a snapshot may be torn or a frame
//! stale, which the spectrum view tolerates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use atomic_float::AtomicF32;
use rodio::Source;

/// Number of mono samples retained by the tap.
pub const TAP_CAPACITY: usize = 2048;

struct SampleRing {
    samples: Box<[AtomicF32]>,
    written: AtomicUsize,
}

#[derive(Clone)]
pub struct SignalTap {
    ring: Arc<SampleRing>,
}

impl Default for SignalTap {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalTap {
    pub fn new() -> Self {
        let samples = (0..TAP_CAPACITY).map(|_| AtomicF32::new(0.0)).collect();
        Self {
            ring: Arc::new(SampleRing {
                samples,
                written: AtomicUsize::new(0),
            }),
        }
    }

    pub fn push(&self, sample: f32) {
        let pos = self.ring.written.fetch_add(1, Ordering::AcqRel);
        self.ring.samples[pos % TAP_CAPACITY].store(sample, Ordering::Relaxed);
    }

    /// Fill `out` with the most recent samples, oldest first. Slots that were
    /// never written are zero.
    pub fn snapshot(&self, out: &mut [f32]) {
        let written = self.ring.written.load(Ordering::Acquire);
        let wanted = out.len().min(TAP_CAPACITY);
        let available = written.min(wanted);
        let silent = out.len() - available;

        out[..silent].fill(0.0);
        let first = written - available;
        for (i, slot) in out[silent..].iter_mut().enumerate() {
            *slot = self.ring.samples[(first + i) % TAP_CAPACITY].load(Ordering::Relaxed);
        }
    }
}

/// Averages interleaved channel samples into one mono sample per frame.
#[derive(Debug, Default)]
pub(super) struct Downmix {
    sum: f32,
    count: u16,
}

impl Downmix {
    pub(super) fn push(&mut self, sample: f32, channels: u16) -> Option<f32> {
        self.sum += sample;
        self.count += 1;
        if self.count < channels.max(1) {
            return None;
        }
        let mono = self.sum / f32::from(self.count);
        self.sum = 0.0;
        self.count = 0;
        Some(mono)
    }
}

/// Pass-through source that feeds the signal tap, if one was initialized.
pub(super) struct TappedSource<S> {
    inner: S,
    tap: Arc<OnceLock<SignalTap>>,
    downmix: Downmix,
}

impl<S> TappedSource<S>
where
    S: Source<Item = f32>,
{
    pub(super) fn new(inner: S, tap: Arc<OnceLock<SignalTap>>) -> Self {
        Self {
            inner,
            tap,
            downmix: Downmix::default(),
        }
    }
}

impl<S> Iterator for TappedSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        if let Some(tap) = self.tap.get() {
            if let Some(mono) = self.downmix.push(sample, self.inner.channels()) {
                tap.push(mono);
            }
        }
        Some(sample)
    }
}

impl<S> Source for TappedSource<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.downmix = Downmix::default();
        self.inner.try_seek(pos)
    }
}
