//! In-memory engine that records every call, for tests.

use crate::catalog::TrackDescriptor;
use crate::error::{PlayerError, Result};

use super::engine::Engine;
use super::tap::SignalTap;
use super::types::clamp_volume;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

#[derive(Default)]
pub struct FakeEngine {
    pub calls: Vec<Call>,
    pub generation: u64,
    pub deny_tap: bool,
    pub tap_requests: usize,
    pub(crate) tap: Option<SignalTap>,
}

impl FakeEngine {
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Engine for FakeEngine {
    fn load(&mut self, track: &TrackDescriptor) -> u64 {
        self.generation += 1;
        self.calls.push(Call::Load(track.title.clone()));
        self.generation
    }

    fn play(&mut self) {
        self.calls.push(Call::Play);
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.calls.push(Call::Seek(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::SetVolume(clamp_volume(volume)));
    }

    fn signal_tap(&mut self) -> Result<SignalTap> {
        self.tap_requests += 1;
        if self.deny_tap {
            return Err(PlayerError::AnalysisUnavailable("denied".to_string()));
        }
        Ok(self.tap.get_or_insert_with(SignalTap::new).clone())
    }
}
