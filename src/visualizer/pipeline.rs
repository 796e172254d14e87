use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::audio::Engine;
use crate::config::VisualizerSettings;
use crate::error::{PlayerError, Result};

use super::analyser::{SpectrumAnalyser, SpectrumFrame};
use super::surface::{DrawSurface, Fill, FrameBuffer, Gradient, Rect, Rgb};
use super::task::RepeatingTask;

pub const BACKGROUND: Rgb = Rgb(18, 18, 18);
pub const BAR_GRADIENT: Gradient = Gradient {
    bottom: Rgb::hex(0x1db954),
    top: Rgb::hex(0x1ed760),
};
/// Bars are wider than `width / bins`; the tail runs past the right edge.
const BAR_SPREAD: f64 = 2.5;
const BAR_GAP: f64 = 1.0;

/// Draw one frame of bars onto `surface`.
pub fn render_frame(frame: &SpectrumFrame, surface: &mut impl DrawSurface) {
    let (width, height) = surface.size();
    surface.clear(BACKGROUND);
    if frame.bins.is_empty() {
        return;
    }

    let bar_width = width / frame.bins.len() as f64 * BAR_SPREAD;
    let mut x = 0.0;
    for &magnitude in &frame.bins {
        let bar_height = f64::from(magnitude) / 255.0 * height;
        surface.fill_rect(
            Rect {
                x,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
            },
            Fill::Vertical(BAR_GRADIENT),
        );
        x += bar_width + BAR_GAP;
    }
}

/// Taps the engine's signal and keeps a [`FrameBuffer`] updated at the
/// configured frame rate.
///
/// Nothing happens until [`VisualizationPipeline::initialize`] runs; only the
/// first call does any work, whatever its outcome.
pub struct VisualizationPipeline {
    settings: VisualizerSettings,
    initialized: AtomicBool,
    surface: Arc<Mutex<FrameBuffer>>,
    task: Mutex<Option<RepeatingTask>>,
}

impl VisualizationPipeline {
    pub fn new(settings: VisualizerSettings, width: f64, height: f64) -> Self {
        Self {
            settings,
            initialized: AtomicBool::new(false),
            surface: Arc::new(Mutex::new(FrameBuffer::new(width, height))),
            task: Mutex::new(None),
        }
    }

    /// Build the analysis graph and start the render task.
    ///
    /// Returns `Ok(true)` when this call started it and `Ok(false)` when an
    /// earlier call already ran.
    pub fn initialize<E: Engine>(&self, engine: &mut E) -> Result<bool> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }

        if !self.settings.enabled {
            return Err(PlayerError::AnalysisUnavailable(
                "disabled in configuration".to_string(),
            ));
        }

        let tap = engine.signal_tap()?;
        let mut analyser = SpectrumAnalyser::new(&self.settings);
        let surface = self.surface.clone();
        let period = Duration::from_secs(1) / self.settings.frame_rate.max(1);

        let task = RepeatingTask::spawn("allegro-visualizer", period, move || {
            let frame = analyser.capture(&tap);
            if let Ok(mut surface) = surface.lock() {
                render_frame(&frame, &mut *surface);
            }
        })
        .map_err(|e| PlayerError::AnalysisUnavailable(format!("render thread: {e}")))?;

        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(task);
        }
        tracing::info!(frame_rate = self.settings.frame_rate, "visualizer started");
        Ok(true)
    }

    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .map(|t| t.as_ref().is_some_and(RepeatingTask::is_running))
            .unwrap_or(false)
    }

    /// Lock the frame buffer for reading. The render task waits meanwhile.
    pub fn surface(&self) -> Option<MutexGuard<'_, FrameBuffer>> {
        self.surface.lock().ok()
    }

    pub fn resize(&self, width: f64, height: f64) {
        if let Ok(mut surface) = self.surface.lock() {
            surface.resize(width, height);
        }
    }

    /// Cancel the render task. The pipeline stays initialized.
    pub fn teardown(&self) {
        let task = self.task.lock().ok().and_then(|mut t| t.take());
        if let Some(mut task) = task {
            task.cancel();
            tracing::debug!("visualizer stopped");
        }
    }
}

impl Drop for VisualizationPipeline {
    fn drop(&mut self) {
        self.teardown();
    }
}
