//! Frequency-bar visualization.
//!
//! `SpectrumAnalyser` turns the engine's signal tap into 128 byte magnitudes,
//! `render_frame` draws them as bars onto a `DrawSurface`, and
//! `VisualizationPipeline` runs both on a `RepeatingTask` once initialized.

mod analyser;
mod pipeline;
mod surface;
mod task;

pub use pipeline::VisualizationPipeline;
pub use surface::{Fill, FrameBuffer, Rgb};

#[cfg(test)]
pub use pipeline::{BACKGROUND, BAR_GRADIENT};
#[cfg(test)]
pub use surface::{DrawSurface, Rect};
