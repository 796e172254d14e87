//! Playback progress: turns engine time updates into a fill percentage and
//! `M:SS` labels, and turns seek-bar clicks into absolute seek targets.

use crate::audio::Engine;

/// What the progress bar shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// Fill in `[0, 100]`.
    pub percent: f64,
    pub elapsed: String,
    pub total: String,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self {
            percent: 0.0,
            elapsed: format_time(0.0),
            total: format_time(0.0),
        }
    }
}

/// Format seconds as `M:SS`. Negative and non-finite inputs read as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let min = (seconds / 60.0).floor() as u64;
    let sec = (seconds % 60.0).floor() as u64;
    format!("{min}:{sec:02}")
}

/// `current / duration * 100`, clamped to `[0, 100]`; 0 when the duration is 0 or unknown.
pub fn percent(current: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d > 0.0 && d.is_finite() && current.is_finite() => {
            (current / d * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Convert a click `offset` inside a bar of `width` into a fraction in `[0, 1]`.
pub fn fraction_from_offset(offset: f64, width: f64) -> f64 {
    if width <= 0.0 || !width.is_finite() || !offset.is_finite() {
        return 0.0;
    }
    (offset / width).clamp(0.0, 1.0)
}

/// Holds only the last computed view; there are no timers in here.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    view: ProgressView,
}

impl ProgressTracker {
    pub fn view(&self) -> &ProgressView {
        &self.view
    }

    pub fn on_time_update(&mut self, current: f64, duration: Option<f64>) -> &ProgressView {
        self.view = ProgressView {
            percent: percent(current, duration),
            elapsed: format_time(current),
            total: format_time(duration.unwrap_or(0.0)),
        };
        &self.view
    }

    /// Seek to `fraction` of the track. Returns the requested absolute time, or
    /// `None` (and does nothing) while the duration is unknown.
    pub fn on_user_seek<E: Engine>(
        &self,
        fraction: f64,
        duration: Option<f64>,
        engine: &mut E,
    ) -> Option<f64> {
        let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let target = fraction * duration;
        engine.seek(target);
        Some(target)
    }

    pub fn reset(&mut self) {
        self.view = ProgressView::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::{Call, FakeEngine};

    #[test]
    fn format_time_matches_expected_literals() {
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(-4.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn percent_stays_in_range() {
        for duration in [0.5, 1.0, 37.0, 200.0, 3600.0] {
            for current in [-10.0, 0.0, 0.25, 18.0, 200.0, 5000.0] {
                let p = percent(current, Some(duration));
                assert!((0.0..=100.0).contains(&p), "{current}/{duration} -> {p}");
            }
        }
        assert_eq!(percent(50.0, Some(200.0)), 25.0);
    }

    #[test]
    fn percent_is_zero_without_a_usable_duration() {
        assert_eq!(percent(12.0, Some(0.0)), 0.0);
        assert_eq!(percent(12.0, None), 0.0);
        assert_eq!(percent(12.0, Some(f64::NAN)), 0.0);
    }

    #[test]
    fn time_update_produces_view_and_reset_clears_it() {
        let mut tracker = ProgressTracker::default();
        let view = tracker.on_time_update(65.0, Some(130.0)).clone();
        assert_eq!(view.percent, 50.0);
        assert_eq!(view.elapsed, "1:05");
        assert_eq!(view.total, "2:10");

        let unknown = tracker.on_time_update(3.0, None).clone();
        assert_eq!(unknown.percent, 0.0);
        assert_eq!(unknown.total, "0:00");

        tracker.reset();
        assert_eq!(tracker.view(), &ProgressView::default());
    }

    #[test]
    fn user_seek_half_way_on_200s_requests_100s() {
        let tracker = ProgressTracker::default();
        let mut engine = FakeEngine::default();
        assert_eq!(tracker.on_user_seek(0.5, Some(200.0), &mut engine), Some(100.0));
        assert_eq!(engine.calls, vec![Call::Seek(100.0)]);
    }

    #[test]
    fn user_seek_is_noop_with_unknown_duration() {
        let tracker = ProgressTracker::default();
        let mut engine = FakeEngine::default();
        assert_eq!(tracker.on_user_seek(0.5, None, &mut engine), None);
        assert_eq!(tracker.on_user_seek(0.5, Some(0.0), &mut engine), None);
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn user_seek_clamps_fraction() {
        let tracker = ProgressTracker::default();
        let mut engine = FakeEngine::default();
        assert_eq!(tracker.on_user_seek(1.7, Some(80.0), &mut engine), Some(80.0));
        assert_eq!(tracker.on_user_seek(-0.2, Some(80.0), &mut engine), Some(0.0));
    }

    #[test]
    fn fraction_from_offset_handles_zero_width() {
        assert_eq!(fraction_from_offset(30.0, 120.0), 0.25);
        assert_eq!(fraction_from_offset(500.0, 120.0), 1.0);
        assert_eq!(fraction_from_offset(-1.0, 120.0), 0.0);
        assert_eq!(fraction_from_offset(30.0, 0.0), 0.0);
    }
}
