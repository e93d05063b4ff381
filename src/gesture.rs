//! Gesture plumbing: viewport size, platform profile, pan arbitration and
//! release velocity

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Current viewport in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Width in logical pixels
    pub width: f32,
    /// Height in logical pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Target platform profile
///
/// Selects the defaults that differ between the two mobile targets: pan
/// activation thresholds and the sheet content swap delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS
    #[default]
    Ios,
    /// Android
    Android,
}

impl Platform {
    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ios => "iOS",
            Self::Android => "Android",
        }
    }

    /// Default delay before a sheet content swap is applied
    pub const fn content_swap_delay(self) -> Duration {
        match self {
            Self::Ios => Duration::ZERO,
            Self::Android => Duration::from_millis(200),
        }
    }

    /// Horizontal travel before a tab pan activates
    pub const fn pan_threshold(self) -> f32 {
        match self {
            Self::Ios => 10.0,
            Self::Android => 20.0,
        }
    }

    /// Vertical travel before a sheet drag activates
    pub const fn sheet_drag_threshold(self, interactive_scroll: bool) -> f32 {
        match (self, interactive_scroll) {
            (Self::Ios, false) => 5.0,
            (Self::Android, false) => 10.0,
            (Self::Ios, true) => 25.0,
            (Self::Android, true) => 35.0,
        }
    }
}

/// How a vertical sheet drag maps finger travel onto the sheet offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Raw tracking, clamped to `[0, screen_height]`
    Overlay,
    /// 1:1 downwards, half speed past fully open
    #[default]
    Resistive,
}

/// Dead zones for a horizontal pan inside a tab pager
///
/// Positive translation moves toward the previous tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanActivation {
    /// Travel needed before a rightward pan (toward the previous tab) activates
    pub toward_previous: f32,
    /// Travel needed before a leftward pan (toward the next tab) activates
    pub toward_next: f32,
}

impl PanActivation {
    /// Edge tabs widen the dead zone this many times over the platform default
    const EDGE_FACTOR: f32 = 4.0;

    /// Dead zones for a pager on `platform`
    pub fn for_tabs(platform: Platform, at_first_tab: bool) -> Self {
        let base = platform.pan_threshold();
        Self {
            toward_previous: if at_first_tab {
                base * Self::EDGE_FACTOR
            } else {
                base
            },
            toward_next: base,
        }
    }

    /// Whether a pan with this translation belongs to the horizontal pager
    ///
    /// Anything at least as vertical as it is horizontal is left to the
    /// enclosing vertical gesture.
    pub fn claims(&self, dx: f32, dy: f32) -> bool {
        if dx.abs() <= dy.abs() {
            return false;
        }
        if dx > 0.0 {
            dx > self.toward_previous
        } else {
            -dx > self.toward_next
        }
    }
}

/// Whether a vertical pan should be claimed by the sheet
pub fn claims_vertical(dx: f32, dy: f32, threshold: f32) -> bool {
    dy.abs() > dx.abs() && dy.abs() > threshold
}

/// Estimates release velocity from recent pan samples
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, f32)>,
}

impl VelocityTracker {
    const MAX_SAMPLES: usize = 8;
    const WINDOW: Duration = Duration::from_millis(100);

    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all samples
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Record the pan position at `at`
    pub fn push(&mut self, at: Instant, position: f32) {
        if self.samples.len() == Self::MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((at, position));
    }

    /// Velocity in units per second over the trailing window
    pub fn velocity(&self) -> f32 {
        let Some(&(last_at, last_pos)) = self.samples.back() else {
            return 0.0;
        };
        let Some(&(first_at, first_pos)) = self
            .samples
            .iter()
            .find(|(at, _)| last_at.saturating_duration_since(*at) <= Self::WINDOW)
        else {
            return 0.0;
        };
        let dt = last_at.saturating_duration_since(first_at).as_secs_f32();
        if dt <= f32::EPSILON {
            return 0.0;
        }
        (last_pos - first_pos) / dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tab_has_wider_previous_dead_zone() {
        let edge = PanActivation::for_tabs(Platform::Ios, true);
        let middle = PanActivation::for_tabs(Platform::Ios, false);
        assert!(edge.toward_previous > middle.toward_previous);
        assert!((edge.toward_next - middle.toward_next).abs() < f32::EPSILON);

        // A modest rightward swipe activates mid-group but not on the first tab
        assert!(middle.claims(20.0, 2.0));
        assert!(!edge.claims(20.0, 2.0));
        assert!(edge.claims(-20.0, 2.0));
    }

    #[test]
    fn test_vertical_pan_yields() {
        let activation = PanActivation::for_tabs(Platform::Android, false);
        assert!(!activation.claims(30.0, 40.0));
        assert!(claims_vertical(30.0, 40.0, Platform::Android.sheet_drag_threshold(false)));
        assert!(!claims_vertical(2.0, 8.0, Platform::Android.sheet_drag_threshold(false)));
    }

    #[test]
    fn test_interactive_scroll_raises_threshold() {
        for platform in [Platform::Ios, Platform::Android] {
            assert!(platform.sheet_drag_threshold(true) > platform.sheet_drag_threshold(false));
        }
    }

    #[test]
    fn test_velocity_over_window() {
        let start = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.push(start, 0.0);
        tracker.push(start + Duration::from_millis(50), 30.0);
        tracker.push(start + Duration::from_millis(100), 60.0);
        assert!((tracker.velocity() - 600.0).abs() < 1.0);

        tracker.reset();
        assert!(tracker.velocity().abs() < f32::EPSILON);
    }

    #[test]
    fn test_stale_samples_ignored() {
        let start = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.push(start, 0.0);
        tracker.push(start + Duration::from_millis(500), 10.0);
        tracker.push(start + Duration::from_millis(550), 20.0);
        assert!((tracker.velocity() - 200.0).abs() < 1.0);
    }
}
