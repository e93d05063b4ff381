//! Tween primitives shared by the sheet and the tab pager
//!
//! Time is always passed in explicitly as an [`Instant`], so the controllers
//! stay deterministic under test and the UI loop decides what "now" is.

use std::time::{Duration, Instant};

/// Easing curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Cubic ease-in-out (slow start, slow end)
    #[default]
    EaseInOut,
    /// Cubic ease-out (fast start, slow end)
    EaseOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A time-bounded interpolation from one value to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    started_at: Instant,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    /// Create a tween starting at `started_at`
    pub const fn new(
        from: f32,
        to: f32,
        started_at: Instant,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Eased value at `now`
    pub fn value_at(&self, now: Instant) -> f32 {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(p)
    }

    /// Whether the full duration has elapsed
    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    /// Target value
    pub const fn target(&self) -> f32 {
        self.to
    }
}

/// Outcome of advancing an [`AnimatedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No tween attached
    Idle,
    /// Tween still in flight
    Running,
    /// Tween reached its target during this advance
    Settled,
}

/// A value that is either at rest or driven by one tween
///
/// Retargeting replaces the tween in flight; there is no queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedValue {
    value: f32,
    tween: Option<Tween>,
}

impl AnimatedValue {
    /// Value at rest
    pub const fn new(value: f32) -> Self {
        Self { value, tween: None }
    }

    /// Last sampled value
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Whether a tween is attached
    pub const fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Where the value is heading (or sits, when idle)
    pub fn target(&self) -> f32 {
        self.tween.map_or(self.value, |t| t.target())
    }

    /// Jump to `value`, cancelling any tween
    pub const fn set(&mut self, value: f32) {
        self.value = value;
        self.tween = None;
    }

    /// Start tweening from the current value to `target`
    pub fn animate_to(&mut self, target: f32, now: Instant, duration: Duration, easing: Easing) {
        self.tween = Some(Tween::new(self.value, target, now, duration, easing));
    }

    /// Sample the tween at `now`
    pub fn advance(&mut self, now: Instant) -> Advance {
        let Some(tween) = self.tween else {
            return Advance::Idle;
        };
        self.value = tween.value_at(now);
        if tween.is_finished(now) {
            self.value = tween.target();
            self.tween = None;
            Advance::Settled
        } else {
            Advance::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_200: Duration = Duration::from_millis(200);

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseInOut, Easing::EaseOut] {
            assert!(easing.apply(0.0).abs() < f32::EPSILON);
            assert!((easing.apply(1.0) - 1.0).abs() < f32::EPSILON);
        }
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tween_midpoint_and_end() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 100.0, start, MS_200, Easing::Linear);
        assert!((tween.value_at(start + Duration::from_millis(100)) - 50.0).abs() < 1e-3);
        assert!(!tween.is_finished(start + Duration::from_millis(199)));
        assert!((tween.value_at(start + MS_200) - 100.0).abs() < f32::EPSILON);
        assert!(tween.is_finished(start + MS_200));
    }

    #[test]
    fn test_zero_duration_is_immediate() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(10.0);
        value.animate_to(0.0, start, Duration::ZERO, Easing::EaseInOut);
        assert_eq!(value.advance(start), Advance::Settled);
        assert!(value.value().abs() < f32::EPSILON);
    }

    #[test]
    fn test_retarget_starts_from_current_value() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(0.0);
        value.animate_to(100.0, start, MS_200, Easing::Linear);
        let mid = start + Duration::from_millis(100);
        assert_eq!(value.advance(mid), Advance::Running);

        value.animate_to(0.0, mid, MS_200, Easing::Linear);
        assert!((value.target()).abs() < f32::EPSILON);
        value.advance(mid + Duration::from_millis(100));
        assert!((value.value() - 25.0).abs() < 1e-3);
        assert_eq!(value.advance(mid + MS_200), Advance::Settled);
        assert_eq!(value.advance(mid + MS_200), Advance::Idle);
    }

    #[test]
    fn test_set_cancels_tween() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(0.0);
        value.animate_to(100.0, start, MS_200, Easing::Linear);
        value.set(42.0);
        assert!(!value.is_animating());
        assert_eq!(value.advance(start + MS_200), Advance::Idle);
        assert!((value.value() - 42.0).abs() < f32::EPSILON);
    }
}
