use crate::error::{CsrfError, Result};
use chrono::Duration;

/// Acceptance interval for a token, relative to the verifier's clock.
///
/// A token stamped at `t` is accepted at server time `now` only when
/// `min < now - t < max`. Both bounds are exclusive: a delta exactly equal
/// to either bound is rejected.
///
/// A negative `min` tolerates verifiers whose clocks run behind the issuer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    min: Duration,
    max: Duration,
}

impl Window {
    /// Create a window; `min` must be strictly less than `max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min >= max {
            return Err(CsrfError::Config(format!(
                "Window lower bound ({}s) must be below upper bound ({}s)",
                min.num_seconds(),
                max.num_seconds()
            )));
        }
        Ok(Self { min, max })
    }

    /// Create a window from whole minutes.
    pub fn from_minutes(min: i64, max: i64) -> Result<Self> {
        let min = Duration::try_minutes(min)
            .ok_or_else(|| CsrfError::Config(format!("Window bound out of range: {}", min)))?;
        let max = Duration::try_minutes(max)
            .ok_or_else(|| CsrfError::Config(format!("Window bound out of range: {}", max)))?;
        Self::new(min, max)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Whether `delta` (server time minus token time) lies strictly inside.
    pub fn contains(&self, delta: Duration) -> bool {
        self.min < delta && delta < self.max
    }
}

impl Default for Window {
    /// Ninety minutes of clock skew, thirty-six hours of lifetime.
    fn default() -> Self {
        Self {
            min: Duration::minutes(-90),
            max: Duration::hours(36),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_exclusive() {
        let window = Window::default();
        assert!(!window.contains(Duration::minutes(-90)));
        assert!(!window.contains(Duration::hours(36)));
        assert!(window.contains(Duration::minutes(-89)));
        assert!(window.contains(Duration::zero()));
        assert!(window.contains(Duration::hours(36) - Duration::seconds(1)));
    }

    #[test]
    fn test_rejects_inverted_or_empty_window() {
        assert!(Window::new(Duration::minutes(5), Duration::minutes(5)).is_err());
        assert!(Window::new(Duration::minutes(5), Duration::minutes(-5)).is_err());
        assert!(Window::from_minutes(-1, 1).is_ok());
    }

    #[test]
    fn test_from_minutes_overflow() {
        assert!(Window::from_minutes(i64::MIN, 0).is_err());
        assert!(Window::from_minutes(0, i64::MAX).is_err());
    }

    #[test]
    fn test_accessors() {
        let window = Window::from_minutes(-10, 60).unwrap();
        assert_eq!(window.min(), Duration::minutes(-10));
        assert_eq!(window.max(), Duration::hours(1));
    }
}
