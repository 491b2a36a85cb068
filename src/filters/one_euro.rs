//! One-euro style adaptive low-pass filter.
//!
//! Cutoff frequency adapts to the estimated signal velocity: slow motion is
//! smoothed heavily, fast motion passes through with minimal lag.

use std::f64::consts::PI;

/// Partial parameter update for [`OneEuroFilter::configure`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OneEuroParams {
    pub min_cutoff: Option<f64>,
    pub beta: Option<f64>,
    pub derivative_cutoff: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct FilterState {
    value: f64,
    derivative: f64,
    timestamp: f64,
}

/// Single-channel adaptive smoothing filter
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    derivative_cutoff: f64,
    state: Option<FilterState>,
}

impl OneEuroFilter {
    /// Create a new filter
    ///
    /// # Panics
    ///
    /// Panics if `min_cutoff` or `derivative_cutoff` is not positive
    #[must_use]
    pub fn new(min_cutoff: f64, beta: f64, derivative_cutoff: f64) -> Self {
        assert!(min_cutoff > 0.0, "Minimum cutoff must be positive");
        assert!(derivative_cutoff > 0.0, "Derivative cutoff must be positive");
        Self {
            min_cutoff,
            beta,
            derivative_cutoff,
            state: None,
        }
    }

    /// Smoothing factor from the low-pass time-constant relation
    fn smoothing_factor(dt: f64, cutoff: f64) -> f64 {
        1.0 / (1.0 + (1.0 / (2.0 * PI * cutoff)) / dt)
    }

    /// Filter one sample. The first call seeds state and returns the input
    /// unchanged; a non-increasing timestamp returns the last output.
    pub fn update(&mut self, value: f64, timestamp: f64) -> f64 {
        let Some(state) = self.state else {
            self.state = Some(FilterState {
                value,
                derivative: 0.0,
                timestamp,
            });
            return value;
        };

        let dt = timestamp - state.timestamp;
        if dt <= 0.0 {
            return state.value;
        }

        let a_d = Self::smoothing_factor(dt, self.derivative_cutoff);
        let dx = (value - state.value) / dt;
        let dx_hat = a_d * dx + (1.0 - a_d) * state.derivative;

        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        let a = Self::smoothing_factor(dt, cutoff);
        let x_hat = a * value + (1.0 - a) * state.value;

        self.state = Some(FilterState {
            value: x_hat,
            derivative: dx_hat,
            timestamp,
        });

        x_hat
    }

    /// Clear all running state
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Merge a partial parameter update without resetting state
    pub fn configure(&mut self, params: &OneEuroParams) {
        if let Some(min_cutoff) = params.min_cutoff {
            self.min_cutoff = min_cutoff;
        }
        if let Some(beta) = params.beta {
            self.beta = beta;
        }
        if let Some(derivative_cutoff) = params.derivative_cutoff {
            self.derivative_cutoff = derivative_cutoff;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_identity() {
        let mut filter = OneEuroFilter::new(1.0, 0.2, 1.0);
        assert_eq!(filter.update(0.42, 0.0), 0.42);
    }

    #[test]
    fn test_non_monotonic_timestamp_returns_last() {
        let mut filter = OneEuroFilter::new(1.0, 0.2, 1.0);
        filter.update(1.0, 0.0);
        let second = filter.update(2.0, 0.016);
        // Same timestamp, then an earlier one: both return the stored value
        assert_eq!(filter.update(5.0, 0.016), second);
        assert_eq!(filter.update(5.0, 0.010), second);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let mut filter = OneEuroFilter::new(1.0, 0.0, 1.0);
        let mut out = 0.0;
        for i in 0..200 {
            out = filter.update(3.0, f64::from(i) / 60.0);
        }
        assert!((out - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_fast_motion_less_smoothed() {
        // With a large beta, a step passes through more completely
        let mut slow = OneEuroFilter::new(0.5, 0.0, 1.0);
        let mut fast = OneEuroFilter::new(0.5, 50.0, 1.0);
        slow.update(0.0, 0.0);
        fast.update(0.0, 0.0);
        let s = slow.update(1.0, 1.0 / 60.0);
        let f = fast.update(1.0, 1.0 / 60.0);
        assert!(f > s);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = OneEuroFilter::new(1.0, 0.2, 1.0);
        filter.update(1.0, 0.0);
        filter.update(2.0, 0.016);
        filter.reset();
        assert_eq!(filter.update(7.0, 0.0), 7.0);
    }

    #[test]
    fn test_configure_keeps_state() {
        let mut filter = OneEuroFilter::new(1.0, 0.2, 1.0);
        filter.update(1.0, 0.0);
        filter.configure(&OneEuroParams {
            beta: Some(0.9),
            ..Default::default()
        });
        // State survives: the next sample is still smoothed against it
        let out = filter.update(2.0, 0.016);
        assert!(out > 1.0 && out < 2.0);
    }
}
