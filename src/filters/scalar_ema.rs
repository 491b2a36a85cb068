//! Exponential moving average for derived scalar signals.

/// Trivial single-channel EMA smoother
#[derive(Debug, Clone)]
pub struct ScalarEma {
    alpha: f64,
    last: Option<f64>,
}

impl ScalarEma {
    /// Create a new smoother
    ///
    /// # Panics
    ///
    /// Panics if alpha is not in the range (0, 1]
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self { alpha, last: None }
    }

    /// Smooth one sample; the first call seeds state
    pub fn update(&mut self, value: f64) -> f64 {
        let smoothed = match self.last {
            Some(last) => self.alpha * value + (1.0 - self.alpha) * last,
            None => value,
        };
        self.last = Some(smoothed);
        smoothed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_and_smooth() {
        let mut ema = ScalarEma::new(0.5);
        assert_eq!(ema.update(10.0), 10.0);
        assert_eq!(ema.update(20.0), 15.0);
    }

    #[test]
    #[should_panic(expected = "Alpha must be in (0, 1]")]
    fn test_zero_alpha_rejected() {
        let _ = ScalarEma::new(0.0);
    }

    #[test]
    fn test_reset() {
        let mut ema = ScalarEma::new(0.3);
        ema.update(5.0);
        ema.reset();
        assert_eq!(ema.update(9.0), 9.0);
    }
}
