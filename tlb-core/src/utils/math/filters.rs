//! Input shaping filters for operator commands.
//!
//! - [`deadband`] zeroes analog noise around the stick's rest position.
//! - [`SlewRateLimiter`] bounds how fast a command may change between ticks.
//!
//! # Example
//! ```rust
//! use tlb_core::utils::math::filters::{deadband, SlewRateLimiter};
//! let mut limiter = SlewRateLimiter::new(6.0, 0.02);
//! let out = limiter.calculate(deadband(0.9, 0.1));
//! assert!((out - 0.12).abs() < 1e-6);
//! ```
use libm;

/// Suppress values whose magnitude is below `threshold`.
///
/// Returns `0.0` when `|input| < threshold`, otherwise `input` unchanged.
pub fn deadband(
    input: f32,
    threshold: f32,
) -> f32 {
    if libm::fabsf(input) < threshold {
        0.0
    } else {
        input
    }
}

/// Limits the first derivative of a signal sampled at a fixed period.
///
/// Each call to [`calculate`](Self::calculate) moves the output toward the
/// input by at most `rate * period` units.
#[derive(Debug, Clone, Copy)]
pub struct SlewRateLimiter {
    /// Maximum change per tick (units).
    max_step: f32,
    prev: f32,
}

impl SlewRateLimiter {
    /// Create a limiter allowing `rate` units/second at a tick `period` in seconds.
    pub fn new(
        rate: f32,
        period: f32,
    ) -> Self {
        Self {
            max_step: libm::fabsf(rate * period),
            prev: 0.0,
        }
    }

    /// Advance one tick toward `input` and return the limited output.
    pub fn calculate(
        &mut self,
        input: f32,
    ) -> f32 {
        let step = (input - self.prev).clamp(-self.max_step, self.max_step);
        self.prev += step;
        self.prev
    }

    /// Set the current output without rate limiting.
    pub fn reset(
        &mut self,
        value: f32,
    ) {
        self.prev = value;
    }

    pub fn last(&self) -> f32 {
        self.prev
    }

    pub fn max_step(&self) -> f32 {
        self.max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadband_below_threshold() {
        for x in [0.0, 0.05, -0.05, 0.099, -0.099] {
            assert_eq!(deadband(x, 0.1), 0.0, "input {}", x);
        }
    }

    #[test]
    fn test_deadband_passes_through() {
        for x in [0.1, -0.1, 0.5, -1.0, 1.0] {
            assert_eq!(deadband(x, 0.1), x, "input {}", x);
        }
    }

    #[test]
    fn test_limiter_max_step() {
        assert!(libm::fabsf(SlewRateLimiter::new(6.0, 0.02).max_step() - 0.12) < 1e-6);
        // Negative rates limit by magnitude
        assert!(libm::fabsf(SlewRateLimiter::new(-6.0, 0.02).max_step() - 0.12) < 1e-6);
    }

    #[test]
    fn test_limiter_step_is_bounded() {
        let mut limiter = SlewRateLimiter::new(6.0, 0.02);
        let inputs = [1.0, 1.0, -1.0, 0.3, 0.0, -0.8, 0.8, 0.81, 0.0, 1.0];
        let mut prev = 0.0;
        for &x in inputs.iter() {
            let out = limiter.calculate(x);
            assert!(libm::fabsf(out - prev) <= 0.12 + 1e-6);
            prev = out;
        }
    }

    #[test]
    fn test_limiter_reaches_target() {
        let mut limiter = SlewRateLimiter::new(6.0, 0.02);
        let mut out = 0.0;
        for _ in 0..10 {
            out = limiter.calculate(0.8);
        }
        assert!(libm::fabsf(out - 0.8) < 1e-6);
    }

    #[test]
    fn test_limiter_reset() {
        let mut limiter = SlewRateLimiter::new(6.0, 0.02);
        limiter.calculate(1.0);
        limiter.reset(0.0);
        assert_eq!(limiter.last(), 0.0);
        assert!(libm::fabsf(limiter.calculate(-1.0) + 0.12) < 1e-6);
    }
}
