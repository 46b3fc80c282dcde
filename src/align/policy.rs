//! Skew-to-delay mapping strategies
//!
//! The engine maps the clock skew between the two streams to a delay in
//! samples through an injectable policy. Implementations must be
//! monotonic: a larger skew never yields a smaller delay.

/// Maps clock skew (timestamp units) to a delay in samples
pub trait DelayPolicy: Send {
    fn delay(&self, skew: u32) -> usize;
}

/// Default policy: `delay = skew / sample_period`
///
/// Assumes both streams sample at the same fixed period, expressed in
/// the shared timestamp unit.
pub struct LinearDelay {
    sample_period: u32,
}

impl LinearDelay {
    /// # Panics
    /// Panics if `sample_period` is 0.
    pub fn new(sample_period: u32) -> Self {
        assert!(sample_period > 0, "sample period must be non-zero");
        LinearDelay { sample_period }
    }
}

impl DelayPolicy for LinearDelay {
    fn delay(&self, skew: u32) -> usize {
        (skew / self.sample_period) as usize
    }
}

/// Constant delay regardless of skew
///
/// Useful when the shared sample period is unknown and a conservative
/// fixed lag is acceptable.
pub struct FixedDelay(pub usize);

impl DelayPolicy for FixedDelay {
    fn delay(&self, _skew: u32) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_delay() {
        let p = LinearDelay::new(1);
        assert_eq!(p.delay(0), 0);
        assert_eq!(p.delay(30), 30);

        let p = LinearDelay::new(4);
        assert_eq!(p.delay(3), 0);
        assert_eq!(p.delay(4), 1);
        assert_eq!(p.delay(30), 7);
    }

    #[test]
    fn test_linear_delay_monotonic() {
        let p = LinearDelay::new(3);
        let mut last = 0;
        for skew in 0..100 {
            let d = p.delay(skew);
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_fixed_delay() {
        let p = FixedDelay(4);
        assert_eq!(p.delay(0), 4);
        assert_eq!(p.delay(1_000_000), 4);
    }
}
