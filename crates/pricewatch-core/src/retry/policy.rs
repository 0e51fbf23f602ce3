//! Exponential backoff with a cap and jitter.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How jitter is applied to the deterministic exponential curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterMode {
    /// Additive sub-second jitter: `min(exp + uniform(0, 1), max_backoff)`.
    #[default]
    Random,
    /// Full jitter: `uniform(0, exp)`. Decorrelates thundering-herd retries.
    Full,
}

/// Immutable backoff parameters, fixed for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Exponential growth factor (>= 1).
    pub factor: f64,
    /// Upper bound on any delay.
    pub max_backoff: Duration,
    /// Jitter strategy.
    pub jitter: JitterMode,
    /// Maximum number of remote-call attempts per tick (including the first).
    pub max_retries: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            factor: 2.0,
            max_backoff: Duration::from_secs(60),
            jitter: JitterMode::Random,
            max_retries: 5,
        }
    }
}

impl BackoffPolicy {
    /// Deterministic component: `min(factor^attempt, max_backoff)` in seconds.
    ///
    /// Computed in f64 so an enormous attempt count saturates at the cap
    /// instead of overflowing; `powf` overflow yields +inf, which the `min`
    /// absorbs.
    pub(crate) fn base_delay_secs(&self, attempt: u32) -> f64 {
        let cap = self.max_backoff.as_secs_f64();
        let exp = self.factor.powf(f64::from(attempt));
        if exp.is_finite() {
            exp.min(cap)
        } else {
            cap
        }
    }

    /// Compute the delay before the retry following 1-based `attempt`.
    ///
    /// Pure apart from the injected randomness source; always returns a value
    /// in `[0, max_backoff]`.
    pub fn delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let cap = self.max_backoff.as_secs_f64();
        let base = self.base_delay_secs(attempt);
        let secs = match self.jitter {
            JitterMode::Full => rng.random_range(0.0..=base),
            JitterMode::Random => (base + rng.random_range(0.0..1.0)).min(cap),
        };
        Duration::from_secs_f64(secs.clamp(0.0, cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn policy(jitter: JitterMode) -> BackoffPolicy {
        BackoffPolicy {
            factor: 2.0,
            max_backoff: Duration::from_secs(60),
            jitter,
            max_retries: 5,
        }
    }

    #[test]
    fn base_grows_until_saturation() {
        let p = policy(JitterMode::Random);
        assert_eq!(p.base_delay_secs(1), 2.0);
        assert_eq!(p.base_delay_secs(4), 16.0);
        assert_eq!(p.base_delay_secs(5), 32.0);
        // 2^6 = 64 > 60, capped from here on.
        assert_eq!(p.base_delay_secs(6), 60.0);
        assert_eq!(p.base_delay_secs(30), 60.0);
    }

    #[test]
    fn base_is_monotonic_before_cap() {
        let p = policy(JitterMode::Random);
        let mut prev = 0.0;
        for attempt in 1..=12 {
            let d = p.base_delay_secs(attempt);
            assert!(d >= prev, "attempt {} regressed: {} < {}", attempt, d, prev);
            prev = d;
        }
    }

    #[test]
    fn huge_attempt_saturates_instead_of_overflowing() {
        let p = policy(JitterMode::Random);
        // 2^100000 overflows f64 to +inf; the policy must still cap.
        assert_eq!(p.base_delay_secs(100_000), 60.0);
        let mut rng = StdRng::seed_from_u64(7);
        let d = p.delay(u32::MAX, &mut rng);
        assert!(d <= p.max_backoff);
    }

    #[test]
    fn delay_stays_within_bounds_random_mode() {
        let p = policy(JitterMode::Random);
        let mut rng = StdRng::seed_from_u64(42);
        for attempt in 1..=50 {
            let d = p.delay(attempt, &mut rng);
            assert!(d <= p.max_backoff, "attempt {}: {:?} over cap", attempt, d);
        }
    }

    #[test]
    fn delay_stays_within_bounds_full_mode() {
        let p = policy(JitterMode::Full);
        let mut rng = StdRng::seed_from_u64(42);
        for attempt in 1..=50 {
            let d = p.delay(attempt, &mut rng);
            assert!(d <= p.max_backoff);
        }
    }

    #[test]
    fn random_mode_jitter_is_sub_second() {
        let p = policy(JitterMode::Random);
        let mut rng = StdRng::seed_from_u64(1);
        // base(3) = 8; additive jitter keeps the delay in [8, 9).
        for _ in 0..100 {
            let d = p.delay(3, &mut rng).as_secs_f64();
            assert!((8.0..9.0).contains(&d), "delay {} outside [8, 9)", d);
        }
    }

    #[test]
    fn full_mode_can_be_arbitrarily_small() {
        let p = policy(JitterMode::Full);
        let mut rng = StdRng::seed_from_u64(3);
        let mut smallest = f64::MAX;
        for _ in 0..200 {
            smallest = smallest.min(p.delay(5, &mut rng).as_secs_f64());
        }
        // base(5) = 32; full jitter draws from [0, 32] so small values appear.
        assert!(smallest < 8.0, "full jitter never drew low: {}", smallest);
    }

    #[test]
    fn jitter_mode_serde_lowercase() {
        #[derive(Serialize, Deserialize)]
        struct Wrap {
            jitter_mode: JitterMode,
        }
        let w: Wrap = toml::from_str("jitter_mode = \"full\"").unwrap();
        assert_eq!(w.jitter_mode, JitterMode::Full);
        let w: Wrap = toml::from_str("jitter_mode = \"random\"").unwrap();
        assert_eq!(w.jitter_mode, JitterMode::Random);
    }
}
