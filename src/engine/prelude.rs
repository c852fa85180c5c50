// Shared random helpers for the engine

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Draws from N(mean, mean / 2) milliseconds, floored at zero.
pub fn jittered_ms<R: Rng + ?Sized>(rng: &mut R, mean_ms: f64) -> f64 {
    if !mean_ms.is_finite() || mean_ms <= 0.0 {
        return 0.0;
    }
    match Normal::new(mean_ms, mean_ms / 2.0) {
        Ok(normal) => normal.sample(rng).max(0.0),
        Err(_) => mean_ms,
    }
}

/// Negative or NaN input gives zero; values past `Duration::MAX` saturate.
pub fn ms_to_duration(ms: f64) -> Duration {
    if ms > 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Per-voice RNG: deterministic when a base seed is configured.
pub fn voice_rng(seed: Option<u64>, voice: usize) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(voice as u64)),
        None => SmallRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_is_never_negative() {
        let mut rng = voice_rng(Some(3), 0);
        let draws: Vec<f64> = (0..2000).map(|_| jittered_ms(&mut rng, 100.0)).collect();
        assert!(draws.iter().all(|&d| d >= 0.0));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        // flooring at zero nudges the mean up slightly
        assert!((90.0..115.0).contains(&mean), "mean was {}", mean);
    }

    #[test]
    fn zero_mean_means_no_delay() {
        let mut rng = voice_rng(Some(3), 0);
        assert_eq!(jittered_ms(&mut rng, 0.0), 0.0);
        assert_eq!(ms_to_duration(0.0), Duration::ZERO);
        assert_eq!(ms_to_duration(-5.0), Duration::ZERO);
        assert_eq!(ms_to_duration(250.0), Duration::from_millis(250));
    }

    #[test]
    fn huge_means_saturate_instead_of_overflowing() {
        let mut rng = voice_rng(Some(3), 0);
        let drawn = ms_to_duration(jittered_ms(&mut rng, 1e300));
        assert!(drawn == Duration::MAX || drawn == Duration::ZERO);
        assert_eq!(ms_to_duration(1e300), Duration::MAX);
        assert_eq!(ms_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(ms_to_duration(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn seeded_voices_differ_but_repeat() {
        let a: u64 = voice_rng(Some(9), 0).random();
        let b: u64 = voice_rng(Some(9), 1).random();
        let a_again: u64 = voice_rng(Some(9), 0).random();
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }
}
