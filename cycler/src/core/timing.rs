//! Randomized delays and the auto-cycle restart rule.

use std::time::Duration;

use rand::Rng;

pub const MILLIS_PER_SECOND: u64 = 1_000;
pub const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;

/// Delay before dispatching an interaction: whole seconds, uniform in `[fast, slow]`.
pub fn interaction_delay<R: Rng + ?Sized>(rng: &mut R, fast_secs: u64, slow_secs: u64) -> Duration {
    Duration::from_secs(rng.gen_range(fast_secs..=slow_secs))
}

/// Largest minute count whose millisecond value still fits in a `u64`.
pub const MAX_MINUTES: u64 = u64::MAX / MILLIS_PER_MINUTE;

/// Restart threshold in milliseconds, uniform in `[min, max]` minutes.
///
/// Bounds past [`MAX_MINUTES`] saturate at `u64::MAX` milliseconds.
pub fn restart_threshold_ms<R: Rng + ?Sized>(rng: &mut R, min_minutes: u64, max_minutes: u64) -> u64 {
    let low = min_minutes.saturating_mul(MILLIS_PER_MINUTE);
    let high = max_minutes.saturating_mul(MILLIS_PER_MINUTE);
    rng.gen_range(low..=high)
}

/// True when `now` is strictly past `last + threshold`. A missing `last` has always elapsed.
pub fn restart_due(now_ms: i64, last_start_ms: Option<i64>, threshold_ms: u64) -> bool {
    match last_start_ms {
        None => true,
        Some(last) => {
            let threshold = i64::try_from(threshold_ms).unwrap_or(i64::MAX);
            now_ms > last.saturating_add(threshold)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const T: i64 = 1_700_000_000_000;

    fn minutes(n: i64) -> i64 {
        n * MILLIS_PER_MINUTE as i64
    }

    #[test]
    fn delay_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let delay = interaction_delay(&mut rng, 1, 4);
            assert!((1..=4).contains(&delay.as_secs()));
        }
    }

    #[test]
    fn equal_bounds_give_fixed_delay() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(interaction_delay(&mut rng, 3, 3), Duration::from_secs(3));
    }

    #[test]
    fn restart_after_max_is_certain() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let threshold = restart_threshold_ms(&mut rng, 15, 45);
            assert!(restart_due(T + minutes(46), Some(T), threshold));
        }
    }

    #[test]
    fn restart_before_min_never_happens() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let threshold = restart_threshold_ms(&mut rng, 15, 45);
            assert!(!restart_due(T + minutes(10), Some(T), threshold));
        }
    }

    #[test]
    fn huge_minute_bounds_saturate_instead_of_overflowing() {
        let mut rng = StdRng::seed_from_u64(3);
        let huge = u64::MAX / 1_000;
        assert_eq!(restart_threshold_ms(&mut rng, huge, huge), u64::MAX);
        assert!(!restart_due(T + minutes(600), Some(T), u64::MAX));
    }

    #[test]
    fn missing_last_start_counts_as_elapsed() {
        assert!(restart_due(0, None, u64::MAX));
    }

    #[test]
    fn boundary_is_exclusive() {
        let threshold = MILLIS_PER_MINUTE * 15;
        assert!(!restart_due(T + minutes(15), Some(T), threshold));
        assert!(restart_due(T + minutes(15) + 1, Some(T), threshold));
    }
}
