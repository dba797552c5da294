use std::cmp::Ordering;

/// Each spatial zone is expected to yield roughly this many field samples.
pub const SAMPLES_PER_CLUSTER: i64 = 25;

/// Number of spatial zones for a constituency sample target.
///
/// `round(samples_per_ac / SAMPLES_PER_CLUSTER)`. Anything below 1 means the
/// target is too small to cluster and the caller must stop there.
pub fn calculate_cluster_count(samples_per_ac: i64) -> i64 {
    cluster_count_with(samples_per_ac, SAMPLES_PER_CLUSTER)
}

/// Same as [`calculate_cluster_count`] with a configurable divisor.
/// Exact halves round to the even count. A non-positive divisor yields 0.
pub fn cluster_count_with(samples_per_ac: i64, samples_per_cluster: i64) -> i64 {
    if samples_per_cluster <= 0 {
        return 0;
    }
    let quotient = samples_per_ac.div_euclid(samples_per_cluster);
    let remainder = samples_per_ac.rem_euclid(samples_per_cluster);
    let above_half = samples_per_cluster - remainder;

    match remainder.cmp(&above_half) {
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 != 0 => quotient + 1,
        _ => quotient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_targets() {
        assert_eq!(calculate_cluster_count(25), 1);
        assert_eq!(calculate_cluster_count(50), 2);
        assert_eq!(calculate_cluster_count(12), 0);
        assert_eq!(calculate_cluster_count(13), 1);
        assert_eq!(calculate_cluster_count(37), 1);
        assert_eq!(calculate_cluster_count(38), 2);
        assert_eq!(calculate_cluster_count(100), 4);
    }

    #[test]
    fn test_below_threshold_and_negative() {
        assert_eq!(calculate_cluster_count(0), 0);
        assert_eq!(calculate_cluster_count(-12), 0);
        assert_eq!(calculate_cluster_count(-13), -1);
        assert_eq!(calculate_cluster_count(-38), -2);
    }

    #[test]
    fn test_custom_divisor() {
        assert_eq!(cluster_count_with(100, 50), 2);
        assert_eq!(cluster_count_with(100, 0), 0);
    }

    #[test]
    fn test_even_divisor_ties_round_to_even() {
        assert_eq!(cluster_count_with(25, 50), 0);
        assert_eq!(cluster_count_with(75, 50), 2);
        assert_eq!(cluster_count_with(125, 50), 2);
        assert_eq!(cluster_count_with(26, 50), 1);
        assert_eq!(cluster_count_with(-25, 50), 0);
        assert_eq!(cluster_count_with(-75, 50), -2);
    }

    #[test]
    fn test_extreme_targets_do_not_overflow() {
        assert_eq!(calculate_cluster_count(i64::MAX), i64::MAX / 25);
        assert_eq!(calculate_cluster_count(i64::MIN), i64::MIN / 25);
        assert_eq!(cluster_count_with(i64::MAX, 1), i64::MAX);
        assert_eq!(cluster_count_with(i64::MAX, i64::MAX), 1);
    }
}
