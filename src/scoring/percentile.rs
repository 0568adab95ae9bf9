//! Batch-relative amount statistics.
//!
//! Percentile ranks use averaged ranks so tied amounts share a rank, then
//! normalize to `(avg_rank - 1) / (n - 1)`: the lowest amount maps to 0.0
//! and the highest to 1.0. A single-element batch has no spread to rank
//! against and resolves to 1.0.

/// Rank assigned when a batch holds a single value.
pub const SINGLE_VALUE_RANK: f64 = 1.0;

/// Percentile rank of every value, in input order.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![SINGLE_VALUE_RANK];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let denom = (n - 1) as f64;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // zero-based positions start..=end share their mean position
        let avg_position = (start + end) as f64 / 2.0;
        for &idx in &order[start..=end] {
            ranks[idx] = avg_position / denom;
        }
        start = end + 1;
    }

    ranks
}

/// Quantile of already-sorted values using linear interpolation between
/// the closest order statistics. `q` is clamped to [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_span_zero_to_one() {
        let ranks = percentile_ranks(&[300.0, 100.0, 200.0]);
        assert_eq!(ranks, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_tied_values_share_rank() {
        let ranks = percentile_ranks(&[50.0, 200.0, 200.0, 900.0]);

        assert_eq!(ranks[1], ranks[2]);
        // positions 1 and 2 average to 1.5 over a span of 3
        assert!((ranks[1] - 0.5).abs() < 1e-12);
        assert_eq!(ranks[0], 0.0);
        assert_eq!(ranks[3], 1.0);
    }

    #[test]
    fn test_all_equal_values_sit_mid_scale() {
        let ranks = percentile_ranks(&[10.0, 10.0, 10.0]);
        assert!(ranks.iter().all(|&r| (r - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_single_value_uses_default_rank() {
        assert_eq!(percentile_ranks(&[3000.0]), vec![SINGLE_VALUE_RANK]);
        assert!(percentile_ranks(&[]).is_empty());
    }

    #[test]
    fn test_quantile_interpolates() {
        // 0.95 * (2 - 1) = 0.95 of the way from 100 to 9000
        let p95 = quantile_sorted(&[100.0, 9000.0], 0.95).unwrap();
        assert!((p95 - 8555.0).abs() < 1e-9);

        let values: Vec<f64> = (1..=101).map(f64::from).collect();
        assert_eq!(quantile_sorted(&values, 0.95), Some(96.0));
        assert_eq!(quantile_sorted(&values, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&values, 1.0), Some(101.0));
    }

    #[test]
    fn test_median_of_sorted() {
        assert_eq!(quantile_sorted(&[1.0, 3.0, 5.0], 0.5), Some(3.0));
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0, 4.0], 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }
}
