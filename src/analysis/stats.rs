use crate::structs::{ColumnStats, SpearmanResult};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::cmp::Ordering;

impl ColumnStats {
    /// Calculate statistics for a vector of values, ignoring missing entries
    ///
    /// Returns `None` when no value is present.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate(name: &str, values: &[Option<f64>]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        if sorted.is_empty() {
            return None;
        }

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;

        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
        let std_dev = variance.sqrt();

        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[count - 1];

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);

        Some(Self {
            name: name.to_string(),
            count,
            mean,
            std_dev,
            min,
            max,
            q1,
            median,
            q3,
            iqr: q3 - q1,
        })
    }
}

/// Calculate percentile using linear interpolation
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c {
        sorted[f]
    } else {
        let d0 = sorted[f] * (c as f64 - k);
        let d1 = sorted[c] * (k - f as f64);
        d0 + d1
    }
}

/// 1-based ranks, ties receiving the mean of the positions they span
#[allow(clippy::cast_precision_loss)]
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Pearson correlation coefficient; `None` if either series has zero variance
///
/// Callers guarantee equal lengths of at least 2.
#[allow(clippy::cast_precision_loss)]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Spearman rank correlation with pairwise omission of missing values
///
/// Fewer than two complete pairs or a constant series yields an undefined
/// (NaN) result instead of an error.
#[must_use]
pub fn spearman(x: &[Option<f64>], y: &[Option<f64>]) -> SpearmanResult {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    let n = xs.len();
    if n < 2 {
        return SpearmanResult::undefined(n);
    }

    let Some(rho) = pearson(&rank_average(&xs), &rank_average(&ys)) else {
        return SpearmanResult::undefined(n);
    };

    SpearmanResult {
        coefficient: rho,
        p_value: correlation_p_value(rho, n),
        n,
    }
}

/// Two-sided p-value for a correlation coefficient via Student's t with n-2 dof
///
/// NaN when there are no degrees of freedom left.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n <= 2 || r.is_nan() {
        return f64::NAN;
    }
    if r.abs() >= 1.0 {
        return 0.0;
    }

    let dof = (n - 2) as f64;
    let t = r * (dof / ((1.0 + r) * (1.0 - r))).sqrt();

    StudentsT::new(0.0, 1.0, dof).map_or(f64::NAN, |dist| {
        (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_infinite_values_are_ranked() {
        let x = some(&[f64::NEG_INFINITY, 1.0, 2.0, 3.0, f64::INFINITY]);
        let y = some(&[0.0, 1.0, 2.0, 3.0, 4.0]);

        let r = spearman(&x, &y);

        assert_eq!(r.n, 5);
        assert!((r.coefficient - 1.0).abs() < 1e-12);
        assert_eq!(rank_average(&[f64::INFINITY, 1.0, f64::INFINITY]), vec![2.5, 1.0, 2.5]);
    }

    #[test]
    fn test_column_stats() {
        let values = some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let stats = ColumnStats::calculate("test", &values).expect("calculate stats");

        assert_eq!(stats.count, 10);
        assert!((stats.mean - 5.5).abs() < 0.01);
        assert!((stats.min - 1.0).abs() < 0.01);
        assert!((stats.max - 10.0).abs() < 0.01);
        assert!((stats.median - 5.5).abs() < 0.01);
    }

    #[test]
    fn test_column_stats_skips_missing() {
        let values = vec![Some(2.0), None, Some(4.0)];
        let stats = ColumnStats::calculate("age", &values).expect("calculate stats");

        assert_eq!(stats.count, 2);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!(ColumnStats::calculate("empty", &[None, None]).is_none());
    }

    #[test]
    fn test_rank_average_ties() {
        let ranks = rank_average(&[10.0, 20.0, 20.0, 5.0]);
        assert_eq!(ranks, vec![2.0, 3.5, 3.5, 1.0]);
    }

    #[test]
    fn test_perfect_monotonic_correlation() {
        let x = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = some(&[1.0, 4.0, 9.0, 16.0, 100.0]);
        let result = spearman(&x, &y);

        assert!((result.coefficient - 1.0).abs() < 1e-12);
        assert!(result.p_value < 1e-6);
        assert_eq!(result.n, 5);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let x = some(&[1.0, 2.0, 3.0, 4.0]);
        let y = some(&[8.0, 6.0, 4.0, 2.0]);
        let result = spearman(&x, &y);

        assert!((result.coefficient + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_p_value() {
        // rho = 0.8 with n = 5 gives t = 2.3094 on 3 dof, two-sided p = 0.1041
        let x = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = some(&[2.0, 1.0, 4.0, 3.0, 5.0]);
        let result = spearman(&x, &y);

        assert!((result.coefficient - 0.8).abs() < 1e-12);
        assert!((result.p_value - 0.1041).abs() < 1e-3);
    }

    #[test]
    fn test_constant_series_is_undefined() {
        let x = some(&[3.0, 3.0, 3.0, 3.0]);
        let y = some(&[1.0, 2.0, 3.0, 4.0]);
        let result = spearman(&x, &y);

        assert!(result.coefficient.is_nan());
        assert!(result.p_value.is_nan());
        assert!(result.is_undefined());
    }

    #[test]
    fn test_too_few_pairs_is_undefined() {
        let x = vec![Some(1.0), None, Some(3.0)];
        let y = vec![Some(2.0), Some(5.0), None];
        let result = spearman(&x, &y);

        assert_eq!(result.n, 1);
        assert!(result.is_undefined());
    }

    #[test]
    fn test_pairwise_omission() {
        let x = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let y = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let result = spearman(&x, &y);

        assert_eq!(result.n, 3);
        assert!((result.coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_pairs_have_no_p_value() {
        let result = spearman(&some(&[1.0, 2.0]), &some(&[3.0, 4.0]));

        assert!((result.coefficient - 1.0).abs() < 1e-12);
        assert!(result.p_value.is_nan());
    }
}
