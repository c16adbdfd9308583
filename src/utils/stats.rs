//! Null-aware statistics over decomposition columns.
//!
//! Rows holding `None` (or a non-finite value) are skipped, mirroring how a
//! tabular engine aggregates a column with nulls. Variances are sample
//! variances (n - 1 denominator).

use statrs::statistics::Statistics;

fn defined(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect()
}

/// Mean of the defined values, `None` if there are none.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let v = defined(values);
    if v.is_empty() {
        return None;
    }
    Some(v.iter().mean())
}

/// Sample variance of the defined values, `None` with fewer than two.
pub fn variance(values: &[Option<f64>]) -> Option<f64> {
    let v = defined(values);
    if v.len() < 2 {
        return None;
    }
    Some(v.iter().variance())
}

/// Sample standard deviation of the defined values, `None` with fewer than two.
pub fn std_dev(values: &[Option<f64>]) -> Option<f64> {
    let v = defined(values);
    if v.len() < 2 {
        return None;
    }
    Some(v.iter().std_dev())
}

/// Row-wise sum; `None` wherever either side is `None`.
pub fn add(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(x + y),
            _ => None,
        })
        .collect()
}

/// Median of a slice, NaN when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn mean_skips_nulls() {
        let values = vec![None, Some(1.0), Some(2.0), None, Some(3.0)];
        assert_relative_eq!(mean(&values).unwrap(), 2.0, epsilon = 1e-10);
        assert_eq!(mean(&[None, None]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn variance_is_sample_variance() {
        // Sample variance of [1, 2, 3, 4, 5] = 2.5
        assert_relative_eq!(
            variance(&some(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap(),
            2.5,
            epsilon = 1e-10
        );
        assert_eq!(variance(&some(&[1.0])), None);
        assert_eq!(variance(&[None, Some(4.0)]), None);
    }

    #[test]
    fn variance_skips_nulls_and_nan() {
        let values = vec![None, Some(1.0), Some(f64::NAN), Some(3.0), None];
        assert_relative_eq!(variance(&values).unwrap(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn std_dev_matches_variance() {
        let values = some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(
            std_dev(&values).unwrap(),
            variance(&values).unwrap().sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn add_propagates_nulls() {
        let a = vec![Some(1.0), None, Some(3.0)];
        let b = vec![Some(1.0), Some(2.0), None];
        assert_eq!(add(&a, &b), vec![Some(2.0), None, None]);
    }

    #[test]
    fn median_calculates_correctly() {
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5, epsilon = 1e-10);
        assert_relative_eq!(median(&[5.0, 1.0, 3.0, 2.0, 4.0]), 3.0, epsilon = 1e-10);
        assert!(median(&[]).is_nan());
    }
}
