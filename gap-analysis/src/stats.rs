//! Small descriptive statistics helpers over optional monthly values.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Present values only.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Sample standard deviation (n - 1), `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let std = values.iter().std_dev();
    std.is_finite().then_some(std)
}

/// Linear-interpolated quantile, `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Pearson r over the positions where both series have a value.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    pearson_complete(&x, &y)
}

pub fn pearson_complete(x: &[f64], y: &[f64]) -> Option<f64> {
    let (cov, var_x) = covariance_and_variance(x, y)?;
    let var_y = y.iter().variance();
    if !(var_y.is_finite() && var_y > 0.0) {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Sample covariance of the pairs and sample variance of `x`; `None` for
/// mismatched or too short input and for a constant `x`.
fn covariance_and_variance(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let var_x = x.iter().variance();
    if !(var_x.is_finite() && var_x > 0.0) {
        return None;
    }
    let cov = x.iter().covariance(y.iter());
    cov.is_finite().then_some((cov, var_x))
}

/// Two-sided p-value of a Pearson r from `n` pairs (Student t, n - 2 df).
pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Ordinary least squares line `y = slope * x + intercept`.
pub fn least_squares(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let (cov, var_x) = covariance_and_variance(x, y)?;
    let slope = cov / var_x;
    Some((slope, y.iter().mean() - slope * x.iter().mean()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let r = pearson(&some(&[1.0, 2.0, 3.0, 4.0, 5.0]), &some(&[2.0, 4.0, 6.0, 8.0, 10.0]));
        assert!((r.unwrap() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let r = pearson(&some(&[1.0, 2.0, 3.0, 4.0, 5.0]), &some(&[10.0, 8.0, 6.0, 4.0, 2.0]));
        assert!((r.unwrap() + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_correlation_with_missing_data() {
        let x = vec![Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)];
        let y = some(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let r = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_constant_series_has_no_correlation() {
        assert_eq!(pearson(&some(&[1.0, 1.0, 1.0]), &some(&[1.0, 2.0, 3.0])), None);
        assert_eq!(pearson(&some(&[1.0]), &some(&[1.0])), None);
    }

    #[test]
    fn test_quantiles_match_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(median(&values), Some(2.5));
        assert_eq!(quantile(&values, 0.75), Some(3.25));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_sample_std() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138089935).abs() < 1e-6);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn test_p_value() {
        assert_eq!(correlation_p_value(1.0, 10), Some(0.0));
        assert_eq!(correlation_p_value(0.5, 2), None);

        let p_zero = correlation_p_value(0.0, 20).unwrap();
        assert!((p_zero - 1.0).abs() < 1e-9);

        // r = 0.5, n = 20 is significant at 5% but not 1%
        let p = correlation_p_value(0.5, 20).unwrap();
        assert!(p < 0.05 && p > 0.01);
    }

    #[test]
    fn test_least_squares() {
        let (slope, intercept) = least_squares(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-9);
        assert!((intercept - 1.0).abs() < 1e-9);
        assert_eq!(least_squares(&[1.0, 1.0], &[1.0, 2.0]), None);
        assert_eq!(least_squares(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_pearson_matches_hand_computed_value() {
        // cov = 2.0, var_x = var_y = 2.5
        let r = pearson_complete(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!((r - 0.8).abs() < 1e-9);
        assert_eq!(pearson_complete(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), None);
    }
}
