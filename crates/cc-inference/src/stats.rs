//! Descriptive statistics used by the EDA and reporting stages.
//!
//! - mean / sample standard deviation,
//! - Pearson correlation (scalar and full matrix over numeric columns),
//! - linear-interpolation quantiles and percentile bootstrap intervals.

use cc_core::{Error, Result, Table};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Arithmetic mean (`NaN` for empty input).
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n − 1 denominator, `NaN` below 2 values).
pub fn std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

/// Pearson correlation coefficient.
///
/// Returns `None` when either input has zero variance (or fewer than 2
/// points). The result is clamped to `[-1, 1]` to absorb rounding.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Option<f64>> {
    if x.len() != y.len() {
        return Err(Error::Validation(format!(
            "pearson: length mismatch ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::Validation("pearson: inputs must be finite".to_string()));
    }
    if x.len() < 2 {
        return Ok(None);
    }

    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return Ok(None);
    }
    Ok(Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)))
}

/// Pairwise Pearson correlations between named numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Column names (row and column order).
    pub names: Vec<String>,
    /// Row-major `n × n` coefficients; `None` where a column has zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.values[i][j]
    }
}

/// Correlation matrix over every numeric column of a fully observed table.
pub fn correlation_matrix(table: &Table) -> Result<CorrelationMatrix> {
    let names: Vec<String> = table.numeric_column_names().into_iter().map(String::from).collect();
    if names.is_empty() {
        return Err(Error::Validation("correlation matrix needs at least one numeric column".into()));
    }
    let data: Vec<Vec<f64>> =
        names.iter().map(|n| table.numeric_values(n)).collect::<Result<_>>()?;

    let k = names.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = if i == j {
                // Diagonal is 1 unless the column is constant.
                pearson(&data[i], &data[i])?.map(|_| 1.0)
            } else {
                pearson(&data[i], &data[j])?
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix { names, values })
}

/// Quantile of sorted data via linear interpolation (`NaN` for empty input).
pub fn quantile_linear_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let i = pos.floor() as usize;
    let j = pos.ceil() as usize;
    if i == j {
        return sorted[i];
    }
    let t = pos - i as f64;
    (1.0 - t) * sorted[i] + t * sorted[j]
}

/// Quantile via sorting + linear interpolation.
pub fn quantile_linear(data: &[f64], q: f64) -> f64 {
    let mut v = data.to_vec();
    v.sort_by(f64::total_cmp);
    quantile_linear_sorted(&v, q)
}

/// Percentile interval of bootstrap samples.
pub fn percentile_interval(samples: &[f64], conf_level: f64) -> Result<(f64, f64)> {
    if samples.len() < 2 {
        return Err(Error::Validation(
            "percentile_interval requires at least 2 samples".to_string(),
        ));
    }
    if !(conf_level.is_finite() && conf_level > 0.0 && conf_level < 1.0) {
        return Err(Error::Validation(format!("conf_level must be in (0,1), got {conf_level}")));
    }
    let alpha = (1.0 - conf_level) / 2.0;
    let lo = quantile_linear(samples, alpha);
    let hi = quantile_linear(samples, 1.0 - alpha);
    Ok((lo.min(hi), lo.max(hi)))
}

/// Percentile bootstrap CI of the mean.
///
/// With a single observation the interval collapses to that value.
pub fn bootstrap_mean_ci(
    xs: &[f64],
    n_resamples: usize,
    conf_level: f64,
    seed: u64,
) -> Result<(f64, f64)> {
    if xs.is_empty() {
        return Err(Error::Validation("bootstrap_mean_ci: empty sample".into()));
    }
    if xs.len() == 1 || n_resamples < 2 {
        return Ok((xs[0].min(mean(xs)), xs[0].max(mean(xs))));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let n = xs.len();
    let mut means = Vec::with_capacity(n_resamples);
    for _ in 0..n_resamples {
        let mut s = 0.0;
        for _ in 0..n {
            s += xs[rng.random_range(0..n)];
        }
        means.push(s / n as f64);
    }
    percentile_interval(&means, conf_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cc_core::Column;

    #[test]
    fn mean_and_std() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&xs), 5.0);
        assert_relative_eq!(std_dev(&xs), 2.138089935299395, epsilon = 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn pearson_perfect_and_degenerate() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(pearson(&x, &y).unwrap().unwrap(), 1.0);
        assert_relative_eq!(pearson(&x, &z).unwrap().unwrap(), -1.0);
        assert_eq!(pearson(&x, &[3.0; 4]).unwrap(), None);
        assert!(pearson(&x, &y[..3]).is_err());
    }

    #[test]
    fn correlation_stays_in_unit_interval() {
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin()).collect();
        let y: Vec<f64> = (0..50).map(|i| (i as f64 * 0.11).cos() + x[i]).collect();
        let r = pearson(&x, &y).unwrap().unwrap();
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let t = Table::from_columns(vec![
            ("a", Column::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)])),
            ("b", Column::Numeric(vec![Some(3.0), Some(1.0), Some(2.0)])),
            ("c", Column::Numeric(vec![Some(5.0), Some(5.0), Some(5.0)])),
            ("s", Column::Text(vec![Some("x".into()), Some("y".into()), Some("z".into())])),
        ])
        .unwrap();
        let m = correlation_matrix(&t).unwrap();
        assert_eq!(m.names, vec!["a", "b", "c"]);
        assert_eq!(m.get("a", "a"), Some(1.0));
        assert_eq!(m.get("a", "b"), m.get("b", "a"));
        assert_relative_eq!(m.get("a", "b").unwrap(), -0.5, epsilon = 1e-12);
        assert_eq!(m.get("c", "c"), None);
        assert_eq!(m.get("a", "c"), None);
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile_linear(&v, 0.0), 1.0);
        assert_relative_eq!(quantile_linear(&v, 1.0), 4.0);
        assert_relative_eq!(quantile_linear(&v, 0.5), 2.5);
    }

    #[test]
    fn bootstrap_ci_brackets_mean_and_is_seeded() {
        let xs: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let (lo, hi) = bootstrap_mean_ci(&xs, 500, 0.95, 7).unwrap();
        assert!(lo < mean(&xs) && mean(&xs) < hi);
        assert_eq!((lo, hi), bootstrap_mean_ci(&xs, 500, 0.95, 7).unwrap());
        assert_eq!(bootstrap_mean_ci(&[3.0], 100, 0.95, 1).unwrap(), (3.0, 3.0));
    }
}
