//! Ordinary least squares with classical standard errors.
//!
//! Used by backdoor estimation and by both refuters. The fit solves the
//! normal equations `(XᵀX) β = Xᵀy` with an LU decomposition and reports
//! `σ̂² (XᵀX)⁻¹` standard errors.

use cc_core::{Error, Result};
use nalgebra::{DMatrix, DVector};

#[inline]
fn validate_xy_dims(n: usize, p: usize, x_len: usize, y_len: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::Validation("X/y must be non-empty".to_string()));
    }
    if p == 0 {
        return Err(Error::Validation("X must have at least 1 feature column".to_string()));
    }
    if x_len != n * p {
        return Err(Error::Validation(format!(
            "X has wrong length: expected n*p={}, got {}",
            n * p,
            x_len
        )));
    }
    if y_len != n {
        return Err(Error::Validation(format!("y has wrong length: expected n={n}, got {y_len}")));
    }
    Ok(())
}

/// Dense row-major design matrix.
#[derive(Debug, Clone)]
struct DenseX {
    n: usize,
    p: usize,
    data: Vec<f64>, // length n*p, row-major
}

impl DenseX {
    /// Build from feature columns (each of length n).
    fn from_columns(columns: &[&[f64]]) -> Result<Self> {
        let p = columns.len();
        let n = columns.first().map_or(0, |c| c.len());
        if n == 0 || p == 0 {
            return Err(Error::Validation("X must be non-empty (n>0, p>0)".to_string()));
        }
        for (j, col) in columns.iter().enumerate() {
            if col.len() != n {
                return Err(Error::Validation(format!(
                    "X must be rectangular: column {} has len {}, expected {}",
                    j,
                    col.len(),
                    n
                )));
            }
        }
        let mut data = Vec::with_capacity(n * p);
        for i in 0..n {
            for col in columns {
                let v = col[i];
                if !v.is_finite() {
                    return Err(Error::Validation("X must contain only finite values".to_string()));
                }
                data.push(v);
            }
        }
        Ok(Self { n, p, data })
    }

    #[inline]
    fn row(&self, i: usize) -> &[f64] {
        let start = i * self.p;
        &self.data[start..start + self.p]
    }
}

/// Result of an OLS fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients; index 0 is the intercept when one was included.
    pub coefficients: Vec<f64>,
    /// Classical standard errors, same order as `coefficients`.
    pub std_errors: Vec<f64>,
    /// Residual variance estimate `RSS / (n − d)`.
    pub sigma2: f64,
    /// Residual degrees of freedom `n − d`.
    pub df_resid: usize,
    /// Number of observations.
    pub n_obs: usize,
    /// Coefficient of determination.
    pub r_squared: f64,
}

/// Fit `y ~ [1,] x₁ + … + x_p` by OLS.
///
/// `columns` are the feature columns in coefficient order. Fails with a
/// validation error on ragged or non-finite input and with a computation
/// error when `XᵀX` is singular or the solution is not finite.
pub fn ols_fit(columns: &[&[f64]], y: &[f64], include_intercept: bool) -> Result<OlsFit> {
    let x = DenseX::from_columns(columns)?;
    validate_xy_dims(x.n, x.p, x.data.len(), y.len())?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Error::Validation("y must contain only finite values".to_string()));
    }

    let off = usize::from(include_intercept);
    let d = x.p + off;
    if x.n <= d {
        return Err(Error::Validation(format!(
            "OLS needs more observations than parameters (n={}, d={})",
            x.n, d
        )));
    }

    // Accumulate XtX and Xty.
    let mut xtx = DMatrix::<f64>::zeros(d, d);
    let mut xty = DVector::<f64>::zeros(d);
    let mut design_row = vec![1.0; d];
    for i in 0..x.n {
        design_row[off..].copy_from_slice(x.row(i));
        let yi = y[i];
        for a in 0..d {
            xty[a] += design_row[a] * yi;
            for b in a..d {
                xtx[(a, b)] += design_row[a] * design_row[b];
            }
        }
    }
    for a in 0..d {
        for b in 0..a {
            xtx[(a, b)] = xtx[(b, a)];
        }
    }

    let lu = xtx.lu();
    let u = lu.u();
    let pivot_scale = (0..d).map(|k| u[(k, k)].abs()).fold(0.0, f64::max);
    if (0..d).any(|k| u[(k, k)].abs() <= 1e-10 * pivot_scale.max(f64::MIN_POSITIVE)) {
        return Err(Error::Computation("OLS solve failed (singular XtX)".to_string()));
    }
    let beta = lu
        .solve(&xty)
        .ok_or_else(|| Error::Computation("OLS solve failed (singular XtX)".to_string()))?;
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(Error::Computation("OLS produced non-finite coefficients".to_string()));
    }
    let xtx_inv = lu
        .try_inverse()
        .ok_or_else(|| Error::Computation("XtX is not invertible".to_string()))?;

    let y_mean = y.iter().sum::<f64>() / x.n as f64;
    let mut rss = 0.0;
    let mut tss = 0.0;
    for i in 0..x.n {
        design_row[off..].copy_from_slice(x.row(i));
        let fitted: f64 = design_row.iter().zip(beta.iter()).map(|(a, b)| a * b).sum();
        let r = y[i] - fitted;
        rss += r * r;
        tss += (y[i] - y_mean) * (y[i] - y_mean);
    }

    let df_resid = x.n - d;
    let sigma2 = rss / df_resid as f64;
    let std_errors = (0..d).map(|k| (sigma2 * xtx_inv[(k, k)]).max(0.0).sqrt()).collect();
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        sigma2,
        df_resid,
        n_obs: x.n,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_noiseless_coefficients() {
        let x1: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let x2: Vec<f64> = (0..20).map(|i| ((i * 7) % 5) as f64).collect();
        let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 1.5 - 0.25 * a + 2.0 * b).collect();

        let fit = ols_fit(&[&x1[..], &x2[..]], &y, true).unwrap();
        assert_relative_eq!(fit.coefficients[0], 1.5, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], -0.25, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[2], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(fit.df_resid, 17);
        assert!(fit.std_errors.iter().all(|s| *s < 1e-6));
    }

    #[test]
    fn simple_regression_standard_error() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 0.0, 3.0, 2.0];
        let fit = ols_fit(&[&x[..]], &y, true).unwrap();
        // Sxx = 5, Sxy = 3 -> slope 0.6, intercept 0.6.
        assert_relative_eq!(fit.coefficients[1], 0.6, epsilon = 1e-12);
        assert_relative_eq!(fit.coefficients[0], 0.6, epsilon = 1e-12);
        // RSS = 3.2, sigma2 = 1.6, se(slope) = sqrt(1.6 / 5).
        assert_relative_eq!(fit.sigma2, 1.6, epsilon = 1e-12);
        assert_relative_eq!(fit.std_errors[1], (1.6f64 / 5.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn singular_design_is_a_computation_error() {
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let x2 = [2.0, 4.0, 6.0, 8.0, 10.0];
        let y = [1.0, 0.0, 1.0, 0.0, 1.0];
        assert!(matches!(ols_fit(&[&x1[..], &x2[..]], &y, true), Err(Error::Computation(_))));
    }

    #[test]
    fn rejects_bad_input() {
        let x = [1.0, f64::NAN, 3.0];
        assert!(matches!(ols_fit(&[&x[..]], &[1.0, 2.0, 3.0], true), Err(Error::Validation(_))));
        assert!(matches!(
            ols_fit(&[&[1.0, 2.0, 3.0][..]], &[1.0, 2.0], true),
            Err(Error::Validation(_))
        ));
        assert!(matches!(ols_fit(&[&[1.0, 2.0][..]], &[1.0, 2.0], true), Err(Error::Validation(_))));
    }
}
