//! Backdoor linear-regression estimation of the ATE.

use std::fmt;

use cc_core::{Error, Result, Table};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::identify::IdentifiedEstimand;
use crate::preprocess::LabelEncoding;
use crate::regression::{OlsFit, ols_fit};

/// Estimation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    /// Treatment value of the contrast.
    pub treatment_value: f64,
    /// Control value of the contrast.
    pub control_value: f64,
    /// Confidence level of the reported interval.
    pub confidence_level: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self { treatment_value: 1.0, control_value: 0.0, confidence_level: 0.95 }
    }
}

/// One fitted regression coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    /// Regressor name (`Intercept` for the constant).
    pub name: String,
    /// Point estimate.
    pub estimate: f64,
    /// Classical standard error.
    pub std_error: f64,
}

/// ATE with regression diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CausalEstimate {
    /// Treatment variable.
    pub treatment: String,
    /// Outcome variable.
    pub outcome: String,
    /// Adjustment set used.
    pub adjustment_set: Vec<String>,
    /// Average treatment effect of moving from `control_value` to `treatment_value`.
    pub value: f64,
    /// Standard error of `value`.
    pub std_error: f64,
    /// t statistic of the treatment coefficient.
    pub t_stat: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Confidence interval of `value`.
    pub conf_int: (f64, f64),
    /// Confidence level of `conf_int`.
    pub confidence_level: f64,
    /// Number of observations.
    pub n_obs: usize,
    /// Regression formula actually fitted.
    pub formula: String,
    /// All fitted coefficients.
    pub coefficients: Vec<Coefficient>,
    /// Treatment value of the contrast.
    pub treatment_value: f64,
    /// Control value of the contrast.
    pub control_value: f64,
    /// Methodological caveats about this estimate.
    pub caveats: Vec<String>,
}

impl fmt::Display for CausalEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** Causal Estimate ***")?;
        writeln!(f, "Estimand: backdoor")?;
        writeln!(f, "Realized estimand: {}", self.formula)?;
        writeln!(f, "Target units: ate")?;
        writeln!(f, "Mean value: {}", self.value)?;
        writeln!(
            f,
            "Std. error: {:.6}  t: {:.3}  p-value: {:.4}",
            self.std_error, self.t_stat, self.p_value
        )?;
        write!(
            f,
            "{:.0}% CI: [{:.6}, {:.6}]",
            self.confidence_level * 100.0,
            self.conf_int.0,
            self.conf_int.1
        )?;
        for c in &self.caveats {
            write!(f, "\nCaveat: {c}")?;
        }
        Ok(())
    }
}

/// OLS of `outcome` on `[1, treatment, adjusters...]`.
pub(crate) fn backdoor_regression(
    treatment: &[f64],
    outcome: &[f64],
    adjusters: &[&[f64]],
) -> Result<OlsFit> {
    let mut cols: Vec<&[f64]> = Vec::with_capacity(1 + adjusters.len());
    cols.push(treatment);
    cols.extend_from_slice(adjusters);
    ols_fit(&cols, outcome, true)
}

/// `outcome ~ treatment + w1 + ...`.
fn formula(outcome: &str, treatment: &str, adjustment: &[String]) -> String {
    let mut rhs = vec![treatment.to_string()];
    rhs.extend(adjustment.iter().cloned());
    format!("{outcome} ~ {}", rhs.join(" + "))
}

fn t_interval(beta: f64, se: f64, df: usize, level: f64) -> Result<(f64, f64, f64, (f64, f64))> {
    if !(level.is_finite() && level > 0.0 && level < 1.0) {
        return Err(Error::Validation(format!("confidence level must be in (0,1), got {level}")));
    }
    if !(se.is_finite() && se > 0.0) {
        // Exact fit: the coefficient has no sampling noise.
        return Ok((f64::NAN, f64::NAN, f64::NAN, (beta, beta)));
    }
    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| Error::Computation(format!("Student-t distribution: {e}")))?;
    let t = beta / se;
    let p = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);
    let q = dist.inverse_cdf(0.5 + level / 2.0);
    Ok((se, t, p, (beta - q * se, beta + q * se)))
}

/// Estimate the ATE by backdoor adjustment with linear regression.
///
/// `treatment_encoding` is the label encoding of the treatment column, when
/// it was a categorical; it only feeds the caveats.
pub fn estimate_effect(
    table: &Table,
    estimand: &IdentifiedEstimand,
    config: &EstimateConfig,
    treatment_encoding: Option<&LabelEncoding>,
) -> Result<CausalEstimate> {
    let adjustment = estimand.require_backdoor()?.to_vec();

    let t = table.numeric_values(&estimand.treatment)?;
    let y = table.numeric_values(&estimand.outcome)?;
    let w: Vec<Vec<f64>> =
        adjustment.iter().map(|c| table.numeric_values(c)).collect::<Result<_>>()?;
    let w_refs: Vec<&[f64]> = w.iter().map(Vec::as_slice).collect();

    let fit = backdoor_regression(&t, &y, &w_refs)?;
    let contrast = config.treatment_value - config.control_value;
    let beta = fit.coefficients[1];
    let value = beta * contrast;
    if !value.is_finite() {
        return Err(Error::Computation("causal estimate is not finite".into()));
    }

    let (se_beta, t_stat, p_value, (lo, hi)) =
        t_interval(beta, fit.std_errors[1], fit.df_resid, config.confidence_level)?;
    let std_error = se_beta * contrast.abs();
    let conf_int = {
        let (a, b) = (lo * contrast, hi * contrast);
        (a.min(b), a.max(b))
    };

    let mut names = vec!["Intercept".to_string(), estimand.treatment.clone()];
    names.extend(adjustment.iter().cloned());
    let coefficients = names
        .into_iter()
        .zip(fit.coefficients.iter().zip(&fit.std_errors))
        .map(|(name, (&estimate, &std_error))| Coefficient { name, estimate, std_error })
        .collect();

    let mut caveats = Vec::new();
    if let Some(enc) = treatment_encoding {
        let levels = enc
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c}={i}"))
            .collect::<Vec<_>>()
            .join(", ");
        caveats.push(format!(
            "'{}' is a label-encoded categorical with {} levels ({levels}); the estimate is a \
             single linear slope across integer codes and assumes an ordered, evenly spaced effect",
            enc.column,
            enc.n_classes()
        ));
    }
    if is_binary(&y) {
        caveats.push(format!(
            "'{}' is binary; the linear model is a linear probability model",
            estimand.outcome
        ));
    }
    for c in &caveats {
        tracing::info!(caveat = %c, "estimate caveat");
    }

    let formula = formula(&estimand.outcome, &estimand.treatment, &adjustment);
    tracing::info!(ate = value, se = std_error, p = p_value, formula = %formula, "estimated effect");

    Ok(CausalEstimate {
        treatment: estimand.treatment.clone(),
        outcome: estimand.outcome.clone(),
        adjustment_set: adjustment,
        value,
        std_error,
        t_stat,
        p_value,
        conf_int,
        confidence_level: config.confidence_level,
        n_obs: fit.n_obs,
        formula,
        coefficients,
        treatment_value: config.treatment_value,
        control_value: config.control_value,
        caveats,
    })
}

fn is_binary(y: &[f64]) -> bool {
    !y.is_empty() && y.iter().all(|v| *v == 0.0 || *v == 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::causal::{CausalGraph, CausalSpec, identify_effect};
    use approx::assert_relative_eq;
    use cc_core::Column;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, StandardNormal};

    fn col(v: &[f64]) -> Column {
        Column::Numeric(v.iter().map(|&x| Some(x)).collect())
    }

    fn spec() -> CausalSpec {
        CausalSpec {
            treatment: "t".into(),
            outcome: "y".into(),
            common_causes: vec!["w".into()],
            instruments: vec![],
        }
    }

    /// Confounded data: w drives both t and y; the true effect of t is -0.5.
    fn confounded(n: usize, seed: u64) -> Table {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut w = Vec::with_capacity(n);
        let mut t = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for _ in 0..n {
            let wi: f64 = StandardNormal.sample(&mut rng);
            let et: f64 = StandardNormal.sample(&mut rng);
            let ey: f64 = StandardNormal.sample(&mut rng);
            let ti = 2.0 * wi + et;
            let yi = -0.5 * ti + 3.0 * wi + 0.1 * ey;
            w.push(wi);
            t.push(ti);
            y.push(yi);
        }
        Table::from_columns(vec![("t", col(&t)), ("y", col(&y)), ("w", col(&w))]).unwrap()
    }

    #[test]
    fn backdoor_recovers_true_effect_where_correlation_is_biased() {
        let table = confounded(2000, 11);
        let g = CausalGraph::from_spec(&spec()).unwrap();
        let estimand = identify_effect(&g).unwrap();
        let est = estimate_effect(&table, &estimand, &EstimateConfig::default(), None).unwrap();

        assert_relative_eq!(est.value, -0.5, epsilon = 0.02);
        assert!(est.conf_int.0 < -0.5 && -0.5 < est.conf_int.1);
        assert!(est.p_value < 1e-6);
        assert_eq!(est.n_obs, 2000);
        assert_eq!(est.formula, "y ~ t + w");
        assert_eq!(est.coefficients.len(), 3);
        assert_eq!(est.coefficients[1].name, "t");

        // Naive association has the opposite sign.
        let r = crate::stats::pearson(
            &table.numeric_values("t").unwrap(),
            &table.numeric_values("y").unwrap(),
        )
        .unwrap()
        .unwrap();
        assert!(r > 0.0, "confounded correlation should be positive, got {r}");
    }

    #[test]
    fn contrast_scales_the_effect() {
        let table = confounded(500, 3);
        let g = CausalGraph::from_spec(&spec()).unwrap();
        let estimand = identify_effect(&g).unwrap();
        let unit = estimate_effect(&table, &estimand, &EstimateConfig::default(), None).unwrap();
        let cfg = EstimateConfig { treatment_value: 2.0, control_value: 0.0, ..Default::default() };
        let double = estimate_effect(&table, &estimand, &cfg, None).unwrap();
        assert_relative_eq!(double.value, 2.0 * unit.value, epsilon = 1e-12);
        assert_relative_eq!(double.std_error, 2.0 * unit.std_error, epsilon = 1e-12);
    }

    #[test]
    fn encoded_treatment_adds_caveat() {
        let table = confounded(200, 5);
        let g = CausalGraph::from_spec(&spec()).unwrap();
        let estimand = identify_effect(&g).unwrap();
        let enc = LabelEncoding {
            column: "t".into(),
            classes: vec!["Month-to-month".into(), "One year".into(), "Two year".into()],
        };
        let est = estimate_effect(&table, &estimand, &EstimateConfig::default(), Some(&enc)).unwrap();
        assert!(est.caveats.iter().any(|c| c.contains("3 levels") && c.contains("Two year=2")));
        assert!(est.to_string().contains("Caveat:"));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let table = Table::from_columns(vec![("t", col(&[0.0, 1.0, 0.0, 1.0]))]).unwrap();
        let g = CausalGraph::from_spec(&spec()).unwrap();
        let estimand = identify_effect(&g).unwrap();
        assert!(matches!(
            estimate_effect(&table, &estimand, &EstimateConfig::default(), None),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn constant_treatment_is_computation_error() {
        let table = Table::from_columns(vec![
            ("t", col(&[1.0; 6])),
            ("y", col(&[0.0, 1.0, 0.0, 1.0, 1.0, 0.0])),
            ("w", col(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
        ])
        .unwrap();
        let g = CausalGraph::from_spec(&spec()).unwrap();
        let estimand = identify_effect(&g).unwrap();
        assert!(matches!(
            estimate_effect(&table, &estimand, &EstimateConfig::default(), None),
            Err(Error::Computation(_))
        ));
    }
}
