//! Churn-specific reporting and synthetic data.
//!
//! ## Components
//!
//! - **Verdict**: turns the sign of the causal effect into the business
//!   statement printed at the end of a run.
//! - **Correlation vs. causation**: the raw Pearson correlation between
//!   treatment and outcome next to the adjusted estimate.
//! - **Synthetic Telco dataset**: deterministic, seeded customer table with
//!   the same columns and quirks as the Telco churn export.

use cc_core::{Column, Error, Result, Table};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::causal::CausalEstimate;
use crate::stats::pearson;

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Business conclusion drawn from the estimated effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The effect is negative: the treatment reduces churn.
    Reduces,
    /// The effect is zero or positive.
    DoesNotReduce,
}

impl Verdict {
    /// `Reduces` iff `effect < 0`.
    pub fn from_effect(effect: f64) -> Self {
        if effect < 0.0 { Verdict::Reduces } else { Verdict::DoesNotReduce }
    }

    /// Message for this verdict.
    pub fn message<'a>(&self, messages: &'a VerdictMessages) -> &'a str {
        match self {
            Verdict::Reduces => &messages.reduces,
            Verdict::DoesNotReduce => &messages.does_not_reduce,
        }
    }
}

/// Text printed for each verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictMessages {
    /// Printed when the effect is negative.
    pub reduces: String,
    /// Printed otherwise.
    pub does_not_reduce: String,
}

impl Default for VerdictMessages {
    fn default() -> Self {
        Self {
            reduces: "Long-term contracts causally reduce customer churn.".into(),
            does_not_reduce: "Contract type does not causally reduce churn.".into(),
        }
    }
}

/// Raw association next to the adjusted causal effect.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationVsCausation {
    /// Treatment variable.
    pub treatment: String,
    /// Outcome variable.
    pub outcome: String,
    /// Pearson correlation of treatment and outcome (`NaN` if either is constant).
    pub correlation: f64,
    /// Causal effect (ATE).
    pub causal_effect: f64,
    /// Verdict derived from the causal effect.
    pub verdict: Verdict,
}

/// Compare the raw correlation of treatment and outcome with the estimate.
pub fn compare_correlation_and_effect(
    table: &Table,
    estimate: &CausalEstimate,
) -> Result<CorrelationVsCausation> {
    let t = table.numeric_values(&estimate.treatment)?;
    let y = table.numeric_values(&estimate.outcome)?;
    let correlation = pearson(&t, &y)?.unwrap_or_else(|| {
        tracing::warn!(
            treatment = %estimate.treatment,
            outcome = %estimate.outcome,
            "correlation undefined (constant column)"
        );
        f64::NAN
    });
    Ok(CorrelationVsCausation {
        treatment: estimate.treatment.clone(),
        outcome: estimate.outcome.clone(),
        correlation,
        causal_effect: estimate.value,
        verdict: Verdict::from_effect(estimate.value),
    })
}

// ---------------------------------------------------------------------------
// Synthetic Telco-style dataset
// ---------------------------------------------------------------------------

/// Contract labels in increasing commitment.
pub const CONTRACT_TYPES: [&str; 3] = ["Month-to-month", "One year", "Two year"];
/// Internet service labels.
pub const INTERNET_SERVICES: [&str; 3] = ["DSL", "Fiber optic", "No"];

/// Configuration of the synthetic dataset generator.
#[derive(Debug, Clone)]
pub struct TelcoDataConfig {
    /// Number of customers.
    pub n_customers: usize,
    /// Fraction of brand-new customers (tenure 0, blank `TotalCharges`).
    pub new_customer_fraction: f64,
    /// Change in churn log-odds per step of contract commitment (negative = protective).
    pub contract_log_odds: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for TelcoDataConfig {
    fn default() -> Self {
        Self { n_customers: 1000, new_customer_fraction: 0.01, contract_log_odds: -1.1, seed: 42 }
    }
}

fn customer_id<R: Rng>(rng: &mut R) -> String {
    let digits = rng.random_range(0..10_000u32);
    let letters: String = (0..5).map(|_| char::from(b'A' + rng.random_range(0..26u8))).collect();
    format!("{digits:04}-{letters}")
}

fn pick<'a, R: Rng>(rng: &mut R, labels: &[&'a str], cumulative: &[f64]) -> (usize, &'a str) {
    let u: f64 = rng.random();
    let k = cumulative.iter().position(|&c| u < c).unwrap_or(labels.len() - 1);
    (k, labels[k])
}

fn yes_no(flag: bool) -> Option<String> {
    let label = if flag { "Yes" } else { "No" };
    Some(label.to_string())
}

/// Generate a seeded Telco-style churn table.
///
/// Tenure drives contract choice, and tenure, monthly charges, internet
/// service and contract all drive churn, so contract is confounded by
/// tenure exactly as in the real data. Columns: `customerID`, `gender`,
/// `SeniorCitizen`, `Partner`, `tenure`, `InternetService`, `Contract`,
/// `PaperlessBilling`, `MonthlyCharges`, `TotalCharges` (text, blank for
/// tenure 0), `Churn` (`Yes`/`No`).
pub fn generate_telco_table(config: &TelcoDataConfig) -> Result<Table> {
    if config.n_customers == 0 {
        return Err(Error::Validation("n_customers must be > 0".into()));
    }
    if !(0.0..=1.0).contains(&config.new_customer_fraction) {
        return Err(Error::Validation("new_customer_fraction must be in [0, 1]".into()));
    }
    if !config.contract_log_odds.is_finite() {
        return Err(Error::Validation("contract_log_odds must be finite".into()));
    }

    let n = config.n_customers;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut ids = Vec::with_capacity(n);
    let mut gender = Vec::with_capacity(n);
    let mut senior = Vec::with_capacity(n);
    let mut partner = Vec::with_capacity(n);
    let mut tenure = Vec::with_capacity(n);
    let mut internet = Vec::with_capacity(n);
    let mut contract = Vec::with_capacity(n);
    let mut paperless = Vec::with_capacity(n);
    let mut monthly = Vec::with_capacity(n);
    let mut total = Vec::with_capacity(n);
    let mut churn = Vec::with_capacity(n);

    for _ in 0..n {
        ids.push(Some(customer_id(&mut rng)));
        let sex = if rng.random_bool(0.5) { "Female" } else { "Male" };
        gender.push(Some(sex.to_string()));
        let is_senior = rng.random_bool(0.16);
        senior.push(Some(if is_senior { 1.0 } else { 0.0 }));
        partner.push(yes_no(rng.random_bool(0.48)));

        let months: u32 = if rng.random::<f64>() < config.new_customer_fraction {
            0
        } else {
            rng.random_range(1..=72)
        };
        tenure.push(Some(f64::from(months)));

        let (svc, svc_label) = pick(&mut rng, &INTERNET_SERVICES, &[0.35, 0.80]);
        internet.push(Some(svc_label.to_string()));

        // Longer-tenured customers commit to longer contracts.
        let noise: f64 = StandardNormal.sample(&mut rng);
        let score = 2.0 * f64::from(months) / 72.0 - 0.5 + 0.8 * noise;
        let level = if score < 0.5 {
            0
        } else if score < 1.3 {
            1
        } else {
            2
        };
        contract.push(Some(CONTRACT_TYPES[level].to_string()));
        paperless.push(yes_no(rng.random_bool(0.6)));

        let base = [55.0, 85.0, 22.0][svc];
        let jitter: f64 = StandardNormal.sample(&mut rng);
        let charge = ((base + 10.0 * jitter).clamp(18.25, 118.75) * 100.0).round() / 100.0;
        monthly.push(Some(charge));

        total.push(Some(if months == 0 {
            " ".to_string()
        } else {
            let factor = 0.95 + 0.1 * rng.random::<f64>();
            format!("{:.2}", f64::from(months) * charge * factor)
        }));

        let fiber = if svc == 1 { 1.0 } else { 0.0 };
        let logit = -0.3 - 0.035 * f64::from(months)
            + 0.02 * (charge - 65.0)
            + config.contract_log_odds * level as f64
            + 0.35 * fiber
            + if is_senior { 0.3 } else { 0.0 };
        let p = 1.0 / (1.0 + (-logit).exp());
        churn.push(yes_no(rng.random::<f64>() < p));
    }

    let table = Table::from_columns(vec![
        ("customerID", Column::Text(ids)),
        ("gender", Column::Text(gender)),
        ("SeniorCitizen", Column::Numeric(senior)),
        ("Partner", Column::Text(partner)),
        ("tenure", Column::Numeric(tenure)),
        ("InternetService", Column::Text(internet)),
        ("Contract", Column::Text(contract)),
        ("PaperlessBilling", Column::Text(paperless)),
        ("MonthlyCharges", Column::Numeric(monthly)),
        ("TotalCharges", Column::Text(total)),
        ("Churn", Column::Text(churn)),
    ])?;
    tracing::debug!(rows = table.n_rows(), seed = config.seed, "generated synthetic telco table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::causal::{CausalGraph, CausalSpec, EstimateConfig, estimate_effect, identify_effect};
    use crate::preprocess::{CleaningConfig, EncodingOrder, clean_table};

    #[test]
    fn verdict_follows_sign() {
        assert_eq!(Verdict::from_effect(-0.01), Verdict::Reduces);
        assert_eq!(Verdict::from_effect(0.0), Verdict::DoesNotReduce);
        assert_eq!(Verdict::from_effect(0.2), Verdict::DoesNotReduce);
        let m = VerdictMessages::default();
        assert_eq!(
            Verdict::Reduces.message(&m),
            "Long-term contracts causally reduce customer churn."
        );
        assert_eq!(
            Verdict::DoesNotReduce.message(&m),
            "Contract type does not causally reduce churn."
        );
    }

    #[test]
    fn generator_is_deterministic_and_shaped() {
        let cfg = TelcoDataConfig { n_customers: 300, ..Default::default() };
        let a = generate_telco_table(&cfg).unwrap();
        let b = generate_telco_table(&cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_rows(), 300);
        assert_eq!(a.n_cols(), 11);
        let other = generate_telco_table(&TelcoDataConfig { seed: 7, ..cfg }).unwrap();
        assert_ne!(a, other);
        assert!(generate_telco_table(&TelcoDataConfig { n_customers: 0, ..Default::default() })
            .is_err());
    }

    #[test]
    fn blank_total_charges_for_new_customers() {
        let cfg = TelcoDataConfig { n_customers: 200, new_customer_fraction: 0.2, ..Default::default() };
        let t = generate_telco_table(&cfg).unwrap();
        let tenure = t.numeric_values("tenure").unwrap();
        let total = t.require("TotalCharges").unwrap().as_text().unwrap().to_vec();
        let mut blanks = 0;
        for (m, tc) in tenure.iter().zip(&total) {
            if *m == 0.0 {
                assert_eq!(tc.as_deref(), Some(" "));
                blanks += 1;
            } else {
                assert!(tc.as_deref().unwrap().parse::<f64>().is_ok());
            }
        }
        assert!(blanks > 0);
    }

    #[test]
    fn end_to_end_on_synthetic_data_reduces_churn() {
        let raw = generate_telco_table(&TelcoDataConfig { n_customers: 3000, ..Default::default() })
            .unwrap();
        let cleaning = CleaningConfig { encoding_order: EncodingOrder::Sorted, ..Default::default() };
        let cleaned = clean_table(raw, &cleaning).unwrap();

        let graph = CausalGraph::from_spec(&CausalSpec::default()).unwrap();
        let estimand = identify_effect(&graph).unwrap();
        let estimate = estimate_effect(
            &cleaned.table,
            &estimand,
            &EstimateConfig::default(),
            cleaned.encoding("Contract"),
        )
        .unwrap();
        let cmp = compare_correlation_and_effect(&cleaned.table, &estimate).unwrap();

        assert!(estimate.value < 0.0, "ATE {}", estimate.value);
        assert_eq!(cmp.verdict, Verdict::Reduces);
        assert!((-1.0..=1.0).contains(&cmp.correlation));
        // Longer contracts also go with less churn in the raw data.
        assert!(cmp.correlation < 0.0);
    }
}
