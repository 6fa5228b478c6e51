//! Refutation checks for a backdoor estimate.
//!
//! - **Placebo treatment**: the treatment column is permuted, which breaks
//!   any causal link; the re-estimated effect should collapse toward zero.
//! - **Random common cause**: an independent standard-normal covariate is
//!   added to the adjustment set; the estimate should not move.
//!
//! Both run `num_simulations` times and report the mean new effect plus a
//! p-value for the original estimate against the simulated distribution.
//! Nothing is judged pass/fail here.

use std::fmt;

use cc_core::{Error, Result, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::estimate::{CausalEstimate, backdoor_regression};
use super::identify::IdentifiedEstimand;
use crate::stats::{mean, std_dev};

/// Simulations at or above which the empirical p-value is used.
const BOOTSTRAP_MIN_SIMULATIONS: usize = 100;

/// Refutation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefuteConfig {
    /// Re-estimations per refuter.
    pub num_simulations: usize,
    /// RNG seed; `None` draws from OS entropy.
    pub random_seed: Option<u64>,
}

impl Default for RefuteConfig {
    fn default() -> Self {
        Self { num_simulations: 100, random_seed: None }
    }
}

impl RefuteConfig {
    fn rng(&self, salt: u64) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(salt)),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Which perturbation was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refuter {
    /// Treatment replaced by a random permutation of itself.
    PlaceboTreatment,
    /// Independent random confounder added.
    RandomCommonCause,
}

impl Refuter {
    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Refuter::PlaceboTreatment => "Use a Placebo Treatment",
            Refuter::RandomCommonCause => "Add a random common cause",
        }
    }
}

/// Outcome of one refutation check.
#[derive(Debug, Clone, Serialize)]
pub struct RefutationResult {
    /// Refuter applied.
    pub refuter: Refuter,
    /// Original estimate.
    pub estimated_effect: f64,
    /// Mean estimate over the simulations.
    pub new_effect: f64,
    /// p-value of the original estimate under the simulated distribution.
    pub p_value: f64,
    /// Number of simulations.
    pub num_simulations: usize,
    /// Per-simulation estimates.
    pub simulated_effects: Vec<f64>,
}

impl fmt::Display for RefutationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Refute: {}", self.refuter.title())?;
        writeln!(f, "Estimated effect:{}", self.estimated_effect)?;
        writeln!(f, "New effect:{}", self.new_effect)?;
        write!(f, "p value:{}", self.p_value)
    }
}

/// Two-sided p-value of `estimate` against simulated effects.
///
/// Empirical with at least 100 simulations, otherwise a normal approximation
/// from the simulations' mean and standard deviation.
pub fn significance_p_value(estimate: f64, simulations: &[f64]) -> Result<f64> {
    if simulations.is_empty() {
        return Err(Error::Validation("no simulations to test against".into()));
    }

    if simulations.len() >= BOOTSTRAP_MIN_SIMULATIONS {
        let n = simulations.len() as f64;
        let below = simulations.iter().filter(|&&s| s <= estimate).count() as f64;
        let above = simulations.iter().filter(|&&s| s >= estimate).count() as f64;
        return Ok((2.0 * below.min(above) / n).min(1.0));
    }

    let mu = mean(simulations);
    let sd = std_dev(simulations);
    if !(sd.is_finite() && sd > 0.0) {
        return Ok(if estimate == mu { 1.0 } else { 0.0 });
    }
    let normal = Normal::new(mu, sd)
        .map_err(|e| Error::Computation(format!("normal distribution: {e}")))?;
    let tail = if estimate <= mu { normal.cdf(estimate) } else { 1.0 - normal.cdf(estimate) };
    Ok((2.0 * tail).min(1.0))
}

struct BackdoorData {
    t: Vec<f64>,
    y: Vec<f64>,
    w: Vec<Vec<f64>>,
    contrast: f64,
}

impl BackdoorData {
    fn load(table: &Table, estimand: &IdentifiedEstimand, estimate: &CausalEstimate) -> Result<Self> {
        let adjustment = estimand.require_backdoor()?;
        Ok(Self {
            t: table.numeric_values(&estimand.treatment)?,
            y: table.numeric_values(&estimand.outcome)?,
            w: adjustment.iter().map(|c| table.numeric_values(c)).collect::<Result<_>>()?,
            contrast: estimate.treatment_value - estimate.control_value,
        })
    }

    fn effect(&self, t: &[f64], extra: Option<&[f64]>) -> Result<f64> {
        let mut w: Vec<&[f64]> = self.w.iter().map(Vec::as_slice).collect();
        if let Some(e) = extra {
            w.push(e);
        }
        let fit = backdoor_regression(t, &self.y, &w)?;
        Ok(fit.coefficients[1] * self.contrast)
    }
}

fn finish(
    refuter: Refuter,
    estimate: &CausalEstimate,
    simulated_effects: Vec<f64>,
) -> Result<RefutationResult> {
    let new_effect = mean(&simulated_effects);
    let p_value = significance_p_value(estimate.value, &simulated_effects)?;
    tracing::info!(
        refuter = refuter.title(),
        estimated = estimate.value,
        new_effect,
        p_value,
        "refutation finished"
    );
    Ok(RefutationResult {
        refuter,
        estimated_effect: estimate.value,
        new_effect,
        p_value,
        num_simulations: simulated_effects.len(),
        simulated_effects,
    })
}

fn check_config(config: &RefuteConfig) -> Result<()> {
    if config.num_simulations == 0 {
        return Err(Error::Validation("num_simulations must be > 0".into()));
    }
    Ok(())
}

/// Re-estimate with the treatment randomly permuted.
pub fn refute_placebo_treatment(
    table: &Table,
    estimand: &IdentifiedEstimand,
    estimate: &CausalEstimate,
    config: &RefuteConfig,
) -> Result<RefutationResult> {
    check_config(config)?;
    let data = BackdoorData::load(table, estimand, estimate)?;
    let mut rng = config.rng(0);
    let mut placebo = data.t.clone();

    let mut effects = Vec::with_capacity(config.num_simulations);
    for i in 0..config.num_simulations {
        placebo.shuffle(&mut rng);
        let e = data.effect(&placebo, None)?;
        tracing::trace!(simulation = i, effect = e, "placebo re-estimate");
        effects.push(e);
    }
    finish(Refuter::PlaceboTreatment, estimate, effects)
}

/// Re-estimate with an independent standard-normal confounder added.
pub fn refute_random_common_cause(
    table: &Table,
    estimand: &IdentifiedEstimand,
    estimate: &CausalEstimate,
    config: &RefuteConfig,
) -> Result<RefutationResult> {
    check_config(config)?;
    let data = BackdoorData::load(table, estimand, estimate)?;
    let mut rng = config.rng(1);
    let mut noise = vec![0.0; data.y.len()];

    let mut effects = Vec::with_capacity(config.num_simulations);
    for i in 0..config.num_simulations {
        for v in noise.iter_mut() {
            *v = StandardNormal.sample(&mut rng);
        }
        let e = data.effect(&data.t, Some(&noise))?;
        tracing::trace!(simulation = i, effect = e, "random common cause re-estimate");
        effects.push(e);
    }
    finish(Refuter::RandomCommonCause, estimate, effects)
}

/// Run one refuter by kind.
pub fn refute_estimate(
    table: &Table,
    estimand: &IdentifiedEstimand,
    estimate: &CausalEstimate,
    refuter: Refuter,
    config: &RefuteConfig,
) -> Result<RefutationResult> {
    match refuter {
        Refuter::PlaceboTreatment => refute_placebo_treatment(table, estimand, estimate, config),
        Refuter::RandomCommonCause => refute_random_common_cause(table, estimand, estimate, config),
    }
}
