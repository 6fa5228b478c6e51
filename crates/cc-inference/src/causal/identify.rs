//! Graph-structural identification of the average treatment effect.

use std::fmt;

use cc_core::{Error, Result};
use serde::Serialize;

use super::graph::CausalGraph;

/// Kind of causal quantity being identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimandType {
    /// Non-parametric average treatment effect.
    NonparametricAte,
}

impl fmt::Display for EstimandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimandType::NonparametricAte => f.write_str("nonparametric-ate"),
        }
    }
}

/// Result of identification: which adjustment strategies the graph supports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifiedEstimand {
    /// Estimand kind.
    pub estimand_type: EstimandType,
    /// Treatment variable.
    pub treatment: String,
    /// Outcome variable.
    pub outcome: String,
    /// Valid backdoor adjustment set, if one was found.
    pub backdoor: Option<Vec<String>>,
    /// Valid instrumental variables.
    pub instruments: Vec<String>,
    /// Front-door mediator set (empty when none qualifies).
    pub frontdoor: Vec<String>,
}

impl IdentifiedEstimand {
    /// Backdoor adjustment set, or an identification error when the graph has none.
    pub fn require_backdoor(&self) -> Result<&[String]> {
        self.backdoor.as_deref().ok_or_else(|| {
            Error::Identification(format!(
                "no valid backdoor adjustment set for {} -> {}",
                self.treatment, self.outcome
            ))
        })
    }

    /// `d/d[T] (E[Y | W...])`.
    pub fn backdoor_expression(&self) -> Option<String> {
        self.backdoor.as_ref().map(|w| {
            if w.is_empty() {
                format!("d/d[{}] (E[{}])", self.treatment, self.outcome)
            } else {
                format!("d/d[{}] (E[{} | {}])", self.treatment, self.outcome, w.join(","))
            }
        })
    }

    fn iv_expression(&self) -> Option<String> {
        if self.instruments.is_empty() {
            return None;
        }
        let z = self.instruments.join(",");
        Some(format!(
            "E[d{y}/d[{z}] * (d[{t}]/d[{z}])^-1]",
            y = self.outcome,
            t = self.treatment
        ))
    }

    fn frontdoor_expression(&self) -> Option<String> {
        if self.frontdoor.is_empty() {
            return None;
        }
        let m = self.frontdoor.join(",");
        Some(format!(
            "E[d{y}/d[{m}] * d[{m}]/d[{t}]]",
            y = self.outcome,
            t = self.treatment
        ))
    }
}

impl fmt::Display for IdentifiedEstimand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Estimand type: {}", self.estimand_type)?;

        writeln!(f, "\n### Estimand : 1")?;
        writeln!(f, "Estimand name: backdoor")?;
        match (self.backdoor_expression(), &self.backdoor) {
            (Some(expr), Some(w)) => {
                writeln!(f, "Estimand expression:\n  {expr}")?;
                let given = if w.is_empty() { String::new() } else { format!(",{}", w.join(",")) };
                writeln!(
                    f,
                    "Estimand assumption 1, Unconfoundedness: If U->{{{t}}} and U->{y} then \
                     P({y}|{t}{given},U) = P({y}|{t}{given})",
                    t = self.treatment,
                    y = self.outcome,
                )?;
            }
            _ => writeln!(f, "No such variable(s) found!")?,
        }

        writeln!(f, "\n### Estimand : 2")?;
        writeln!(f, "Estimand name: iv")?;
        match self.iv_expression() {
            Some(expr) => writeln!(f, "Estimand expression:\n  {expr}")?,
            None => writeln!(f, "No such variable(s) found!")?,
        }

        writeln!(f, "\n### Estimand : 3")?;
        writeln!(f, "Estimand name: frontdoor")?;
        match self.frontdoor_expression() {
            Some(expr) => write!(f, "Estimand expression:\n  {expr}"),
            None => write!(f, "No such variable(s) found!"),
        }
    }
}

/// Identify the effect of the graph's treatment on its outcome.
///
/// Assumes no unobserved confounding beyond what the graph shows and no
/// selection bias. Fails when no directed treatment → outcome path exists.
pub fn identify_effect(graph: &CausalGraph) -> Result<IdentifiedEstimand> {
    let t = graph.treatment().to_string();
    let y = graph.outcome().to_string();

    if !graph.has_directed_path(&t, &y)? {
        return Err(Error::Identification(format!(
            "causal graph has no directed path from '{t}' to '{y}'"
        )));
    }

    let cut = graph.without_outgoing(&t)?;
    let instruments = find_instruments(graph, &cut, &t, &y)?;
    let backdoor = find_backdoor_set(graph, &cut, &t, &y, &instruments)?;
    let frontdoor = find_frontdoor_set(graph, &cut, &t, &y)?;

    match &backdoor {
        Some(w) => tracing::info!(treatment = %t, outcome = %y, adjustment = ?w, "backdoor set identified"),
        None => tracing::warn!(treatment = %t, outcome = %y, "no valid backdoor set"),
    }

    Ok(IdentifiedEstimand {
        estimand_type: EstimandType::NonparametricAte,
        treatment: t,
        outcome: y,
        backdoor,
        instruments,
        frontdoor,
    })
}

/// Declared instruments that are parents of the treatment and have no
/// path to the outcome except through it.
fn find_instruments(
    graph: &CausalGraph,
    cut: &CausalGraph,
    t: &str,
    y: &str,
) -> Result<Vec<String>> {
    use super::graph::NodeRole;

    let mut out = Vec::new();
    for z in graph.parents(t)? {
        if graph.role(&z) != Some(NodeRole::Instrument) {
            continue;
        }
        if cut.d_separated(&[z.as_str()], &[y], &[])? {
            out.push(z);
        } else {
            tracing::debug!(instrument = %z, "declared instrument is not d-separated from the outcome");
        }
    }
    Ok(out)
}

/// Parents of the treatment (minus valid instruments), checked against the
/// backdoor criterion.
fn find_backdoor_set(
    graph: &CausalGraph,
    cut: &CausalGraph,
    t: &str,
    y: &str,
    instruments: &[String],
) -> Result<Option<Vec<String>>> {
    let descendants = graph.descendants(t)?;
    let candidate: Vec<String> = graph
        .parents(t)?
        .into_iter()
        .filter(|p| !instruments.contains(p) && !descendants.contains(p))
        .collect();

    let given: Vec<&str> = candidate.iter().map(String::as_str).collect();
    if cut.d_separated(&[t], &[y], &given)? { Ok(Some(candidate)) } else { Ok(None) }
}

/// Children of the treatment satisfying the front-door criterion.
fn find_frontdoor_set(
    graph: &CausalGraph,
    cut: &CausalGraph,
    t: &str,
    y: &str,
) -> Result<Vec<String>> {
    let children = graph.children(t)?;
    if children.iter().any(|c| c == y) {
        return Ok(Vec::new());
    }
    let mediators: Vec<String> = children
        .into_iter()
        .filter(|m| graph.has_directed_path(m, y).unwrap_or(false))
        .collect();
    if mediators.is_empty() {
        return Ok(Vec::new());
    }

    // No unblocked backdoor path from the treatment into any mediator.
    for m in &mediators {
        if !cut.d_separated(&[t], &[m.as_str()], &[])? {
            return Ok(Vec::new());
        }
    }
    // Every backdoor path from the mediators to the outcome is blocked by the treatment.
    let m_cut = graph.without_outgoing_all(&mediators)?;
    let ms: Vec<&str> = mediators.iter().map(String::as_str).collect();
    if !m_cut.d_separated(&ms, &[y], &[t])? {
        return Ok(Vec::new());
    }
    Ok(mediators)
}
