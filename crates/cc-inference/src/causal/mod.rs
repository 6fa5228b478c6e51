//! Causal effect estimation: graph, identification, estimation, refutation.
//!
//! The flow mirrors how the analysis is reasoned about:
//! [`CausalSpec`] → [`CausalGraph`] → [`identify_effect`] →
//! [`estimate_effect`] → [`refute_estimate`].

/// Backdoor linear-regression ATE.
pub mod estimate;
/// Causal DAG, d-separation, DOT export.
pub mod graph;
/// Backdoor / IV / front-door identification.
pub mod identify;
/// Placebo and random-common-cause refuters.
pub mod refute;

pub use estimate::{CausalEstimate, Coefficient, EstimateConfig, estimate_effect};
pub use graph::{CausalGraph, CausalNode, CausalSpec, NodeRole};
pub use identify::{EstimandType, IdentifiedEstimand, identify_effect};
pub use refute::{
    RefutationResult, RefuteConfig, Refuter, refute_estimate, refute_placebo_treatment,
    refute_random_common_cause, significance_p_value,
};
