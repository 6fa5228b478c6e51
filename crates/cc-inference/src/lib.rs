//! # cc-inference
//!
//! Statistics and causal inference for ChurnCause.
//!
//! This crate provides:
//! - cleaning and label encoding of the raw customer table,
//! - descriptive statistics (correlation, bootstrap intervals),
//! - ordinary least squares with classical standard errors,
//! - the causal pipeline: graph, identification, backdoor estimation, refutation,
//! - churn reporting (verdict) and a seeded synthetic dataset.
//!
//! All functions take and return explicit values; nothing here touches the
//! filesystem.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Causal graph, identification, estimation and refutation.
pub mod causal;
/// Verdict, correlation-vs-causation summary, synthetic Telco data.
pub mod churn;
/// Cleaning and label encoding.
pub mod preprocess;
/// Ordinary least squares.
pub mod regression;
/// Descriptive statistics.
pub mod stats;

pub use causal::{
    CausalEstimate, CausalGraph, CausalSpec, EstimateConfig, IdentifiedEstimand,
    RefutationResult, RefuteConfig, Refuter, estimate_effect, identify_effect, refute_estimate,
};
pub use churn::{
    CorrelationVsCausation, TelcoDataConfig, Verdict, VerdictMessages,
    compare_correlation_and_effect, generate_telco_table,
};
pub use preprocess::{
    CleanedTable, CleaningConfig, CleaningReport, EncodingOrder, LabelEncoding, TargetMapping,
    clean_table,
};
pub use regression::{OlsFit, ols_fit};
pub use stats::{CorrelationMatrix, correlation_matrix, pearson};
