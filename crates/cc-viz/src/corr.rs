//! Correlation heatmap artifact (numbers-first).

use cc_core::{Result, Table};
use cc_inference::stats::correlation_matrix;
use serde::{Deserialize, Serialize};

use crate::ArtifactMeta;

/// Pairwise Pearson correlations of every numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Chart title.
    pub title: String,
    /// Column names (row and column order).
    pub names: Vec<String>,
    /// Row-major matrix; `None` where a column has zero variance.
    pub corr: Vec<Vec<Option<f64>>>,
}

impl CorrArtifact {
    /// Number of undefined cells.
    pub fn n_undefined(&self) -> usize {
        self.corr.iter().flatten().filter(|c| c.is_none()).count()
    }
}

/// Build the heatmap artifact from a cleaned table.
pub fn corr_artifact(table: &Table, title: &str) -> Result<CorrArtifact> {
    let m = correlation_matrix(table)?;
    let art = CorrArtifact {
        schema_version: "churncause_corr_v0".to_string(),
        meta: ArtifactMeta::now()?,
        title: title.to_string(),
        names: m.names,
        corr: m.values,
    };
    if art.n_undefined() > 0 {
        tracing::warn!(cells = art.n_undefined(), "correlation undefined for constant columns");
    }
    Ok(art)
}
