//! # cc-viz
//!
//! Chart artifacts for ChurnCause.
//!
//! This crate is intentionally dependency-light and focuses on emitting
//! plot-friendly structures (flat arrays, labels resolved) that the renderer
//! turns into images. Nothing here draws.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::{SystemTime, UNIX_EPOCH};

use cc_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Causal diagram artifact (nodes with layers + edges).
pub mod causal_graph;
/// Row counts per value of one column.
pub mod count;
/// Pairwise correlation heatmap artifact.
pub mod corr;
/// Grouped mean bars with bootstrap intervals.
pub mod grouped;

pub use causal_graph::{CausalGraphArtifact, GraphEdge, GraphNode, causal_graph_artifact};
pub use corr::{CorrArtifact, corr_artifact};
pub use count::{CountArtifact, CountBar, count_artifact};
pub use grouped::{GroupedBar, GroupedBarArtifact, GroupedBarConfig, grouped_bar_artifact};

/// Provenance block shared by every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Producing tool.
    pub tool: String,
    /// Producing tool version.
    pub tool_version: String,
    /// Creation time (Unix epoch, milliseconds).
    pub created_unix_ms: u128,
}

impl ArtifactMeta {
    /// Metadata stamped with the current time.
    pub fn now() -> Result<Self> {
        Ok(Self {
            tool: "churncause".to_string(),
            tool_version: cc_core::VERSION.to_string(),
            created_unix_ms: now_unix_ms()?,
        })
    }
}

fn now_unix_ms() -> Result<u128> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Computation(format!("system time error: {}", e)))?;
    Ok(d.as_millis())
}

/// Tick label for a numeric category value (`1.0` → `"1"`).
pub(crate) fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 { format!("{}", v as i64) } else { format!("{v}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_values_format_without_decimals() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(2.5), "2.5");
    }
}
