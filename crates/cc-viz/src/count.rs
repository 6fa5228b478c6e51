//! Count-plot artifact: number of rows per distinct value of one column.

use cc_core::{Column, Error, Result, Table};
use serde::{Deserialize, Serialize};

use crate::{ArtifactMeta, format_value};

/// Bars of a count plot, in axis order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Chart title.
    pub title: String,
    /// Counted column (x-axis label).
    pub column: String,
    /// Total number of counted rows.
    pub total: usize,
    /// One bar per distinct value.
    pub bars: Vec<CountBar>,
}

/// One bar of a count plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountBar {
    /// Tick label.
    pub label: String,
    /// Number of rows with this value.
    pub count: usize,
    /// `count / total`.
    pub fraction: f64,
}

/// Count rows per value of `column`.
///
/// Numeric values are ordered ascending; text values keep first-seen order.
/// Missing cells are skipped.
pub fn count_artifact(table: &Table, column: &str, title: &str) -> Result<CountArtifact> {
    let col = table.require(column)?;

    let mut counted: Vec<(String, usize)> = Vec::new();
    match col {
        Column::Numeric(values) => {
            let mut present: Vec<f64> = values.iter().flatten().copied().collect();
            if present.iter().any(|v| !v.is_finite()) {
                return Err(Error::Validation(format!("column '{column}' has non-finite values")));
            }
            present.sort_by(f64::total_cmp);
            for v in present {
                match counted.last_mut() {
                    Some((label, n)) if *label == format_value(v) => *n += 1,
                    _ => counted.push((format_value(v), 1)),
                }
            }
        }
        Column::Text(values) => {
            for v in values.iter().flatten() {
                match counted.iter_mut().find(|(label, _)| label == v) {
                    Some((_, n)) => *n += 1,
                    None => counted.push((v.clone(), 1)),
                }
            }
        }
    }

    let total: usize = counted.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Err(Error::Validation(format!("column '{column}' has no values to count")));
    }
    let bars = counted
        .into_iter()
        .map(|(label, count)| CountBar { label, count, fraction: count as f64 / total as f64 })
        .collect();

    Ok(CountArtifact {
        schema_version: "churncause_count_v0".to_string(),
        meta: ArtifactMeta::now()?,
        title: title.to_string(),
        column: column.to_string(),
        total,
        bars,
    })
}
