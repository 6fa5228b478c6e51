//! One-row results file: `Correlation,Causal_Effect_ATE`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CausalResultRow {
    #[serde(rename = "Correlation")]
    pub correlation: f64,
    #[serde(rename = "Causal_Effect_ATE")]
    pub causal_effect_ate: f64,
}

pub fn write_results_csv(path: &Path, row: &CausalResultRow) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.serialize(row)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), "results written");
    Ok(())
}

pub fn read_results_csv(path: &Path) -> Result<CausalResultRow> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = reader.deserialize::<CausalResultRow>();
    let row = rows.next().with_context(|| format!("{} has no result row", path.display()))??;
    if rows.next().is_some() {
        anyhow::bail!("{} has more than one result row", path.display());
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn round_trip_preserves_pair() {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let path = std::env::temp_dir()
            .join(format!("churncause_results_{}_{}.csv", std::process::id(), nanos));
        let row = CausalResultRow { correlation: -0.3967, causal_effect_ate: -0.0612345678901 };
        write_results_csv(&path, &row).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Correlation,Causal_Effect_ATE\n"));
        assert_eq!(text.lines().count(), 2);

        let back = read_results_csv(&path).unwrap();
        assert_relative_eq!(back.correlation, row.correlation);
        assert_relative_eq!(back.causal_effect_ate, row.causal_effect_ate);
        std::fs::remove_file(&path).ok();
    }
}
