//! Chart artifacts built from the cleaned synthetic Telco table.

use cc_inference::causal::{CausalGraph, CausalSpec};
use cc_inference::churn::{TelcoDataConfig, generate_telco_table};
use cc_inference::preprocess::{CleaningConfig, clean_table};
use cc_viz::{
    CausalGraphArtifact, CorrArtifact, GroupedBarConfig, causal_graph_artifact, corr_artifact,
    count_artifact, grouped_bar_artifact,
};

fn cleaned() -> cc_inference::CleanedTable {
    let raw = generate_telco_table(&TelcoDataConfig { n_customers: 400, ..Default::default() })
        .unwrap();
    clean_table(raw, &CleaningConfig::default()).unwrap()
}

#[test]
fn eda_artifacts_from_cleaned_table() {
    let c = cleaned();

    let count = count_artifact(&c.table, "Churn", "Churn Distribution").unwrap();
    assert_eq!(count.total, c.table.n_rows());
    let labels: Vec<_> = count.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, ["0", "1"]);

    let grouped = grouped_bar_artifact(
        &c.table,
        "Contract",
        "tenure",
        "Churn",
        c.encoding("Contract"),
        &GroupedBarConfig::default(),
    )
    .unwrap();
    assert_eq!(grouped.categories.len(), 3);
    assert!(grouped.categories.iter().any(|l| l == "Two year"));
    for bar in &grouped.bars {
        assert!(bar.ci_lo <= bar.mean + 1e-9 && bar.mean <= bar.ci_hi + 1e-9);
    }

    let corr = corr_artifact(&c.table, "Correlation Heatmap").unwrap();
    assert_eq!(corr.names.len(), c.table.n_cols());
    for row in &corr.corr {
        for r in row.iter().flatten() {
            assert!((-1.0..=1.0).contains(r));
        }
    }
}

#[test]
fn artifacts_survive_json() {
    let c = cleaned();
    let corr = corr_artifact(&c.table, "Correlation Heatmap").unwrap();
    let json = serde_json::to_string(&corr).unwrap();
    let back: CorrArtifact = serde_json::from_str(&json).unwrap();
    assert_eq!(back.names, corr.names);
    assert_eq!(back.title, corr.title);
    assert_eq!(back.corr.len(), corr.corr.len());
    for (row_back, row) in back.corr.iter().zip(&corr.corr) {
        assert_eq!(row_back.len(), row.len());
        for (b, a) in row_back.iter().zip(row) {
            match (b, a) {
                (Some(b), Some(a)) => approx::assert_relative_eq!(*b, *a, max_relative = 1e-12),
                (None, None) => {}
                _ => panic!("undefined cell changed across JSON: {b:?} vs {a:?}"),
            }
        }
    }

    let g = CausalGraph::from_spec(&CausalSpec::default()).unwrap();
    let art = causal_graph_artifact(&g).unwrap();
    let json = serde_json::to_string_pretty(&art).unwrap();
    assert!(json.contains("\"role\": \"treatment\""));
    let back: CausalGraphArtifact = serde_json::from_str(&json).unwrap();
    assert_eq!(back, art);
}
