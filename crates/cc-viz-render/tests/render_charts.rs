//! Render every chart kind from artifacts built on the synthetic Telco table.

use std::path::PathBuf;

use cc_inference::causal::{CausalGraph, CausalSpec};
use cc_inference::churn::{TelcoDataConfig, generate_telco_table};
use cc_inference::preprocess::{CleaningConfig, clean_table};
use cc_viz::{
    GroupedBarConfig, causal_graph_artifact, corr_artifact, count_artifact, grouped_bar_artifact,
};
use cc_viz_render::config::VizConfig;
use cc_viz_render::{RenderError, render_artifact_to_file, render_svg, render_to_bytes};

fn tmp_dir(prefix: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("{}_{}_{}", prefix, std::process::id(), nanos));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn artifact_jsons() -> Vec<(&'static str, String, &'static str)> {
    let raw = generate_telco_table(&TelcoDataConfig { n_customers: 300, ..Default::default() })
        .unwrap();
    let c = clean_table(raw, &CleaningConfig::default()).unwrap();
    let graph = CausalGraph::from_spec(&CausalSpec::default()).unwrap();
    let cfg = GroupedBarConfig { n_resamples: 100, ..Default::default() };

    vec![
        (
            "count",
            serde_json::to_string(&count_artifact(&c.table, "Churn", "Churn Distribution").unwrap())
                .unwrap(),
            "Churn Distribution",
        ),
        (
            "grouped_bar",
            serde_json::to_string(
                &grouped_bar_artifact(
                    &c.table,
                    "Contract",
                    "tenure",
                    "Churn",
                    c.encoding("Contract"),
                    &cfg,
                )
                .unwrap(),
            )
            .unwrap(),
            "Churn vs Contract Type by Churn",
        ),
        (
            "corr",
            serde_json::to_string(&corr_artifact(&c.table, "Correlation Heatmap").unwrap()).unwrap(),
            "Correlation Heatmap",
        ),
        (
            "causal_graph",
            serde_json::to_string(&causal_graph_artifact(&graph).unwrap()).unwrap(),
            "Causal Model",
        ),
    ]
}

#[test]
fn svgs_contain_titles() {
    let config = VizConfig::default();
    for (kind, json, title) in artifact_jsons() {
        let svg = render_svg(&json, kind, &config).unwrap();
        assert!(svg.starts_with("<svg"), "{kind}");
        assert!(svg.contains(title), "{kind} missing title");
        assert!(svg.trim_end().ends_with("</svg>"), "{kind}");
    }
}

#[test]
fn grouped_bar_uses_category_labels() {
    let config = VizConfig::default();
    let (kind, json, _) = artifact_jsons().swap_remove(1);
    let svg = render_svg(&json, kind, &config).unwrap();
    assert!(svg.contains("Month-to-month"));
    assert!(svg.contains("Two year"));
}

#[test]
fn unknown_kind_is_rejected() {
    let err = render_svg("{}", "pie", &VizConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::UnknownKind(_)));
    let err = render_svg("{", "count", &VizConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::Deserialize(_)));
}

#[cfg(feature = "png")]
#[test]
fn png_output_has_signature() {
    let mut config = VizConfig::default();
    config.output.dpi = 72;
    for (kind, json, _) in artifact_jsons() {
        let bytes = render_to_bytes(&json, kind, "png", &config).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]), "{kind}");
    }
}

#[test]
fn file_format_follows_extension() {
    let dir = tmp_dir("cc_viz_render");
    let graph = CausalGraph::from_spec(&CausalSpec::default()).unwrap();
    let art = causal_graph_artifact(&graph).unwrap();
    let path = dir.join("causal_model.svg");
    render_artifact_to_file(&art, "causal_graph", &path, &VizConfig::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Contract") && text.contains("Churn"));
    std::fs::remove_dir_all(&dir).ok();
}
