//! Pipeline configuration (YAML or JSON).
//!
//! Every field has a default that reproduces the stock Telco analysis, so an
//! empty file (or no file at all) runs the standard pipeline.

use anyhow::{Context, Result};
use cc_inference::{CausalSpec, CleaningConfig, EstimateConfig, RefuteConfig, VerdictMessages};
use cc_viz::GroupedBarConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    /// Raw rows printed before cleaning.
    pub preview_rows: usize,
    pub cleaning: CleaningConfig,
    pub eda: EdaConfig,
    pub causal: CausalSpec,
    pub estimate: EstimateConfig,
    pub refute: RefuteConfig,
    pub outputs: OutputFiles,
    pub render: RenderSettings,
    pub verdict: VerdictMessages,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Telco_Churn.csv"),
            out_dir: PathBuf::from("."),
            preview_rows: 5,
            cleaning: CleaningConfig::default(),
            eda: EdaConfig::default(),
            causal: CausalSpec::default(),
            estimate: EstimateConfig::default(),
            refute: RefuteConfig::default(),
            outputs: OutputFiles::default(),
            render: RenderSettings::default(),
            verdict: VerdictMessages::default(),
        }
    }
}

/// Columns and titles of the exploratory charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdaConfig {
    pub count_column: String,
    pub count_title: String,
    /// Category axis of the grouped bar chart.
    pub group_x: String,
    /// Averaged column of the grouped bar chart.
    pub group_y: String,
    /// Split (hue) column of the grouped bar chart.
    pub group_hue: String,
    pub grouped: GroupedBarConfig,
    pub corr_title: String,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            count_column: "Churn".into(),
            count_title: "Churn Distribution".into(),
            group_x: "Contract".into(),
            group_y: "tenure".into(),
            group_hue: "Churn".into(),
            grouped: GroupedBarConfig::default(),
            corr_title: "Correlation Heatmap".into(),
        }
    }
}

/// Output file names, relative to `out_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub churn_distribution: String,
    pub churn_vs_contract: String,
    pub correlation: String,
    pub causal_model: String,
    pub causal_model_dot: String,
    pub results: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            churn_distribution: "Churn_Distribution.png".into(),
            churn_vs_contract: "Churn vs Contract.png".into(),
            correlation: "Correlation_analysis.png".into(),
            causal_model: "causal_model.png".into(),
            causal_model_dot: "causal_model.dot".into(),
            results: "Causal_result.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Built-in theme name (`churncause`, `minimal`, `tableau`).
    pub theme: String,
    pub dpi: u32,
    /// Optional YAML style file layered over the theme.
    pub style: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { theme: "churncause".into(), dpi: 300, style: None }
    }
}

impl PipelineConfig {
    pub fn output_path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }

    /// Chart configuration: theme preset, then the style file, then `dpi`.
    pub fn viz_config(&self) -> Result<cc_viz_render::config::VizConfig> {
        let mut doc = match &self.render.style {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read style file {}", path.display()))?;
                serde_yaml_ng::from_str::<serde_yaml_ng::Value>(&text)
                    .with_context(|| format!("invalid style file {}", path.display()))?
            }
            None => serde_yaml_ng::Value::Null,
        };
        if !doc.is_mapping() {
            doc = serde_yaml_ng::Value::Mapping(serde_yaml_ng::Mapping::new());
        }
        // A theme named in the style file wins over `render.theme`.
        if let Some(map) = doc.as_mapping_mut() {
            if !map.contains_key("theme") {
                map.insert("theme".into(), self.render.theme.clone().into());
            }
        }
        let yaml = serde_yaml_ng::to_string(&doc)?;
        let mut viz = cc_viz_render::config::resolve_config(Some(&yaml))?;
        viz.output.dpi = self.render.dpi;
        Ok(viz)
    }
}

/// Read a pipeline config; `.json` is parsed as JSON, anything else as YAML.
pub fn read_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let cfg: PipelineConfig = if ext == "json" {
        serde_json::from_slice(&bytes)?
    } else {
        serde_yaml_ng::from_slice(&bytes)?
    };
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_analysis() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.input, PathBuf::from("Telco_Churn.csv"));
        assert_eq!(cfg.causal.treatment, "Contract");
        assert_eq!(cfg.outputs.churn_vs_contract, "Churn vs Contract.png");
        assert_eq!(cfg.render.dpi, 300);
        assert_eq!(cfg.refute.num_simulations, 100);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "input: data/telco.csv\nrefute:\n  num_simulations: 20\n  random_seed: 3\n\
                    cleaning:\n  encoding_order: sorted\n";
        let cfg: PipelineConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(cfg.input, PathBuf::from("data/telco.csv"));
        assert_eq!(cfg.refute.num_simulations, 20);
        assert_eq!(cfg.refute.random_seed, Some(3));
        assert_eq!(cfg.cleaning.encoding_order, cc_inference::EncodingOrder::Sorted);
        assert_eq!(cfg.cleaning.id_column, "customerID");
        assert_eq!(cfg.outputs.results, "Causal_result.csv");
    }

    #[test]
    fn viz_config_applies_dpi_and_theme() {
        let mut cfg = PipelineConfig::default();
        cfg.render.dpi = 72;
        cfg.render.theme = "minimal".into();
        let viz = cfg.viz_config().unwrap();
        assert_eq!(viz.output.dpi, 72);
        assert_eq!(viz.theme, "minimal");
    }
}
