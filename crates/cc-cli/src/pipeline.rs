//! Stage functions of the churn analysis and the `run` orchestration.
//!
//! Each stage takes explicit values and returns new ones; the only shared
//! input is the [`PipelineConfig`].

use anyhow::{Context, Result};
use cc_core::Table;
use cc_inference::{
    CausalEstimate, CausalGraph, CleanedTable, CleaningReport, CorrelationVsCausation,
    IdentifiedEstimand, RefutationResult, Refuter, clean_table, compare_correlation_and_effect,
    estimate_effect, identify_effect, refute_estimate,
};
use cc_viz_render::config::VizConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::ingest::read_csv_table;
use crate::results::{CausalResultRow, read_results_csv, write_results_csv};

/// Identification, estimation, refutations and the verdict for one table.
#[derive(Debug, Clone, Serialize)]
pub struct CausalAnalysis {
    pub estimand: IdentifiedEstimand,
    pub estimate: CausalEstimate,
    pub refutations: Vec<RefutationResult>,
    pub comparison: CorrelationVsCausation,
    pub verdict_message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub cleaning: CleaningReport,
    #[serde(flatten)]
    pub analysis: CausalAnalysis,
    /// The row as read back from the results file.
    pub results: CausalResultRow,
    pub artifacts: Vec<String>,
}

pub fn load(cfg: &PipelineConfig) -> Result<Table> {
    read_csv_table(&cfg.input).with_context(|| format!("failed to load {}", cfg.input.display()))
}

pub fn clean(raw: Table, cfg: &PipelineConfig) -> Result<CleanedTable> {
    let rows = raw.n_rows();
    let cleaned = clean_table(raw, &cfg.cleaning).context("cleaning failed")?;
    tracing::info!(rows_in = rows, rows_out = cleaned.table.n_rows(), "cleaning done");
    Ok(cleaned)
}

fn ensure_out_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))
}

/// Count plot, grouped bar plot and correlation heatmap.
pub fn render_eda(
    cleaned: &CleanedTable,
    cfg: &PipelineConfig,
    viz: &VizConfig,
) -> Result<Vec<PathBuf>> {
    ensure_out_dir(&cfg.out_dir)?;
    let eda = &cfg.eda;
    let table = &cleaned.table;

    let count = cc_viz::count_artifact(table, &eda.count_column, &eda.count_title)?;
    let count_path = cfg.output_path(&cfg.outputs.churn_distribution);
    cc_viz_render::render_artifact_to_file(&count, "count", &count_path, viz)?;

    let grouped = cc_viz::grouped_bar_artifact(
        table,
        &eda.group_x,
        &eda.group_y,
        &eda.group_hue,
        cleaned.encoding(&eda.group_x),
        &eda.grouped,
    )?;
    let grouped_path = cfg.output_path(&cfg.outputs.churn_vs_contract);
    cc_viz_render::render_artifact_to_file(&grouped, "grouped_bar", &grouped_path, viz)?;

    let corr = cc_viz::corr_artifact(table, &eda.corr_title)?;
    let corr_path = cfg.output_path(&cfg.outputs.correlation);
    cc_viz_render::render_artifact_to_file(&corr, "corr", &corr_path, viz)?;

    Ok(vec![count_path, grouped_path, corr_path])
}

/// Causal diagram image plus its DOT source.
pub fn render_causal_model(
    graph: &CausalGraph,
    cfg: &PipelineConfig,
    viz: &VizConfig,
) -> Result<Vec<PathBuf>> {
    ensure_out_dir(&cfg.out_dir)?;
    let artifact = cc_viz::causal_graph_artifact(graph)?;
    let image = cfg.output_path(&cfg.outputs.causal_model);
    cc_viz_render::render_artifact_to_file(&artifact, "causal_graph", &image, viz)?;

    let dot = cfg.output_path(&cfg.outputs.causal_model_dot);
    std::fs::write(&dot, graph.to_dot())
        .with_context(|| format!("failed to write {}", dot.display()))?;
    Ok(vec![image, dot])
}

pub fn causal_graph(cfg: &PipelineConfig) -> Result<CausalGraph> {
    CausalGraph::from_spec(&cfg.causal).context("invalid causal specification")
}

/// Identify, estimate, refute and compare against the raw correlation.
pub fn analyze(
    cleaned: &CleanedTable,
    graph: &CausalGraph,
    cfg: &PipelineConfig,
) -> Result<CausalAnalysis> {
    let table = &cleaned.table;
    let estimand = identify_effect(graph)?;
    let estimate = estimate_effect(
        table,
        &estimand,
        &cfg.estimate,
        cleaned.encoding(&cfg.causal.treatment),
    )?;

    let mut refutations = Vec::with_capacity(2);
    for refuter in [Refuter::PlaceboTreatment, Refuter::RandomCommonCause] {
        refutations.push(refute_estimate(table, &estimand, &estimate, refuter, &cfg.refute)?);
    }

    let comparison = compare_correlation_and_effect(table, &estimate)?;
    let verdict_message = comparison.verdict.message(&cfg.verdict).to_string();
    Ok(CausalAnalysis { estimand, estimate, refutations, comparison, verdict_message })
}

fn print_report(analysis: &CausalAnalysis) {
    println!("{}", analysis.estimand);
    println!("Causal Effect (ATE): {}", analysis.estimate.value);
    for r in &analysis.refutations {
        println!("{r}");
    }
    println!(
        "Correlation between {} and {}: {}",
        analysis.comparison.treatment, analysis.comparison.outcome, analysis.comparison.correlation
    );
    println!("Causal Effect (ATE): {}", analysis.comparison.causal_effect);
    println!("{}", analysis.verdict_message);
}

/// Full pipeline: load, clean, charts, causal model, report, results file.
///
/// With `console` set the raw preview and the textual report go to stdout.
pub fn run_pipeline(cfg: &PipelineConfig, viz: &VizConfig, console: bool) -> Result<RunSummary> {
    let raw = load(cfg)?;
    if console {
        println!("{}", raw.head(cfg.preview_rows));
    }

    let cleaned = clean(raw, cfg)?;
    let mut artifacts = render_eda(&cleaned, cfg, viz)?;

    let graph = causal_graph(cfg)?;
    artifacts.extend(render_causal_model(&graph, cfg, viz)?);

    let analysis = analyze(&cleaned, &graph, cfg)?;
    if console {
        print_report(&analysis);
    }

    let results_path = cfg.output_path(&cfg.outputs.results);
    write_results_csv(
        &results_path,
        &CausalResultRow {
            correlation: analysis.comparison.correlation,
            causal_effect_ate: analysis.estimate.value,
        },
    )?;
    let results = read_results_csv(&results_path)?;
    artifacts.push(results_path);

    Ok(RunSummary {
        input: cfg.input.display().to_string(),
        cleaning: cleaned.report,
        analysis,
        results,
        artifacts: artifacts.iter().map(|p| p.display().to_string()).collect(),
    })
}
