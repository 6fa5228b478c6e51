//! # cc-viz-render
//!
//! Draws `cc-viz` artifacts onto an SVG canvas and, with the `png` feature,
//! rasterises them with `resvg`.

pub mod canvas;
pub mod color;
pub mod config;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;
pub mod title;

use std::path::Path;

use config::VizConfig;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render an artifact JSON to SVG string.
pub fn render_svg(artifact_json: &str, kind: &str, config: &VizConfig) -> Result<String> {
    let svg = match kind {
        "count" => {
            let art: cc_viz::CountArtifact = serde_json::from_str(artifact_json)?;
            plots::count::render(&art, config)?
        }
        "grouped_bar" => {
            let art: cc_viz::GroupedBarArtifact = serde_json::from_str(artifact_json)?;
            plots::grouped_bar::render(&art, config)?
        }
        "corr" => {
            let art: cc_viz::CorrArtifact = serde_json::from_str(artifact_json)?;
            plots::corr::render(&art, config)?
        }
        "causal_graph" => {
            let art: cc_viz::CausalGraphArtifact = serde_json::from_str(artifact_json)?;
            plots::causal_graph::render(&art, config)?
        }
        other => return Err(RenderError::UnknownKind(other.to_string())),
    };
    Ok(svg)
}

/// Render an artifact JSON to bytes in the specified format.
pub fn render_to_bytes(
    artifact_json: &str,
    kind: &str,
    format: &str,
    config: &VizConfig,
) -> Result<Vec<u8>> {
    let svg = render_svg(artifact_json, kind, config)?;
    match format {
        "svg" => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        "png" => output::png::svg_to_png(&svg, config.output.dpi),
        other => Err(RenderError::UnknownKind(format!("format: {other}"))),
    }
}

/// Render an artifact JSON to a file (format inferred from extension).
pub fn render_to_file(artifact_json: &str, kind: &str, path: &Path, config: &VizConfig) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| config.output.format.clone());
    if ext == "svg" {
        output::svg::save_svg(&render_svg(artifact_json, kind, config)?, path)?;
    } else {
        std::fs::write(path, render_to_bytes(artifact_json, kind, &ext, config)?)?;
    }
    tracing::info!(kind, path = %path.display(), "chart written");
    Ok(())
}

/// Serialize an artifact and render it to a file.
pub fn render_artifact_to_file<T: Serialize>(
    artifact: &T,
    kind: &str,
    path: &Path,
    config: &VizConfig,
) -> Result<()> {
    let json = serde_json::to_string(artifact)?;
    render_to_file(&json, kind, path, config)
}
