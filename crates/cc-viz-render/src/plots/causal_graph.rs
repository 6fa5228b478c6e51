use std::collections::HashMap;

use cc_inference::causal::NodeRole;
use cc_viz::causal_graph::CausalGraphArtifact;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::legend::{LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::PlotArea;
use crate::primitives::*;
use crate::title::draw_title;

const ROW_GAP: f64 = 90.0;
const NODE_PAD_X: f64 = 12.0;

fn role_color(role: NodeRole, config: &VizConfig) -> Color {
    match role {
        NodeRole::Treatment => config.colors.treatment,
        NodeRole::Outcome => config.colors.outcome,
        NodeRole::CommonCause => config.colors.common_cause,
        NodeRole::Instrument => config.colors.instrument,
        NodeRole::Other => config.colors.other,
    }
}

fn role_label(role: NodeRole) -> &'static str {
    match role {
        NodeRole::Treatment => "treatment",
        NodeRole::Outcome => "outcome",
        NodeRole::CommonCause => "common cause",
        NodeRole::Instrument => "instrument",
        NodeRole::Other => "other",
    }
}

/// Point where the ray from the ellipse center towards `(dx, dy)` leaves it.
fn ellipse_exit(cx: f64, cy: f64, rx: f64, ry: f64, dx: f64, dy: f64) -> (f64, f64) {
    let k = ((dx / rx).powi(2) + (dy / ry).powi(2)).sqrt();
    if k < 1e-12 { (cx, cy) } else { (cx + dx / k, cy + dy / k) }
}

/// Layered diagram: one row per layer, nodes spread evenly, straight arrows.
pub fn render(artifact: &CausalGraphArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.nodes.is_empty() {
        return Err(crate::RenderError::Layout("causal graph has no nodes".into()));
    }

    let label_style = TextStyle {
        size: config.font.label_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let n_layers = artifact.n_layers();
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); n_layers];
    for (i, node) in artifact.nodes.iter().enumerate() {
        rows[node.layer].push(i);
    }

    let radii: Vec<(f64, f64)> = artifact
        .nodes
        .iter()
        .map(|n| {
            let w = crate::text::measure_text(&n.name, &label_style).width;
            (w / 2.0 + NODE_PAD_X, config.font.label_size * 1.2)
        })
        .collect();
    let widest_row = rows
        .iter()
        .map(|r| r.iter().map(|&i| 2.0 * radii[i].0 + 30.0).sum::<f64>())
        .fold(0.0_f64, f64::max);

    let title_h = config.font.title_size * 1.4 + 14.0;
    let legend_w = 120.0;
    let width = (widest_row + 40.0).max(config.figure.width * 0.8) + legend_w;
    let height = title_h + 30.0 + (n_layers.saturating_sub(1)) as f64 * ROW_GAP + 50.0;

    let mut canvas = Canvas::new(width, height, &config.font.family)?;
    let area = PlotArea::manual(20.0, title_h, width - 40.0 - legend_w, height - title_h - 20.0);

    let mut centers: HashMap<&str, (usize, f64, f64)> = HashMap::new();
    for (layer, row) in rows.iter().enumerate() {
        let y = area.top + 20.0 + layer as f64 * ROW_GAP + radii[0].1;
        let slot = area.width / row.len().max(1) as f64;
        for (k, &i) in row.iter().enumerate() {
            let x = area.left + (k as f64 + 0.5) * slot;
            centers.insert(artifact.nodes[i].name.as_str(), (i, x, y));
        }
    }

    // Edges first so node fills cover line ends.
    let edge_style = LineStyle::solid(config.colors.edge, 1.1);
    for edge in &artifact.edges {
        let (Some(&(ia, ax, ay)), Some(&(ib, bx, by))) =
            (centers.get(edge.from.as_str()), centers.get(edge.to.as_str()))
        else {
            return Err(crate::RenderError::Layout(format!(
                "edge {} -> {} references an unknown node",
                edge.from, edge.to
            )));
        };
        let (sx, sy) = ellipse_exit(ax, ay, radii[ia].0, radii[ia].1, bx - ax, by - ay);
        let (tx, ty) = ellipse_exit(bx, by, radii[ib].0, radii[ib].1, ax - bx, ay - by);
        canvas.arrow(sx, sy, tx, ty, 8.0, &edge_style);
    }

    for (i, node) in artifact.nodes.iter().enumerate() {
        let (_, x, y) = centers[node.name.as_str()];
        let (rx, ry) = radii[i];
        let stroke = Color::rgb(60, 60, 60);
        canvas.ellipse(x, y, rx, ry, &Style::outlined(role_color(node.role, config), stroke, 1.0));
        let style = if node.role == NodeRole::Treatment || node.role == NodeRole::Outcome {
            TextStyle { weight: FontWeight::Bold, ..label_style.clone() }
        } else {
            label_style.clone()
        };
        canvas.text(x, y, &node.name, &style);
    }

    let mut roles: Vec<NodeRole> = Vec::new();
    for node in &artifact.nodes {
        if !roles.contains(&node.role) {
            roles.push(node.role);
        }
    }
    let entries: Vec<LegendEntry> = roles
        .into_iter()
        .map(|r| LegendEntry {
            label: role_label(r).to_string(),
            color: role_color(r, config),
            kind: LegendKind::Node,
        })
        .collect();
    let legend_area = PlotArea::manual(area.left, area.top, width - 25.0 - area.left, area.height);
    draw_legend(&mut canvas, &legend_area, None, &entries, config.font.tick_size + 1.0);

    draw_title(&mut canvas, &area, &artifact.title, config);
    canvas.finish_svg()
}
