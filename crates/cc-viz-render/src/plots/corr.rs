use cc_viz::corr::CorrArtifact;

use crate::canvas::Canvas;
use crate::color::{self, Color};
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;
use crate::text::measure_text;
use crate::title::draw_title;

pub fn render(artifact: &CorrArtifact, config: &VizConfig) -> crate::Result<String> {
    let n = artifact.names.len();
    if n == 0 {
        return Err(crate::RenderError::Layout("correlation matrix is empty".into()));
    }
    if artifact.corr.len() != n || artifact.corr.iter().any(|row| row.len() != n) {
        return Err(crate::RenderError::Layout(format!("correlation matrix is not {n}x{n}")));
    }

    let cmap = color::colormap(&config.corr.cmap);
    let tick_style = TextStyle { size: config.font.tick_size * 0.9, ..Default::default() };
    let label_w = artifact
        .names
        .iter()
        .map(|s| measure_text(s, &tick_style).width)
        .fold(0.0_f64, f64::max)
        .min(180.0);

    let cell_size = if n <= 20 { 30.0 } else { 16.0 };
    let colorbar_w = 14.0;
    let colorbar_gap = 12.0;
    let title_h = config.font.title_size * 1.4 + 14.0;

    let matrix_w = cell_size * n as f64;
    let fig_w = 10.0 + label_w + 6.0 + matrix_w + colorbar_gap + colorbar_w + 36.0;
    // Rotated column labels need roughly label_w * sin(45°) below the matrix.
    let fig_h = title_h + matrix_w + label_w * 0.75 + 16.0;

    let mut canvas = Canvas::new(fig_w, fig_h, &config.font.family)?;
    let area = PlotArea::manual(10.0 + label_w + 6.0, title_h, matrix_w, matrix_w);

    let separator = Color::rgb(255, 255, 255);
    let annotate = config.corr.annotate && n <= 20;
    for (row, values) in artifact.corr.iter().enumerate() {
        for (col, &val) in values.iter().enumerate() {
            let x = area.left + col as f64 * cell_size;
            let y = area.top + row as f64 * cell_size;
            let fill = val.map_or(color::UNDEFINED, cmap);
            canvas.rect(x, y, cell_size, cell_size, &Style::outlined(fill, separator, 0.5));

            if annotate {
                let text_color =
                    if fill.luminance() < 0.5 { Color::rgb(255, 255, 255) } else { Color::rgb(0, 0, 0) };
                let text_style = TextStyle {
                    size: (cell_size * 0.3).min(8.0),
                    color: text_color,
                    anchor: TextAnchor::Middle,
                    baseline: TextBaseline::Central,
                    ..Default::default()
                };
                let label = val.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
                canvas.text(x + cell_size / 2.0, y + cell_size / 2.0, &label, &text_style);
            }
        }
    }

    // Row labels (left)
    let row_label_style =
        TextStyle { anchor: TextAnchor::End, baseline: TextBaseline::Central, ..tick_style.clone() };
    for (i, name) in artifact.names.iter().enumerate() {
        let y = area.top + (i as f64 + 0.5) * cell_size;
        canvas.text(area.left - 4.0, y, name, &row_label_style);
    }

    // Column labels (bottom, rotated)
    for (i, name) in artifact.names.iter().enumerate() {
        let x = area.left + (i as f64 + 0.5) * cell_size;
        canvas.text_rotated(x, area.bottom() + 4.0, name, &row_label_style, -45.0);
    }

    // Colorbar
    let cb_x = area.right() + colorbar_gap;
    let cb_steps = 50;
    let cb_h = matrix_w / cb_steps as f64;
    for i in 0..cb_steps {
        let val = 1.0 - 2.0 * i as f64 / (cb_steps - 1) as f64; // +1 → -1
        let y = area.top + i as f64 * cb_h;
        canvas.rect(cb_x, y, colorbar_w, cb_h + 0.5, &Style::filled(cmap(val)));
    }
    let cb_label_style = TextStyle {
        size: config.font.tick_size * 0.85,
        anchor: TextAnchor::Start,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    canvas.text(cb_x + colorbar_w + 3.0, area.top, "1.0", &cb_label_style);
    canvas.text(cb_x + colorbar_w + 3.0, area.top + matrix_w / 2.0, "0.0", &cb_label_style);
    canvas.text(cb_x + colorbar_w + 3.0, area.bottom(), "\u{2212}1.0", &cb_label_style);

    draw_title(&mut canvas, &area, &artifact.title, config);
    canvas.finish_svg()
}
