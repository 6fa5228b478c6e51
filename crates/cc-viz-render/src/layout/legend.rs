use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

pub enum LegendKind {
    FilledRect,
    /// Ellipse swatch with an outline (diagram node roles).
    Node,
}

/// Draw a legend in the top-right corner of the plot area.
pub fn draw_legend(
    canvas: &mut Canvas,
    area: &PlotArea,
    title: Option<&str>,
    entries: &[LegendEntry],
    font_size: f64,
) {
    if entries.is_empty() {
        return;
    }

    let row_height = font_size + 4.0;
    let swatch_w = 14.0;
    let swatch_h = font_size - 2.0;
    let gap = 6.0;
    let padding = 6.0;

    let text_style =
        TextStyle { size: font_size * 0.85, baseline: TextBaseline::Central, ..Default::default() };
    let title_style = TextStyle { weight: FontWeight::Bold, ..text_style.clone() };

    let mut max_w = entries
        .iter()
        .map(|e| swatch_w + gap + canvas.measure_text(&e.label, &text_style).width)
        .fold(0.0_f64, f64::max);
    if let Some(t) = title {
        max_w = max_w.max(canvas.measure_text(t, &title_style).width);
    }
    let n_rows = entries.len() + usize::from(title.is_some());

    let legend_w = padding + max_w + padding;
    let legend_h = padding + n_rows as f64 * row_height + padding;
    let lx = area.right() - legend_w - 5.0;
    let ly = area.top + 5.0;

    let bg_style = Style {
        fill: Some(Color::rgba(255, 255, 255, 0.85)),
        stroke: Some(Color::rgb(200, 200, 200)),
        stroke_width: 0.5,
        opacity: 1.0,
    };
    canvas.rect(lx, ly, legend_w, legend_h, &bg_style);

    let mut row = 0usize;
    let sx = lx + padding;
    if let Some(t) = title {
        let ey = ly + padding + row_height / 2.0;
        canvas.text(sx, ey, t, &title_style);
        row += 1;
    }

    for entry in entries {
        let ey = ly + padding + row as f64 * row_height + row_height / 2.0;
        match entry.kind {
            LegendKind::FilledRect => {
                canvas.rect(sx, ey - swatch_h / 2.0, swatch_w, swatch_h, &Style::filled(entry.color));
            }
            LegendKind::Node => {
                canvas.ellipse(
                    sx + swatch_w / 2.0,
                    ey,
                    swatch_w / 2.0,
                    swatch_h / 2.0,
                    &Style::outlined(entry.color, Color::rgb(60, 60, 60), 0.6),
                );
            }
        }
        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
        row += 1;
    }
}
