use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::{Axis, CategoryAxis};
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Draw a bar-chart frame: value y-axis with grid, category x-axis, labels.
///
/// Call before drawing bars so grid lines sit underneath them.
pub fn draw_bar_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &CategoryAxis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    let frame_color = Color::rgb(0, 0, 0);
    let spine = LineStyle::solid(frame_color, 0.8);
    let tick_line = LineStyle::solid(frame_color, 0.6);
    let tl = config.axes.tick_length;

    // Spines: left + bottom always, the rest when framed.
    canvas.line(area.left, area.top, area.left, area.bottom(), &spine);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &spine);
    if config.axes.frame {
        canvas.line(area.left, area.top, area.right(), area.top, &spine);
        canvas.line(area.right(), area.top, area.right(), area.bottom(), &spine);
    }

    // --- Y axis ticks ---
    let y_tick_label_style = TextStyle {
        size: config.font.tick_size,
        color: frame_color,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        if config.grid.show && (py - area.bottom()).abs() > 0.5 {
            let grid_style = LineStyle::solid(config.grid.color.with_alpha(config.grid.alpha), 0.5);
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
        canvas.line(area.left - tl, py, area.left, py, &tick_line);
        if let Some(label) = y_axis.tick_labels.get(i) {
            canvas.text(area.left - tl - 3.0, py, label, &y_tick_label_style);
        }
    }

    // --- X axis categories ---
    let x_tick_label_style = TextStyle {
        size: config.font.tick_size,
        color: frame_color,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    for (i, label) in x_axis.labels.iter().enumerate() {
        let px = x_axis.center(i, area.left, area.right());
        canvas.line(px, area.bottom(), px, area.bottom() + tl, &tick_line);
        canvas.text(px, area.bottom() + tl + 3.0, label, &x_tick_label_style);
    }

    // --- Axis labels ---
    let label_style = TextStyle {
        size: config.font.label_size,
        color: frame_color,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };
    if !x_axis.label.is_empty() {
        let label_y = area.bottom() + tl + config.font.tick_size + config.font.label_size + 8.0;
        canvas.text(area.left + area.width / 2.0, label_y, &x_axis.label, &label_style);
    }
    if !y_axis.label.is_empty() {
        let max_tick_w = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &y_tick_label_style).width)
            .fold(0.0_f64, f64::max);
        let label_x = area.left - tl - max_tick_w - 10.0;
        canvas.text_rotated(label_x, area.top + area.height / 2.0, &y_axis.label, &label_style, -90.0);
    }
}
