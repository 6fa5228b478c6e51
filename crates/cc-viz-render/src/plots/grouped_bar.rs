use cc_viz::grouped::GroupedBarArtifact;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::{Axis, CategoryAxis};
use crate::layout::legend::{LegendEntry, LegendKind, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::draw_bar_axes;
use crate::primitives::*;
use crate::title::draw_title;

/// Dodged bars per category, one per hue level, with interval whiskers.
pub fn render(artifact: &GroupedBarArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.bars.is_empty() || artifact.hue_levels.is_empty() {
        return Err(crate::RenderError::Layout("grouped bar chart has no bars".into()));
    }
    for bar in &artifact.bars {
        if bar.category >= artifact.categories.len() || bar.hue >= artifact.hue_levels.len() {
            return Err(crate::RenderError::Layout(format!(
                "bar index out of range: category={} hue={}",
                bar.category, bar.hue
            )));
        }
    }

    let y_max = artifact.bars.iter().map(|b| b.ci_hi.max(b.mean)).fold(0.0_f64, f64::max);

    let mut canvas = Canvas::new(config.figure.width, config.figure.height, &config.font.family)?;
    let y_axis = Axis::from_zero(y_max, 6).with_label(artifact.y.clone());
    let x_axis = CategoryAxis::new(artifact.categories.clone()).with_label(artifact.x.clone());
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis.label, !artifact.title.is_empty(), config);

    draw_bar_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    let palette = config.palette_colors();
    let n_hue = artifact.hue_levels.len() as f64;
    let group_w = x_axis.band(area.width) * 0.8;
    let bar_w = group_w / n_hue;
    let whisker = LineStyle::solid(config.colors.error_bar, 1.2);

    for bar in &artifact.bars {
        let cx = x_axis.center(bar.category, area.left, area.right());
        let x0 = cx - group_w / 2.0 + bar.hue as f64 * bar_w;
        let top = y_axis.data_to_pixel(bar.mean, area.bottom(), area.top);
        let color = palette[bar.hue % palette.len()];
        canvas.rect(x0, top, bar_w, area.bottom() - top, &Style::filled(color));

        let lo = y_axis.data_to_pixel(bar.ci_lo, area.bottom(), area.top);
        let hi = y_axis.data_to_pixel(bar.ci_hi, area.bottom(), area.top);
        canvas.error_bar(x0 + bar_w / 2.0, lo, hi, bar_w * 0.3, &whisker);
    }

    let entries: Vec<LegendEntry> = artifact
        .hue_levels
        .iter()
        .enumerate()
        .map(|(i, label)| LegendEntry {
            label: label.clone(),
            color: palette[i % palette.len()],
            kind: LegendKind::FilledRect,
        })
        .collect();
    draw_legend(&mut canvas, &area, Some(&artifact.hue), &entries, config.font.tick_size + 1.0);

    draw_title(&mut canvas, &area, &artifact.title, config);
    canvas.finish_svg()
}
