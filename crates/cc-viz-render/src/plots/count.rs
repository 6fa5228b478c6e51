use cc_viz::count::CountArtifact;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::{Axis, CategoryAxis};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::draw_bar_axes;
use crate::primitives::*;
use crate::title::draw_title;

pub fn render(artifact: &CountArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.bars.is_empty() {
        return Err(crate::RenderError::Layout("count plot has no bars".into()));
    }
    let max_count = artifact.bars.iter().map(|b| b.count).max().unwrap_or(0) as f64;

    let mut canvas = Canvas::new(config.figure.width, config.figure.height, &config.font.family)?;
    let y_axis = Axis::from_zero(max_count, 6).with_label("count");
    let x_axis = CategoryAxis::new(artifact.bars.iter().map(|b| b.label.clone()).collect())
        .with_label(artifact.column.clone());
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis.label, !artifact.title.is_empty(), config);

    draw_bar_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    let palette = config.palette_colors();
    let band = x_axis.band(area.width);
    let bar_w = band * 0.8;
    for (i, bar) in artifact.bars.iter().enumerate() {
        let cx = x_axis.center(i, area.left, area.right());
        let top = y_axis.data_to_pixel(bar.count as f64, area.bottom(), area.top);
        let color = palette[i % palette.len()];
        canvas.rect(cx - bar_w / 2.0, top, bar_w, area.bottom() - top, &Style::filled(color));
    }

    draw_title(&mut canvas, &area, &artifact.title, config);
    canvas.finish_svg()
}
