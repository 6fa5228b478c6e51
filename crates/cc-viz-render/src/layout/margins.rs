use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Margins for a titled chart with a value y-axis and a labelled x-axis.
    pub fn auto(canvas: &Canvas, y_axis: &Axis, x_label: &str, titled: bool, config: &VizConfig) -> Self {
        let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };

        // y tick labels + rotated axis label
        let max_tick_w = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .fold(0.0_f64, f64::max);
        let mut left = 12.0 + max_tick_w + config.axes.tick_length + 6.0;
        if !y_axis.label.is_empty() {
            left += config.font.label_size + 6.0;
        }

        let mut bottom = 12.0 + config.font.tick_size + config.axes.tick_length + 6.0;
        if !x_label.is_empty() {
            bottom += config.font.label_size + 6.0;
        }

        let top = if titled { config.font.title_size * 1.4 + 14.0 } else { 12.0 };
        let right = 15.0;

        let width = canvas.width - left - right;
        let height = canvas.height - top - bottom;
        Self { left, top, width: width.max(50.0), height: height.max(50.0) }
    }

    /// Manual placement (matrix and diagram layouts).
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}
