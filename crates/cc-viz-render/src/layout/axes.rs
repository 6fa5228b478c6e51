/// Value axis with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
}

impl Axis {
    /// Auto-scale linear axis with "nice number" ticks.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (nice_min, nice_max, step) = nice_range(data_min, data_max, target_ticks);
        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut k = 0usize;
        loop {
            let v = nice_min + k as f64 * step;
            if v > nice_max + step * 0.01 {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            k += 1;
        }
        Self { min: nice_min, max: nice_max, label: String::new(), tick_positions: ticks, tick_labels: labels }
    }

    /// Linear axis anchored at zero (bar heights).
    pub fn from_zero(data_max: f64, target_ticks: usize) -> Self {
        Self::auto_linear(0.0, data_max.max(0.0), target_ticks)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }
}

/// Evenly spaced category bands along a pixel range.
#[derive(Debug, Clone)]
pub struct CategoryAxis {
    pub labels: Vec<String>,
    pub label: String,
}

impl CategoryAxis {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels, label: String::new() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Band width for `len` pixels.
    pub fn band(&self, len: f64) -> f64 {
        len / self.labels.len().max(1) as f64
    }

    /// Center of band `i`.
    pub fn center(&self, i: usize, px_min: f64, px_max: f64) -> f64 {
        let band = self.band(px_max - px_min);
        px_min + (i as f64 + 0.5) * band
    }
}

/// "Nice numbers" algorithm for pleasant tick spacing.
fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if !(data_min.is_finite() && data_max.is_finite()) || (data_max - data_min).abs() < 1e-15 {
        let base = if data_min.is_finite() { data_min } else { 0.0 };
        return (base - 1.0, base + 1.0, 1.0);
    }
    let range = data_max - data_min;
    let rough_step = range / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let nice_min = (data_min / step).floor() * step;
    let nice_max = (data_max / step).ceil() * step;
    (nice_min, nice_max, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    // Avoid "-0"
    let v = if value.abs() < step * 0.01 { 0.0 } else { value };
    if decimals == 0 { format!("{}", v.round() as i64) } else { format!("{:.prec$}", v, prec = decimals) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_linear_basic() {
        let ax = Axis::auto_linear(0.0, 10.0, 6);
        assert!(!ax.tick_positions.is_empty());
        assert!(ax.min <= 0.0);
        assert!(ax.max >= 10.0);
        assert_eq!(ax.tick_labels.first().map(String::as_str), Some("0"));
    }

    #[test]
    fn from_zero_covers_bar_heights() {
        let ax = Axis::from_zero(3612.0, 6);
        assert_eq!(ax.min, 0.0);
        assert!(ax.max >= 3612.0);
        let px = ax.data_to_pixel(0.0, 300.0, 20.0);
        assert!((px - 300.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_range() {
        let ax = Axis::auto_linear(5.0, 5.0, 5);
        assert!(ax.min < 5.0 && ax.max > 5.0);
    }

    #[test]
    fn fractional_ticks() {
        let ax = Axis::auto_linear(-1.0, 1.0, 5);
        assert!(ax.tick_labels.contains(&"0.0".to_string()) || ax.tick_labels.contains(&"0".to_string()));
    }

    #[test]
    fn category_bands() {
        let ax = CategoryAxis::new(vec!["a".into(), "b".into()]);
        assert!((ax.center(1, 0.0, 100.0) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
    }
}
