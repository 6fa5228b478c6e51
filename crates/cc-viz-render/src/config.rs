use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level visualization configuration (YAML or programmatic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub palette: String,
    pub colors: ColorsConfig,
    pub output: OutputConfig,
    pub corr: CorrConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::ChurnCause.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 432.0,  // 6" * 72
            height: 324.0, // 4.5" * 72
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "DejaVu Sans, Arial, sans-serif".into(),
            title_size: 12.0,
            label_size: 10.5,
            tick_size: 9.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_length: f64,
    pub frame: bool,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self { tick_length: 3.5, frame: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: true, color: Color::hex("#cccccc"), alpha: 0.8 }
    }
}

/// Fixed colors for causal diagram roles and chart furniture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub treatment: Color,
    pub outcome: Color,
    pub common_cause: Color,
    pub instrument: Color,
    pub other: Color,
    pub edge: Color,
    pub error_bar: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            treatment: Color::hex("#c6dbef"),
            outcome: Color::hex("#fdd0a2"),
            common_cause: Color::hex("#e5e5e5"),
            instrument: Color::hex("#d9f0d3"),
            other: Color::hex("#ffffff"),
            edge: Color::hex("#333333"),
            error_bar: Color::hex("#3a3a3a"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "png".into(), dpi: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrConfig {
    pub cmap: String,
    /// Print coefficients inside cells (only for matrices up to 20 columns).
    pub annotate: bool,
}

impl Default for CorrConfig {
    fn default() -> Self {
        Self { cmap: "coolwarm".into(), annotate: true }
    }
}

/// Resolve a VizConfig from an optional YAML string.
///
/// The `theme` key selects the base preset; every other key overrides the
/// preset field by field.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let Some(yaml) = user_yaml else {
        return Ok(VizConfig::default());
    };
    let overrides: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    if overrides.is_null() {
        return Ok(VizConfig::default());
    }
    let theme = overrides.get("theme").and_then(|v| v.as_str()).unwrap_or_default();
    let base = BuiltinTheme::parse(theme).base_config();

    let mut merged =
        serde_yaml_ng::to_value(&base).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    merge_yaml(&mut merged, overrides);
    serde_yaml_ng::from_value(merged).map_err(|e| crate::RenderError::Config(e.to_string()))
}

fn merge_yaml(base: &mut serde_yaml_ng::Value, overlay: serde_yaml_ng::Value) {
    match (base, overlay) {
        (serde_yaml_ng::Value::Mapping(b), serde_yaml_ng::Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_yaml(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_churncause_theme() {
        let c = resolve_config(None).unwrap();
        assert_eq!(c.theme, "churncause");
        assert_eq!(c.output.dpi, 300);
        assert_eq!(c.corr.cmap, "coolwarm");
    }

    #[test]
    fn yaml_overrides_theme_fields() {
        let c = resolve_config(Some("theme: minimal\noutput:\n  dpi: 96\n")).unwrap();
        assert_eq!(c.theme, "minimal");
        assert!(!c.grid.show);
        assert_eq!(c.output.dpi, 96);
        // Untouched nested fields keep the preset value.
        assert_eq!(c.output.format, "png");
        assert_eq!(c.palette, BuiltinTheme::Minimal.base_config().palette);
    }

    #[test]
    fn bad_yaml_is_config_error() {
        let err = resolve_config(Some("output: [1, 2")).unwrap_err();
        assert!(matches!(err, crate::RenderError::Config(_)));
    }
}
