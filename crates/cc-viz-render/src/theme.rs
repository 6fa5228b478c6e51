use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    ChurnCause,
    Minimal,
    Tableau,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "minimal" => Self::Minimal,
            "tableau" => Self::Tableau,
            _ => Self::ChurnCause,
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::ChurnCause => churncause(),
            Self::Minimal => minimal(),
            Self::Tableau => tableau(),
        }
    }
}

fn churncause() -> VizConfig {
    VizConfig {
        theme: "churncause".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        palette: "deep".into(),
        colors: ColorsConfig::default(),
        output: OutputConfig::default(),
        corr: CorrConfig::default(),
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        font: FontConfig { title_size: 11.0, label_size: 10.0, tick_size: 8.5, ..FontConfig::default() },
        axes: AxesConfig { tick_length: 4.0, frame: true },
        grid: GridConfig { show: false, ..GridConfig::default() },
        palette: "muted".into(),
        corr: CorrConfig { annotate: false, ..CorrConfig::default() },
        ..churncause()
    }
}

fn tableau() -> VizConfig {
    VizConfig {
        theme: "tableau".into(),
        figure: FigureConfig { width: 518.4, height: 345.6 },
        grid: GridConfig { show: true, color: Color::hex("#e0e0e0"), alpha: 1.0 },
        palette: "tableau10".into(),
        corr: CorrConfig { cmap: "RdBu_r".into(), ..CorrConfig::default() },
        ..churncause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_with_fallback() {
        assert_eq!(BuiltinTheme::parse("Minimal"), BuiltinTheme::Minimal);
        assert_eq!(BuiltinTheme::parse("TABLEAU"), BuiltinTheme::Tableau);
        assert_eq!(BuiltinTheme::parse("nope"), BuiltinTheme::ChurnCause);
    }

    #[test]
    fn presets_differ() {
        let a = BuiltinTheme::ChurnCause.base_config();
        let b = BuiltinTheme::Minimal.base_config();
        assert_ne!(a.grid.show, b.grid.show);
        assert_eq!(a.output, b.output);
    }
}
