use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` (leading `#` optional); malformed input yields black.
    pub fn hex(s: &str) -> Self {
        let s = s.strip_prefix('#').unwrap_or(s);
        let channel = |range: std::ops::Range<usize>| {
            s.get(range).and_then(|h| u8::from_str_radix(h, 16).ok()).unwrap_or(0)
        };
        Self { r: channel(0..2), g: channel(2..4), b: channel(4..6), a: 1.0 }
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in [0, 1] (sRGB weights, no gamma).
    pub fn luminance(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    /// Linear interpolation between two colors (for colormaps).
    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: (a.r as f64 * (1.0 - t) + b.r as f64 * t).round() as u8,
            g: (a.g as f64 * (1.0 - t) + b.g as f64 * t).round() as u8,
            b: (a.b as f64 * (1.0 - t) + b.b as f64 * t).round() as u8,
            a: a.a * (1.0 - t) + b.a * t,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Color::hex(&s))
    }
}

/// Serialized as `#rrggbb`; alpha lives in the owning config section.
impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

// --- Palettes ---

/// Seaborn "deep".
pub const DEEP: &[&str] = &[
    "#4C72B0", "#DD8452", "#55A868", "#C44E52", "#8172B3", "#937860", "#DA8BC3", "#8C8C8C",
    "#CCB974", "#64B5CD",
];

pub const TABLEAU10: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub const MUTED: &[&str] = &[
    "#4878D0", "#EE854A", "#6ACC64", "#D65F5F", "#956CB4", "#8C613C", "#DC7EC0", "#797979",
    "#D5BB67", "#82C6E2",
];

pub fn palette_colors(name: &str) -> Vec<Color> {
    let strs = match name {
        "tableau10" => TABLEAU10,
        "muted" => MUTED,
        _ => DEEP,
    };
    strs.iter().map(|s| Color::hex(s)).collect()
}

/// Cell color for an undefined correlation.
pub const UNDEFINED: Color = Color::rgb(0xbd, 0xbd, 0xbd);

// --- Diverging colormaps for correlation heatmaps ---

/// RdBu_r: -1.0 → blue, 0.0 → white, +1.0 → red.
pub fn rdbu_r(val: f64) -> Color {
    let v = val.clamp(-1.0, 1.0);
    if v < 0.0 {
        Color::lerp(Color::rgb(255, 255, 255), Color::hex("#2166ac"), -v)
    } else {
        Color::lerp(Color::rgb(255, 255, 255), Color::hex("#b2182b"), v)
    }
}

/// coolwarm: -1.0 → blue, 0.0 → light grey, +1.0 → red.
pub fn coolwarm(val: f64) -> Color {
    let v = val.clamp(-1.0, 1.0);
    let mid = Color::hex("#dddddd");
    if v < 0.0 {
        Color::lerp(mid, Color::hex("#3b4cc0"), -v)
    } else {
        Color::lerp(mid, Color::hex("#b40426"), v)
    }
}

/// Colormap lookup by name (`coolwarm` for anything unknown).
pub fn colormap(name: &str) -> fn(f64) -> Color {
    match name {
        "RdBu_r" | "rdbu_r" => rdbu_r,
        _ => coolwarm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        let c = Color::hex("#4C72B0");
        assert_eq!((c.r, c.g, c.b), (0x4C, 0x72, 0xB0));
        assert!((c.a - 1.0).abs() < 1e-9);
        assert_eq!(Color::hex("#12"), Color::rgb(0x12, 0, 0));
    }

    #[test]
    fn svg_fill_alpha() {
        let c = Color::rgb(29, 78, 216).with_alpha(0.5);
        assert_eq!(c.to_svg_fill(), "rgba(29,78,216,0.500)");
        assert_eq!(Color::rgb(29, 78, 216).to_svg_fill(), "#1d4ed8");
    }

    #[test]
    fn diverging_extremes() {
        for cmap in [rdbu_r as fn(f64) -> Color, coolwarm] {
            let blue = cmap(-1.0);
            let red = cmap(1.0);
            assert!(blue.b > blue.r);
            assert!(red.r > red.b);
        }
        assert_eq!(rdbu_r(0.0).r, 255);
        assert_eq!(colormap("unknown")(1.0), coolwarm(1.0));
    }
}
