use crate::primitives::{FontWeight, TextStyle};

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Approximate advance width of one glyph, in ems, for a sans-serif face.
fn advance_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | ' ' => 0.35,
        'm' | 'w' | 'M' | 'W' => 0.85,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.56,
        _ => 0.52,
    }
}

/// Estimate text extent in points from a per-glyph width table.
pub fn measure_text(text: &str, style: &TextStyle) -> TextMetrics {
    let bold = if style.weight == FontWeight::Bold { 1.06 } else { 1.0 };
    let width: f64 = text.chars().map(advance_em).sum::<f64>() * style.size * bold;
    TextMetrics { width, height: style.size * 1.2, ascent: style.size * 0.93 }
}
