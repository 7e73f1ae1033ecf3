//! Text width measurement

use serde::{Deserialize, Serialize};

/// Font description in CSS shorthand terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub weight: String,
    pub size: f32,
    pub family: String,
}

impl FontSpec {
    pub fn bold(size: f32, family: &str) -> Self {
        Self {
            weight: "bold".to_string(),
            size,
            family: family.to_string(),
        }
    }

    /// CSS `font` shorthand, e.g. `bold 50px "Inter", sans-serif`
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size, self.family)
    }
}

/// Measures rendered text width in surface units
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> f32;
}

/// Width estimate from per-character em advances.
///
/// Wide characters (CJK ideographs, kana, hangul, fullwidth forms) advance a
/// full em; everything else advances `narrow_em`.
#[derive(Debug, Clone, Copy)]
pub struct AdvanceMeasurer {
    pub narrow_em: f32,
    pub wide_em: f32,
}

impl Default for AdvanceMeasurer {
    fn default() -> Self {
        Self {
            narrow_em: 0.6,
            wide_em: 1.0,
        }
    }
}

impl TextMeasurer for AdvanceMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        text.chars()
            .map(|c| {
                if is_wide(c) {
                    self.wide_em
                } else {
                    self.narrow_em
                }
            })
            .sum::<f32>()
            * font.size
    }
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_css() {
        let font = FontSpec::bold(110.0, r#""Noto Serif SC", serif"#);
        assert_eq!(font.css(), r#"bold 110px "Noto Serif SC", serif"#);
    }

    #[test]
    fn test_wide_characters_take_full_em() {
        let measurer = AdvanceMeasurer::default();
        let font = FontSpec::bold(100.0, "serif");
        assert_eq!(measurer.measure("活着", &font), 200.0);
        assert_eq!(measurer.measure("ab", &font), 120.0);
        assert_eq!(measurer.measure("", &font), 0.0);
    }
}
