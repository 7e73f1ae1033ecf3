//! Cover text overlay layout

use serde::{Deserialize, Serialize};

use super::artwork::CoverImage;
use super::measure::{FontSpec, TextMeasurer};
use super::surface::{Shadow, Surface, TextAlign, TextBaseline, TextStyle};

/// Side length of the square canvas
pub const CANVAS_SIZE: f32 = 1024.0;

const CENTER_X: f32 = CANVAS_SIZE / 2.0;
const CENTER_Y: f32 = CANVAS_SIZE / 2.0;

const LABEL_FONT_SIZE: f32 = 50.0;
const LABEL_FONT_FAMILY: &str = r#""Inter", sans-serif"#;
const LABEL_Y: f32 = 120.0;
const LABEL_SPACING: &str = "  ";
const RULE_Y: f32 = 150.0;
const RULE_HALF_WIDTH: f32 = 100.0;
const RULE_WIDTH: f32 = 2.0;

const TITLE_FONT_SIZE: f32 = 110.0;
const TITLE_FONT_FAMILY: &str = r#""Noto Serif SC", serif"#;
/// Widest a title line may render before wrapping
pub const TITLE_MAX_WIDTH: f32 = 900.0;
const TITLE_LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Default podcast label drawn at the top of the cover
pub const DEFAULT_PODCAST_TITLE: &str = "NOTHING IMPOSSIBLE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    #[default]
    White,
    Black,
    Orange,
}

impl TextColor {
    pub fn fill(self) -> &'static str {
        match self {
            TextColor::White => "#FFFFFF",
            TextColor::Black => "#0c0a09",
            TextColor::Orange => "#f97316",
        }
    }

    /// Dark text gets a light halo, everything else a dark one
    pub fn shadow(self) -> &'static str {
        match self {
            TextColor::Black => "rgba(255,255,255,0.9)",
            _ => "rgba(0,0,0,0.9)",
        }
    }
}

/// User-editable text drawn over the cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlayConfig {
    pub podcast_title: String,
    pub main_text: String,
    pub color: TextColor,
}

impl Default for TextOverlayConfig {
    fn default() -> Self {
        Self {
            podcast_title: DEFAULT_PODCAST_TITLE.to_string(),
            main_text: String::new(),
            color: TextColor::White,
        }
    }
}

impl TextOverlayConfig {
    /// Defaults with the title set to a book name
    pub fn for_book(book_name: &str) -> Self {
        Self {
            main_text: book_name.to_string(),
            ..Self::default()
        }
    }
}

/// Split `text` into lines no wider than `max_width`.
///
/// Breaks may fall between any two characters. A character that would push
/// the current line past the limit starts the next line; the first
/// character never breaks, so a single over-wide character still gets a
/// line of its own.
pub fn wrap_title(
    text: &str,
    measurer: &dyn TextMeasurer,
    font: &FontSpec,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for (n, c) in text.chars().enumerate() {
        let mut candidate = line.clone();
        candidate.push(c);

        if n > 0 && measurer.measure(&candidate, font) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push(c);
        } else {
            line = candidate;
        }
    }
    lines.push(line);

    lines
}

/// Vertical position of the first line so the block centers on `center_y`
pub fn first_line_y(line_count: usize, line_height: f32, center_y: f32) -> f32 {
    let total_height = line_count as f32 * line_height;
    center_y - total_height / 2.0 + line_height / 2.0
}

/// Spaced uppercase form of the podcast label
pub fn spaced_label(label: &str) -> String {
    label
        .to_uppercase()
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(LABEL_SPACING)
}

/// Draw the cover image and its text overlay
pub fn compose(
    surface: &mut dyn Surface,
    measurer: &dyn TextMeasurer,
    image: &CoverImage,
    overlay: &TextOverlayConfig,
) {
    surface.draw_image(image, 0.0, 0.0, CANVAS_SIZE, CANVAS_SIZE);

    let fill = overlay.color.fill();
    let shadow = Shadow {
        color: overlay.color.shadow().to_string(),
        blur: 20.0,
        offset_x: 0.0,
        offset_y: 4.0,
    };

    if !overlay.podcast_title.is_empty() {
        let style = TextStyle {
            font: FontSpec::bold(LABEL_FONT_SIZE, LABEL_FONT_FAMILY),
            fill: fill.to_string(),
            align: TextAlign::Center,
            baseline: TextBaseline::Alphabetic,
            shadow: shadow.clone(),
        };
        surface.fill_text(&spaced_label(&overlay.podcast_title), CENTER_X, LABEL_Y, &style);
        surface.stroke_line(
            (CENTER_X - RULE_HALF_WIDTH, RULE_Y),
            (CENTER_X + RULE_HALF_WIDTH, RULE_Y),
            RULE_WIDTH,
            fill,
        );
    }

    if !overlay.main_text.is_empty() {
        let style = TextStyle {
            font: FontSpec::bold(TITLE_FONT_SIZE, TITLE_FONT_FAMILY),
            fill: fill.to_string(),
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
            shadow,
        };
        let line_height = TITLE_FONT_SIZE * TITLE_LINE_HEIGHT_FACTOR;
        let lines = wrap_title(&overlay.main_text, measurer, &style.font, TITLE_MAX_WIDTH);
        let start_y = first_line_y(lines.len(), line_height, CENTER_Y);

        for (i, line) in lines.iter().enumerate() {
            surface.fill_text(line, CENTER_X, start_y + i as f32 * line_height, &style);
        }
    }
}
