//! Drawing surfaces
//!
//! The compositor draws through [`Surface`]. [`DrawList`] records the calls
//! as serializable commands so a browser canvas can replay them.

use serde::{Deserialize, Serialize};

use super::artwork::CoverImage;
use super::measure::FontSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Alphabetic,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: String,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font: FontSpec,
    pub fill: String,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub shadow: Shadow,
}

/// Something the compositor can draw on
pub trait Surface {
    /// Draw `image` scaled into the given rectangle
    fn draw_image(&mut self, image: &CoverImage, x: f32, y: f32, width: f32, height: f32);

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: &str);
}

/// Recorded drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    #[serde(rename_all = "camelCase")]
    Image {
        source_width: u32,
        source_height: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        x: f32,
        y: f32,
        font: String,
        style: TextStyle,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: String,
    },
}

/// Surface that records every call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawList {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Text commands in drawing order
    pub fn texts(&self) -> impl Iterator<Item = (&str, f32, f32)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, x, y, .. } => Some((text.as_str(), *x, *y)),
            _ => None,
        })
    }
}

impl Surface for DrawList {
    fn draw_image(&mut self, image: &CoverImage, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::Image {
            source_width: image.width(),
            source_height: image.height(),
            x,
            y,
            width,
            height,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            font: style.font.css(),
            style: style.clone(),
        });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: &str) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color: color.to_string(),
        });
    }
}
