//! Cover compositing
//!
//! Lays out the podcast label and the wrapped book title over a generated
//! square cover. Drawing goes through the [`Surface`] trait and width
//! measurement through [`TextMeasurer`], so the same layout can be replayed
//! on a browser canvas or checked in tests.

mod artwork;
mod layout;
mod measure;
mod surface;

pub use artwork::{png_data_url, CoverImage, CoverImageError};
pub use layout::{
    compose, first_line_y, spaced_label, wrap_title, TextColor, TextOverlayConfig, CANVAS_SIZE,
    DEFAULT_PODCAST_TITLE, TITLE_MAX_WIDTH,
};
pub use measure::{AdvanceMeasurer, FontSpec, TextMeasurer};
pub use surface::{DrawCommand, DrawList, Shadow, Surface, TextAlign, TextBaseline, TextStyle};

#[cfg(test)]
pub(crate) use artwork::sample_png;
