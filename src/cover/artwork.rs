//! Generated cover images carried as data URLs

use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverImageError {
    #[error("Not a base64 data URL")]
    InvalidDataUrl,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decoded cover image with its source data URL
#[derive(Debug, Clone)]
pub struct CoverImage {
    data_url: String,
    width: u32,
    height: u32,
}

impl CoverImage {
    /// Decode a `data:<mime>;base64,<payload>` URL
    pub fn from_data_url(data_url: &str) -> Result<Self, CoverImageError> {
        let payload = data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or(CoverImageError::InvalidDataUrl)?;

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        let decoded = image::load_from_memory(&bytes)?;

        if decoded.width() != decoded.height() {
            tracing::warn!(
                width = decoded.width(),
                height = decoded.height(),
                "Cover image is not square, it will be stretched"
            );
        }

        Ok(Self {
            data_url: data_url.to_string(),
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Wrap raw PNG bytes in a data URL
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_dimensions() {
        let url = png_data_url(&sample_png(8, 8));
        assert!(url.starts_with("data:image/png;base64,"));

        let image = CoverImage::from_data_url(&url).unwrap();
        assert_eq!((image.width(), image.height()), (8, 8));
        assert_eq!(image.data_url(), url);
    }

    #[test]
    fn test_rejects_plain_url() {
        let result = CoverImage::from_data_url("https://example.com/cover.png");
        assert!(matches!(result, Err(CoverImageError::InvalidDataUrl)));
    }

    #[test]
    fn test_rejects_non_image_payload() {
        let result = CoverImage::from_data_url("data:image/png;base64,aGVsbG8=");
        assert!(matches!(result, Err(CoverImageError::Image(_))));
    }
}
