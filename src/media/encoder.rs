use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage};
use thiserror::Error;

use crate::state::data::EncodedImage;

/// Maximum story dimensions (portrait phone screen)
pub const MAX_WIDTH: u32 = 1080;
pub const MAX_HEIGHT: u32 = 1920;

/// Largest accepted upload (10MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// JPEG quality for encoded stories (0.85)
pub const JPEG_QUALITY: u8 = 85;

/// Why an upload could not become a story.
/// Both kinds are recoverable and only shown as a transient notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Wrong MIME type or oversized file
    #[error("{0}")]
    Validation(String),
    /// Read or decode failure
    #[error("{0}")]
    Io(String),
}

/// A raw picked file, before validation
#[derive(Clone)]
pub struct ImageSource {
    /// MIME type, e.g. "image/png"
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSource")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Reject anything that is not an image or is over the size ceiling
pub fn validate(mime: &str, size: usize) -> Result<(), EncodeError> {
    if !mime.starts_with("image/") {
        return Err(EncodeError::Validation("File must be an image".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(EncodeError::Validation(
            "Image size must be less than 10MB".to_string(),
        ));
    }
    Ok(())
}

/// Target size for an image, downscale-only, aspect ratio preserved
pub fn fit_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_WIDTH && height <= MAX_HEIGHT {
        return (width, height);
    }

    let width_ratio = MAX_WIDTH as f64 / width as f64;
    let height_ratio = MAX_HEIGHT as f64 / height as f64;
    let ratio = width_ratio.min(height_ratio);

    let scaled_width = ((width as f64 * ratio).floor() as u32).max(1);
    let scaled_height = ((height as f64 * ratio).floor() as u32).max(1);
    (scaled_width, scaled_height)
}

/// Encode an upload into a story payload
///
/// Decoding and resizing are CPU-bound, so this runs on the blocking pool.
pub async fn encode(source: ImageSource) -> Result<EncodedImage, EncodeError> {
    validate(&source.mime, source.bytes.len())?;

    tokio::task::spawn_blocking(move || encode_blocking(&source.bytes))
        .await
        .map_err(|e| EncodeError::Io(format!("Task join error: {}", e)))?
}

/// Blocking implementation of story encoding
pub fn encode_blocking(bytes: &[u8]) -> Result<EncodedImage, EncodeError> {
    let img = image::load_from_memory(bytes)
        .map_err(|_| EncodeError::Io("Failed to load image".to_string()))?;

    let (width, height) = fit_dimensions(img.width(), img.height());
    let img = if (width, height) != (img.width(), img.height()) {
        img.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| EncodeError::Io(format!("Failed to encode image: {}", e)))?;

    tracing::debug!(width, height, bytes = buffer.len(), "story image encoded");
    Ok(EncodedImage::new(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, RgbImage, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn decoded_size(encoded: &EncodedImage) -> (u32, u32) {
        let img = image::load_from_memory_with_format(encoded.as_bytes(), ImageFormat::Jpeg).unwrap();
        img.dimensions()
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(800, 600), (800, 600));
        assert_eq!(fit_dimensions(1080, 1920), (1080, 1920));
        assert_eq!(fit_dimensions(2160, 3840), (1080, 1920));
        assert_eq!(fit_dimensions(4000, 1000), (1080, 270));
        assert_eq!(fit_dimensions(1000, 4000), (480, 1920));
    }

    #[test]
    fn test_validate() {
        assert!(validate("image/png", 1024).is_ok());
        assert!(validate("image/jpeg", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate("text/plain", 10),
            Err(EncodeError::Validation("File must be an image".to_string()))
        );
        assert_eq!(
            validate("image/png", 15 * 1024 * 1024),
            Err(EncodeError::Validation("Image size must be less than 10MB".to_string()))
        );
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let encoded = encode_blocking(&png(2160, 3840)).unwrap();
        assert_eq!(decoded_size(&encoded), (1080, 1920));
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let encoded = encode_blocking(&png(120, 80)).unwrap();
        assert_eq!(decoded_size(&encoded), (120, 80));
    }

    #[test]
    fn test_alpha_is_flattened() {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(10, 10))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let encoded = encode_blocking(&bytes).unwrap();
        assert_eq!(&encoded.as_bytes()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_garbage_is_an_io_error() {
        assert_eq!(
            encode_blocking(b"definitely not an image"),
            Err(EncodeError::Io("Failed to load image".to_string()))
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected_before_decoding() {
        let source = ImageSource {
            mime: "image/jpeg".to_string(),
            bytes: vec![0; 15 * 1024 * 1024],
        };

        let result = encode(source).await;
        assert!(matches!(result, Err(EncodeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_encode_runs_off_thread() {
        let source = ImageSource {
            mime: "image/png".to_string(),
            bytes: png(64, 32),
        };

        let encoded = encode(source).await.unwrap();
        assert_eq!(decoded_size(&encoded), (64, 32));
    }
}
