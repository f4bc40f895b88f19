use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to decode image: {source}")]
    Decode {
        #[from]
        source: image::ImageError,
    },

    #[error("failed to encode preview: {0}")]
    Encode(String),

    #[error("image too large: {width}x{height} = {pixels} pixels, max {max_pixels}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        pixels: u64,
        max_pixels: u64,
    },

    #[error("input too large: {size} bytes, max {max_size}")]
    InputTooLarge { size: usize, max_size: usize },

    #[error("input bytes empty")]
    EmptyInput,

    #[error("unsupported image format")]
    UnsupportedFormat,
}

#[derive(Clone, Debug)]
pub struct PreviewConfig {
    pub max_image_pixels: u64,
    pub max_input_bytes: usize,
    pub max_alloc_bytes: u64,
    pub max_dimension: u32,
    /// Longest edge of the generated thumbnail.
    pub max_edge: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_image_pixels: 40_000_000,
            max_input_bytes: 20 * 1024 * 1024,
            max_alloc_bytes: 256 * 1024 * 1024,
            max_dimension: 10_000,
            max_edge: 256,
        }
    }
}

/// Displayable thumbnail of an attachment, always PNG.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    #[serde(with = "serde_bytes")]
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preview")
            .field("png_bytes", &self.png.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Decodes untrusted bytes and re-encodes them as a bounded PNG thumbnail.
/// Metadata in the source never survives the round trip.
#[instrument(skip(config, raw_bytes), fields(input_size = raw_bytes.len()))]
pub fn decode_preview(config: &PreviewConfig, raw_bytes: &[u8]) -> Result<Preview, PreviewError> {
    let img = decode_image(config, raw_bytes)?;
    let (w, h) = img.dimensions();
    let thumb = if w > config.max_edge || h > config.max_edge {
        img.thumbnail(config.max_edge, config.max_edge)
    } else {
        img
    };

    let mut cursor = Cursor::new(Vec::new());
    thumb
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| PreviewError::Encode(e.to_string()))?;
    let png = cursor.into_inner();

    debug!(
        source_width = w,
        source_height = h,
        width = thumb.width(),
        height = thumb.height(),
        output_size = png.len(),
        "preview generated"
    );

    Ok(Preview {
        png,
        width: thumb.width(),
        height: thumb.height(),
    })
}

fn decode_image(config: &PreviewConfig, raw_bytes: &[u8]) -> Result<DynamicImage, PreviewError> {
    if raw_bytes.is_empty() {
        return Err(PreviewError::EmptyInput);
    }

    if raw_bytes.len() > config.max_input_bytes {
        return Err(PreviewError::InputTooLarge {
            size: raw_bytes.len(),
            max_size: config.max_input_bytes,
        });
    }

    let mut reader = ImageReader::new(Cursor::new(raw_bytes))
        .with_guessed_format()
        .map_err(|e| PreviewError::Decode { source: e.into() })?;

    if reader.format().is_none() {
        return Err(PreviewError::UnsupportedFormat);
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(config.max_dimension);
    limits.max_image_height = Some(config.max_dimension);
    limits.max_alloc = Some(config.max_alloc_bytes);
    reader.limits(limits);

    let img = reader.decode()?;
    let (w, h) = img.dimensions();
    let pixels = u64::from(w) * u64::from(h);

    if pixels > config.max_image_pixels {
        return Err(PreviewError::ImageTooLarge {
            width: w,
            height: h,
            pixels,
            max_pixels: config.max_image_pixels,
        });
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ExtendedColorType, ImageEncoder};

    fn create_test_png(width: u32, height: u32) -> Vec<u8> {
        use image::{ImageBuffer, Rgba};
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        let mut buffer = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
        encoder
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        buffer
    }

    #[test]
    fn decode_rejects_empty() {
        let config = PreviewConfig::default();
        assert!(matches!(
            decode_preview(&config, &[]),
            Err(PreviewError::EmptyInput)
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        let config = PreviewConfig::default();
        assert!(decode_preview(&config, b"definitely not an image").is_err());
    }

    #[test]
    fn decode_rejects_oversized_input() {
        let config = PreviewConfig {
            max_input_bytes: 16,
            ..PreviewConfig::default()
        };
        let png = create_test_png(8, 8);
        assert!(matches!(
            decode_preview(&config, &png),
            Err(PreviewError::InputTooLarge { .. })
        ));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let config = PreviewConfig {
            max_image_pixels: 100,
            ..PreviewConfig::default()
        };
        let png = create_test_png(20, 20);
        assert!(matches!(
            decode_preview(&config, &png),
            Err(PreviewError::ImageTooLarge { pixels: 400, .. })
        ));
    }

    #[test]
    fn small_images_keep_their_size() {
        let preview = decode_preview(&PreviewConfig::default(), &create_test_png(40, 30)).unwrap();
        assert_eq!((preview.width, preview.height), (40, 30));
        assert_eq!(&preview.png[1..4], b"PNG");
    }

    #[test]
    fn large_images_are_bounded_and_keep_aspect() {
        let preview = decode_preview(&PreviewConfig::default(), &create_test_png(1024, 512)).unwrap();
        assert_eq!(preview.width, 256);
        assert_eq!(preview.height, 128);
    }

    #[test]
    fn debug_omits_pixels() {
        let preview = decode_preview(&PreviewConfig::default(), &create_test_png(4, 4)).unwrap();
        let rendered = format!("{preview:?}");
        assert!(rendered.contains("png_bytes"));
        assert!(rendered.contains("width: 4"));
    }
}
