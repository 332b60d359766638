//! Subclip generation.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Canonical subclip width in pixels.
pub const SUBCLIP_WIDTH: u32 = 512;

/// Canonical subclip height in pixels.
pub const SUBCLIP_HEIGHT: u32 = 250;

const JPEG_QUALITY: u8 = 85;

/// Binary image in, resized binary image out.
///
/// Implementations must be pure: identical input bytes and dimensions give
/// identical output bytes.
pub trait ImageResizer: Send + Sync {
    fn resize(&self, bytes: &[u8], target_width: u32, target_height: u32) -> MediaResult<Vec<u8>>;
}

/// Resizer backed by the `image` crate.
///
/// Scales to exactly the target box (aspect ratio is not preserved) and keeps
/// the source encoding for JPEG and PNG input; anything else comes out as PNG.
#[derive(Debug, Clone, Copy)]
pub struct SubclipResizer {
    filter: FilterType,
}

impl SubclipResizer {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl Default for SubclipResizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageResizer for SubclipResizer {
    fn resize(&self, bytes: &[u8], target_width: u32, target_height: u32) -> MediaResult<Vec<u8>> {
        if target_width == 0 || target_height == 0 {
            return Err(MediaError::InvalidDimensions {
                width: target_width,
                height: target_height,
            });
        }

        let format = image::guess_format(bytes).map_err(|e| MediaError::decode(e.to_string()))?;
        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| MediaError::decode(e.to_string()))?;

        debug!(
            "Resizing {}x{} {:?} to {}x{}",
            img.width(),
            img.height(),
            format,
            target_width,
            target_height
        );

        let resized = img.resize_exact(target_width, target_height, self.filter);
        encode(resized, format)
    }
}

fn encode(img: DynamicImage, source_format: ImageFormat) -> MediaResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());

    let result = match source_format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut buf, ImageOutputFormat::Jpeg(JPEG_QUALITY)),
        _ => img.write_to(&mut buf, ImageOutputFormat::Png),
    };

    result.map_err(|e| MediaError::EncodeError(e.to_string()))?;
    Ok(buf.into_inner())
}
