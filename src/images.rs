//! Client-side image preparation: downscale to fit the display bounds and
//! re-encode as an inline JPEG data URL small enough to live inside a
//! document next to the entity it belongs to.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

/// Raw uploads above this size are refused before any processing.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Quality used for the single retry when the first encoding is oversized.
const RETRY_QUALITY: u8 = 70;

#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality for the first encoding pass, 1-100.
    pub quality: u8,
    /// Target ceiling for the encoded data-URL length, in bytes.
    pub max_encoded_len: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 900,
            quality: 85,
            max_encoded_len: 180_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Downscale `data` to fit within the configured bounds and encode it as a
/// `data:image/jpeg;base64,...` string. When the result exceeds the byte
/// ceiling, one retry runs at a lower quality; if that is still over, the
/// oversized result is returned anyway.
pub fn compress_image(data: &[u8], options: &CompressOptions) -> Result<String, ImageError> {
    let decoded = image::load_from_memory(data).map_err(ImageError::Decode)?;

    let (width, height) = scaled_dimensions(
        decoded.width(),
        decoded.height(),
        options.max_width,
        options.max_height,
    );
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    let encoded = encode_data_url(&resized, options.quality)?;
    if encoded.len() > options.max_encoded_len {
        return encode_data_url(&resized, RETRY_QUALITY);
    }
    Ok(encoded)
}

/// Pre-upload size check for raw files.
pub fn validate_image_size(len: usize) -> bool {
    len <= MAX_UPLOAD_BYTES
}

/// Aspect-preserving fit: landscape images clamp to the width bound,
/// portrait (and square) images to the height bound. Images already inside
/// the bounds keep their dimensions.
fn scaled_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width > height {
        if width > max_width {
            let scaled_height = (u64::from(height) * u64::from(max_width) / u64::from(width)) as u32;
            return (max_width, scaled_height.max(1));
        }
    } else if height > max_height {
        let scaled_width = (u64::from(width) * u64::from(max_height) / u64::from(height)) as u32;
        return (scaled_width.max(1), max_height);
    }
    (width, height)
}

fn encode_data_url(image: &DynamicImage, quality: u8) -> Result<String, ImageError> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    rgb.write_with_encoder(encoder).map_err(ImageError::Encode)?;
    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&buffer)))
}
