//! Photo payload normalization
//!
//! Model endpoints accept inline images; every source photo is bounded and
//! re-encoded to a common format before transmission regardless of its
//! original format or size.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

/// Maximum edge length accepted by most vision APIs
pub const MAX_IMAGE_DIM: u32 = 1024;
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),
}

/// Downsample, convert to RGB, re-encode as JPEG, and base64-encode a photo
pub fn encode_image_base64(path: &Path) -> Result<String, EncodeError> {
    let img = image::open(path)?;

    let img = if img.width() > MAX_IMAGE_DIM || img.height() > MAX_IMAGE_DIM {
        img.resize(MAX_IMAGE_DIM, MAX_IMAGE_DIM, FilterType::Lanczos3)
    } else {
        img
    };

    // Force 3-channel RGB; RGBA/grayscale sources would otherwise leak
    // through in their original color type
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;

    Ok(BASE64.encode(buffer.into_inner()))
}
