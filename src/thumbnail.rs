//! Embedded thumbnail fallback
//!
//! LightBurn stores a small PNG preview in every project. When no vector
//! content is recognized, that preview becomes the output.

use crate::lbrn::image::compact_base64;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{GenericImageView, ImageError, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to decode or encode image: {0}")]
    Image(#[from] ImageError),
}

/// How the thumbnail is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailMode {
    /// Decoded payload written as-is
    #[default]
    Raw,
    /// Re-encoded after scaling so the smaller side reaches `min_size`
    Upscale { min_size: u32 },
}

/// Decode a base64 thumbnail payload, ignoring embedded whitespace
pub fn decode_thumbnail(b64: &str) -> Result<Vec<u8>, ThumbnailError> {
    Ok(STANDARD.decode(compact_base64(b64))?)
}

fn upscale(bytes: &[u8], min_size: u32) -> Result<Vec<u8>, ThumbnailError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?;

    let (width, height) = img.dimensions();
    let smaller = width.min(height).max(1);
    let img = if smaller < min_size {
        let scale = f64::from(min_size) / f64::from(smaller);
        let new_width = (f64::from(width) * scale).round() as u32;
        let new_height = (f64::from(height) * scale).round() as u32;
        img.resize_exact(new_width, new_height, FilterType::Triangle)
    } else {
        img
    };

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// PNG bytes for a thumbnail payload
pub fn thumbnail_png(b64: &str, mode: ThumbnailMode) -> Result<Vec<u8>, ThumbnailError> {
    let bytes = decode_thumbnail(b64)?;
    match mode {
        ThumbnailMode::Raw => Ok(bytes),
        ThumbnailMode::Upscale { min_size } => upscale(&bytes, min_size),
    }
}
