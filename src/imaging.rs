use crate::errors::ImageError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use tracing::debug;

pub const MAX_EDGE: u32 = 1000;
pub const JPEG_QUALITY: u8 = 70;
pub const UPLOAD_MIME: &str = "image/jpeg";

/// Accepts raw base64 or a `data:<mime>;base64,` URL.
pub fn decode_base64_image(payload: &str) -> Result<Vec<u8>, ImageError> {
    let data = match payload.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    Ok(STANDARD.decode(data.trim())?)
}

/// Shrinks the long edge to [`MAX_EDGE`] and re-encodes as JPEG.
pub fn compress_image(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let mut img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    if width.max(height) > MAX_EDGE {
        img = img.resize(MAX_EDGE, MAX_EDGE, FilterType::Triangle);
    }

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    debug!(
        from = bytes.len(),
        to = out.len(),
        width = rgb.width(),
        height = rgb.height(),
        "compressed upload"
    );
    Ok(out)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn upload_filename(unix_millis: i64) -> String {
    format!("upload-{unix_millis}.jpg")
}
