//! Sketch preparation and upload.
//!
//! A source image is decoded, downscaled so its longest edge fits
//! [`MAX_EDGE`] (never upscaled), re-encoded as JPEG and pushed to the
//! Kie.ai file store as a base64 data URL. The returned hosted URL is what
//! the generation providers actually consume.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;

use crate::error::UploadError;
use crate::kie::{KieClient, UploadRequest};

/// Longest edge allowed in an uploaded sketch, matching provider input limits.
pub const MAX_EDGE: u32 = 1024;

const JPEG_QUALITY: u8 = 90;

/// One source image after upload: the hosted URL plus the name it was
/// stored under. Read-only once created.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub url: String,
    pub filename: String,
}

/// Downscale (if needed) and encode a decoded image as a JPEG data URL.
pub fn to_jpeg_data_url(img: &DynamicImage) -> Result<String, image::ImageError> {
    let img = if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.thumbnail(MAX_EDGE, MAX_EDGE)
    } else {
        img.clone()
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&buf)))
}

/// Read, prepare and upload one sketch; returns its hosted URL.
///
/// Any failure here is fatal only to this image — the caller keeps going
/// with siblings that already uploaded.
pub async fn upload_sketch(client: &KieClient, path: &Path) -> Result<UploadedAsset, UploadError> {
    let display = path.display().to_string();

    let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
        path: display.clone(),
        source,
    })?;

    let img = image::load_from_memory(&bytes).map_err(|source| UploadError::Decode {
        path: display.clone(),
        source,
    })?;

    let data_url = to_jpeg_data_url(&img).map_err(|source| UploadError::Encode {
        path: display.clone(),
        source,
    })?;

    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| format!("{s}.jpg"))
        .unwrap_or_else(|| "sketch.jpg".to_string());

    let req = UploadRequest {
        base64_data: data_url,
        filename: filename.clone(),
        upload_path: "temp".to_string(),
    };

    let url = client
        .upload_file(&req)
        .await
        .map_err(|source| UploadError::Store {
            filename: filename.clone(),
            source,
        })?;

    Ok(UploadedAsset { url, filename })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn data_url_bytes(url: &str) -> Vec<u8> {
        let b64 = url.strip_prefix("data:image/jpeg;base64,").unwrap();
        BASE64.decode(b64).unwrap()
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 60));
        let url = to_jpeg_data_url(&img).unwrap();

        let decoded = image::load_from_memory(&data_url_bytes(&url)).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 60);
    }

    #[test]
    fn large_image_is_bounded_by_longest_edge() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2048, 1024));
        let url = to_jpeg_data_url(&img).unwrap();

        let decoded = image::load_from_memory(&data_url_bytes(&url)).unwrap();
        assert!(decoded.width() <= MAX_EDGE);
        assert!(decoded.height() <= MAX_EDGE);
        // Aspect ratio 2:1 survives the downscale.
        assert_eq!(decoded.width(), 1024);
        assert_eq!(decoded.height(), 512);
    }

    #[test]
    fn output_is_a_jpeg_data_url() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        let url = to_jpeg_data_url(&img).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let bytes = data_url_bytes(&url);
        // JPEG magic number.
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
