//! Content sniffing, checksums and thumbnails for downloaded images.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use sha2::{Digest, Sha256};

use pokedex_core::{DerivedArtifact, ThumbFormat, ThumbnailSettings};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Everything the fetch pass derives from an original's bytes.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    pub mime: String,
    /// Extension for the saved original, from the sniffed format.
    pub extension: &'static str,
    pub checksum: String,
    pub thumbnail: Option<DerivedArtifact>,
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactProcessor {
    settings: ThumbnailSettings,
}

impl ArtifactProcessor {
    pub fn new(settings: ThumbnailSettings) -> Self {
        Self { settings }
    }

    /// Sniff, hash and thumbnail `bytes`.
    ///
    /// Never fails: a thumbnail that cannot be produced is logged and left
    /// out, and unrecognized content is typed as `application/octet-stream`.
    pub fn process(&self, bytes: &[u8]) -> ProcessedArtifact {
        let (mime, extension) = sniff_mime(bytes);
        let checksum = sha256_hex(bytes);

        let thumbnail = match make_thumbnail(bytes, &self.settings) {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!(
                    "Thumbnail generation failed ({} bytes, {}): {}",
                    bytes.len(),
                    mime,
                    e
                );
                None
            }
        };

        ProcessedArtifact {
            mime: mime.to_string(),
            extension,
            checksum,
            thumbnail,
        }
    }
}

/// Detect the MIME type and a file extension from the content signature.
pub fn sniff_mime(bytes: &[u8]) -> (&'static str, &'static str) {
    match image::guess_format(bytes) {
        Ok(format) => {
            let ext = format.extensions_str().first().copied().unwrap_or("bin");
            (format.to_mime_type(), ext)
        }
        Err(_) => (OCTET_STREAM, "bin"),
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Decode `bytes` and encode a thumbnail bounded by the configured box.
pub fn make_thumbnail(
    bytes: &[u8],
    settings: &ThumbnailSettings,
) -> Result<DerivedArtifact, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = scale_to_fit(
        img.width(),
        img.height(),
        settings.max_width,
        settings.max_height,
    );
    let img = if (w, h) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    };

    let mut out = Cursor::new(Vec::new());
    match settings.format {
        ThumbFormat::Webp => {
            let rgba = img.to_rgba8();
            WebPEncoder::new_lossless(&mut out).write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        ThumbFormat::Jpeg => {
            let rgb = flatten_on_white(&img);
            JpegEncoder::new_with_quality(&mut out, settings.quality).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }

    Ok(DerivedArtifact {
        thumbnail_bytes: out.into_inner(),
        thumbnail_mime: settings.format.mime().to_string(),
        extension: settings.format.extension(),
    })
}

/// Dimensions that fit inside `max_w` x `max_h` with the aspect ratio kept.
/// Images already inside the box are left alone.
pub(crate) fn scale_to_fit(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }

    if src_w <= max_w && src_h <= max_h {
        return (src_w, src_h);
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    (new_w.clamp(1, max_w), new_h.clamp(1, max_h))
}

// JPEG has no alpha channel; sprites are mostly transparent PNGs.
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        let a = p[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a)) / 255) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

#[cfg(test)]
#[path = "tests/artifact_tests.rs"]
mod tests;
