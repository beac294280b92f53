use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use pokedex_core::{ThumbFormat, ThumbnailSettings};

use crate::artifact::{
    ArtifactProcessor, OCTET_STREAM, make_thumbnail, scale_to_fit, sha256_hex, sniff_mime,
};

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba([200, 30, 30, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn test_scale_to_fit_landscape() {
    let (w, h) = scale_to_fit(475, 300, 200, 200);
    assert_eq!(w, 200);
    assert!(h <= 200);
    let ratio_orig = 475.0 / 300.0;
    let ratio_new = w as f64 / h as f64;
    assert!((ratio_orig - ratio_new).abs() < 0.02);
}

#[test]
fn test_scale_to_fit_portrait() {
    let (w, h) = scale_to_fit(300, 900, 200, 200);
    assert_eq!(h, 200);
    assert!(w <= 200);
}

#[test]
fn test_scale_to_fit_no_upscale() {
    assert_eq!(scale_to_fit(96, 96, 200, 200), (96, 96));
}

#[test]
fn test_scale_to_fit_zero() {
    assert_eq!(scale_to_fit(0, 0, 200, 200), (0, 0));
}

#[test]
fn test_scale_to_fit_extreme_aspect_stays_nonzero() {
    let (w, h) = scale_to_fit(10_000, 1, 200, 200);
    assert_eq!(w, 200);
    assert_eq!(h, 1);
}

#[test]
fn test_sniff_png() {
    assert_eq!(sniff_mime(&png_bytes(4, 4)), ("image/png", "png"));
}

#[test]
fn test_sniff_ignores_garbage() {
    assert_eq!(sniff_mime(b"<html>not an image</html>"), (OCTET_STREAM, "bin"));
    assert_eq!(sniff_mime(&[]), (OCTET_STREAM, "bin"));
}

#[test]
fn test_sha256_known_vector() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_webp_thumbnail_fits_box() {
    let settings = ThumbnailSettings::default();
    let thumb = make_thumbnail(&png_bytes(475, 475), &settings).unwrap();
    assert_eq!(thumb.thumbnail_mime, "image/webp");
    assert_eq!(thumb.extension, "webp");

    let decoded = image::load_from_memory(&thumb.thumbnail_bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 200));
}

#[test]
fn test_jpeg_thumbnail_is_lossy_rgb() {
    let settings = ThumbnailSettings {
        format: ThumbFormat::Jpeg,
        ..ThumbnailSettings::default()
    };
    let thumb = make_thumbnail(&png_bytes(400, 200), &settings).unwrap();
    assert_eq!(thumb.thumbnail_mime, "image/jpeg");
    assert_eq!(sniff_mime(&thumb.thumbnail_bytes).0, "image/jpeg");

    let decoded = image::load_from_memory(&thumb.thumbnail_bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 100));
}

#[test]
fn test_corrupt_bytes_still_produce_checksum_and_mime() {
    let processor = ArtifactProcessor::default();
    // A PNG signature followed by junk: sniffable, not decodable.
    let mut bytes = png_bytes(8, 8);
    bytes.truncate(20);

    let processed = processor.process(&bytes);
    assert_eq!(processed.mime, "image/png");
    assert_eq!(processed.extension, "png");
    assert_eq!(processed.checksum, sha256_hex(&bytes));
    assert!(processed.thumbnail.is_none());
}

#[test]
fn test_process_valid_png() {
    let processor = ArtifactProcessor::default();
    let bytes = png_bytes(32, 16);
    let processed = processor.process(&bytes);
    assert_eq!(processed.mime, "image/png");
    let thumb = processed.thumbnail.unwrap();
    let decoded = image::load_from_memory(&thumb.thumbnail_bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 16));
}
