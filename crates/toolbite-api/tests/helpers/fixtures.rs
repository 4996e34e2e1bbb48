//! Test fixtures: generated images and fake documents.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// Input the fake engines treat as unreadable.
pub const CORRUPT_INPUT: &[u8] = b"corrupt";

fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut seed: u32 = 0x2545_f491;
    RgbImage::from_fn(width, height, |x, y| {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let noise = (seed & 0x3f) as u8;
        image::Rgb([
            (x * 4) as u8 ^ noise,
            (y * 4) as u8,
            ((x + y) * 2) as u8 ^ noise,
        ])
    })
}

/// A JPEG saved at maximum quality, which recompression at 70 always shrinks.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(noisy_image(width, height))
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 100))
        .unwrap();
    buf
}

/// A PNG encoded with the default settings.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(noisy_image(width, height))
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// Bytes the fake Word converter turns into HTML.
pub fn create_test_docx() -> Vec<u8> {
    b"PK\x03\x04 quarterly report".to_vec()
}

/// Bytes the fake rasterizer accepts as a PDF.
pub fn create_test_pdf() -> Vec<u8> {
    b"%PDF-1.7\n%fake document\n".to_vec()
}
