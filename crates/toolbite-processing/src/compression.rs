use bytes::Bytes;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{AnimationDecoder, DynamicImage, ImageFormat};
use std::io::Cursor;

/// Quality used when the request does not carry a usable one.
pub const DEFAULT_QUALITY: u8 = 70;

/// Formats the recompressor re-encodes within their own family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFamily {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

impl ImageFamily {
    /// Detect the family from magic bytes. The declared mime type is ignored.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Jpeg => Some(ImageFamily::Jpeg),
            ImageFormat::Png => Some(ImageFamily::Png),
            ImageFormat::Gif => Some(ImageFamily::Gif),
            ImageFormat::Bmp => Some(ImageFamily::Bmp),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFamily::Jpeg => "image/jpeg",
            ImageFamily::Png => "image/png",
            ImageFamily::Gif => "image/gif",
            ImageFamily::Bmp => "image/bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ImageFamily::Jpeg => ImageFormat::Jpeg,
            ImageFamily::Png => ImageFormat::Png,
            ImageFamily::Gif => ImageFormat::Gif,
            ImageFamily::Bmp => ImageFormat::Bmp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Unsupported or unrecognized image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] anyhow::Error),
}

impl CodecError {
    /// True when the input itself is at fault rather than the encoder.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CodecError::UnsupportedFormat | CodecError::Decode(_))
    }
}

#[derive(Debug, Clone)]
pub struct RecompressOutcome {
    pub bytes: Bytes,
    pub family: ImageFamily,
    pub original_size: usize,
    pub compressed_size: usize,
    /// The re-encode was not smaller, so the input is returned unchanged.
    pub kept_original: bool,
}

/// Re-encode `data` in its own format family at `quality` (1-100).
///
/// Never returns something larger than, or the same size as, a fresh encode
/// would have been: if the new buffer is not strictly smaller, the original
/// bytes come back untouched.
pub fn recompress(data: &Bytes, quality: u8) -> Result<RecompressOutcome, CodecError> {
    let family = ImageFamily::detect(data).ok_or(CodecError::UnsupportedFormat)?;

    let encoded = match family {
        ImageFamily::Jpeg => compress_jpeg(&decode(data, family)?, quality)?,
        ImageFamily::Png => compress_png(&decode(data, family)?)?,
        ImageFamily::Bmp => compress_bmp(&decode(data, family)?)?,
        ImageFamily::Gif => compress_gif(data, quality)?,
    };

    let original_size = data.len();
    if encoded.len() >= original_size {
        return Ok(RecompressOutcome {
            bytes: data.clone(),
            family,
            original_size,
            compressed_size: original_size,
            kept_original: true,
        });
    }

    Ok(RecompressOutcome {
        compressed_size: encoded.len(),
        bytes: Bytes::from(encoded),
        family,
        original_size,
        kept_original: false,
    })
}

fn decode(data: &[u8], family: ImageFamily) -> Result<DynamicImage, CodecError> {
    image::load_from_memory_with_format(data, family.image_format()).map_err(CodecError::Decode)
}

/// Progressive mozjpeg encode with optimized Huffman tables.
fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let encode = || -> std::io::Result<Vec<u8>> {
        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(&rgb_img)?;
        comp.finish()
    };

    encode().map_err(|e| CodecError::Encode(e.into()))
}

/// Lossless; quality has no effect on PNG output.
fn compress_png(img: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| CodecError::Encode(e.into()))?;
    Ok(buffer)
}

fn compress_bmp(img: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Bmp)
        .map_err(|e| CodecError::Encode(e.into()))?;
    Ok(buffer)
}

/// Frame-by-frame re-encode; lower quality means a faster, coarser quantizer.
fn compress_gif(data: &[u8], quality: u8) -> Result<Vec<u8>, CodecError> {
    let decoder = GifDecoder::new(Cursor::new(data)).map_err(CodecError::Decode)?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(CodecError::Decode)?;

    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buffer, gif_speed(quality));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| CodecError::Encode(e.into()))?;
        encoder
            .encode_frames(frames)
            .map_err(|e| CodecError::Encode(e.into()))?;
    }
    Ok(buffer)
}

/// Map quality 1-100 onto the quantizer speed range 30-1.
fn gif_speed(quality: u8) -> i32 {
    let quality = quality.clamp(1, 100) as i32;
    1 + (100 - quality) * 29 / 99
}
