use std::io::Cursor;
use std::path::Path;

use image::io::Reader;
use image::{DynamicImage, ImageError};

use crate::buffer::{ChannelOrder, PixelBuffer};
use crate::error::{Error, Result};

const MEMORY_SOURCE: &str = "<memory>";

/// Reads and decodes the image at `path` into a BGR buffer.
///
/// Every decodable layout is flattened to three 8-bit color channels; alpha
/// is discarded.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let source = path.display().to_string();
    log::info!("loading image from {}", source);

    let reader = Reader::open(path)
        .map_err(|e| decode_error(&source, e))?
        .with_guessed_format()
        .map_err(|e| decode_error(&source, e))?;
    let img = reader
        .decode()
        .map_err(|e| decode_error(&source, describe(e)))?;

    into_bgr(img)
}

/// Decodes an encoded image held in memory into a BGR buffer.
pub fn load_from_memory(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(MEMORY_SOURCE, e))?
        .decode()
        .map_err(|e| decode_error(MEMORY_SOURCE, describe(e)))?;

    into_bgr(img)
}

fn into_bgr(img: DynamicImage) -> Result<PixelBuffer> {
    let rgb = img.into_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut data = rgb.into_raw();
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
    log::debug!("decoded {}x{} image", width, height);

    PixelBuffer::from_raw(height, width, 3, ChannelOrder::Bgr, data)
}

fn describe(e: ImageError) -> String {
    if matches!(e, ImageError::Unsupported(_)) {
        format!("unsupported image format ({})", e)
    } else {
        e.to_string()
    }
}

fn decode_error(source: &str, reason: impl ToString) -> Error {
    Error::Decode {
        path: source.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decodes_into_bgr_order() {
        let img = RgbImage::from_pixel(2, 1, Rgb([30, 20, 10]));
        let buf = load_from_memory(&encode_png(DynamicImage::ImageRgb8(img))).unwrap();

        assert_eq!(buf.order(), ChannelOrder::Bgr);
        assert_eq!(buf.shape(), (1, 2, 3));
        assert_eq!(buf.pixel(0, 1), Some(&[10, 20, 30][..]));
    }

    #[test]
    fn drops_alpha() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 128]));
        let buf = load_from_memory(&encode_png(DynamicImage::ImageRgba8(img))).unwrap();

        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.pixel(0, 0), Some(&[3, 2, 1][..]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = load_from_memory(b"definitely not an image").unwrap_err();
        match err {
            Error::Decode { path, .. } => assert_eq!(path, MEMORY_SOURCE),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
