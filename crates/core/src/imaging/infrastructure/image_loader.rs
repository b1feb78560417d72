use std::path::Path;

use image::DynamicImage;

use crate::shared::error::StampError;
use crate::shared::frame::Frame;

/// Decodes an image file into a normalized RGB [`Frame`].
///
/// The format is sniffed from the file contents, not the extension.
pub fn load_image(path: &Path) -> Result<Frame, StampError> {
    let bytes = std::fs::read(path)
        .map_err(|e| StampError::ImageDecode(format!("cannot read {}: {e}", path.display())))?;
    decode_image(&bytes)
}

/// Decodes an in-memory encoded image (JPEG, PNG, ...) into RGB.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, StampError> {
    let img = image::load_from_memory(bytes).map_err(|e| StampError::ImageDecode(e.to_string()))?;
    normalize(img)
}

/// Converts any color mode (grayscale, palette, alpha, 16-bit) to 8-bit RGB.
///
/// Alpha is dropped, not composited against a background.
pub fn normalize(img: DynamicImage) -> Result<Frame, StampError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(StampError::ImageDecode("image dimensions are zero".to_string()));
    }
    let rgb = match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            log::debug!("Converting {:?} input to RGB", other.color());
            other.into_rgb8()
        }
    };
    Ok(Frame::from_rgb_image(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    /// 2×2 indexed PNG (color type 3) with palette red, green, blue, white,
    /// pixels in palette order.
    const INDEXED_PNG: [u8; 95] = [
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49,
        0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02, 0x08, 0x03,
        0x00, 0x00, 0x00, 0x45, 0x68, 0xfd, 0x16, 0x00, 0x00, 0x00, 0x0c, 0x50, 0x4c,
        0x54, 0x45, 0xff, 0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff,
        0xff, 0xfb, 0x00, 0x60, 0xf6, 0x00, 0x00, 0x00, 0x0e, 0x49, 0x44, 0x41, 0x54,
        0x78, 0x9c, 0x63, 0x60, 0x60, 0x64, 0x60, 0x62, 0x06, 0x00, 0x00, 0x11, 0x00,
        0x07, 0x9e, 0xa2, 0x2a, 0x12, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
        0xae, 0x42, 0x60, 0x82,
    ];

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn patterned_rgb(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8]))
    }

    #[test]
    fn test_rgb_png_is_identity() {
        let img = patterned_rgb(13, 9);
        let bytes = encode(&DynamicImage::ImageRgb8(img.clone()), ImageFormat::Png);
        let frame = decode_image(&bytes).unwrap();
        assert_eq!(frame.width(), 13);
        assert_eq!(frame.height(), 9);
        assert_eq!(frame.data(), img.as_raw().as_slice());
    }

    #[test]
    fn test_normalize_twice_is_idempotent() {
        let frame = normalize(DynamicImage::ImageRgb8(patterned_rgb(5, 4))).unwrap();
        let again = normalize(DynamicImage::ImageRgb8(frame.to_rgb_image())).unwrap();
        assert_eq!(frame, again);
    }

    #[test]
    fn test_grayscale_expands_to_three_channels() {
        let gray = GrayImage::from_pixel(4, 3, Luma([90]));
        let bytes = encode(&DynamicImage::ImageLuma8(gray), ImageFormat::Png);
        let frame = decode_image(&bytes).unwrap();
        assert_eq!(frame.data().len(), 4 * 3 * 3);
        assert_eq!(frame.pixel(2, 3), [90, 90, 90]);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        let frame = normalize(DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(frame.pixel(1, 1), [10, 20, 30]);
    }

    #[test]
    fn test_indexed_png_expands_palette_to_rgb() {
        let frame = decode_image(&INDEXED_PNG).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 2));
        assert_eq!(frame.data().len(), 2 * 2 * 3);
        assert_eq!(frame.pixel(0, 0), [255, 0, 0]);
        assert_eq!(frame.pixel(0, 1), [0, 255, 0]);
        assert_eq!(frame.pixel(1, 0), [0, 0, 255]);
        assert_eq!(frame.pixel(1, 1), [255, 255, 255]);
    }

    #[test]
    fn test_rgb16_png_reduced_to_8_bit() {
        let wide: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(3, 2, Rgb([257 * 10, 257 * 20, 257 * 30]));
        let bytes = encode(&DynamicImage::ImageRgb16(wide), ImageFormat::Png);
        let frame = decode_image(&bytes).unwrap();
        assert_eq!(frame.data().len(), 3 * 2 * 3);
        assert_eq!(frame.pixel(1, 2), [10, 20, 30]);
    }

    #[test]
    fn test_luma16_png_reduced_to_8_bit_rgb() {
        let wide: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Luma([257 * 90]));
        let bytes = encode(&DynamicImage::ImageLuma16(wide), ImageFormat::Png);
        let frame = decode_image(&bytes).unwrap();
        assert_eq!(frame.data().len(), 2 * 2 * 3);
        assert_eq!(frame.pixel(1, 0), [90, 90, 90]);
    }

    #[test]
    fn test_jpeg_decodes_with_expected_size() {
        let img = RgbImage::from_pixel(32, 24, Rgb([200, 200, 200]));
        let bytes = encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg);
        let frame = decode_image(&bytes).unwrap();
        assert_eq!((frame.width(), frame.height()), (32, 24));
        let px = frame.pixel(10, 10);
        assert!(px.iter().all(|&v| v.abs_diff(200) <= 2));
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, StampError::ImageDecode(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        patterned_rgb(6, 6).save(&path).unwrap();
        let frame = load_image(&path).unwrap();
        assert_eq!(frame.pixel(0, 1), [7, 0, 3]);
    }

    #[test]
    fn test_load_missing_file_is_decode_error() {
        let err = load_image(Path::new("/nonexistent/face.png")).unwrap_err();
        assert!(matches!(err, StampError::ImageDecode(_)));
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        let err = normalize(DynamicImage::ImageRgb8(RgbImage::new(0, 0))).unwrap_err();
        assert!(err.to_string().contains("zero"));
    }
}
