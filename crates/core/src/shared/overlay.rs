use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::shared::error::StampError;

/// The decorative stamp composited over each face.
///
/// Loaded once and never mutated afterwards; callers share it behind an
/// `Arc` across requests. Construction guarantees four channels with a real
/// alpha plane and non-zero dimensions.
#[derive(Clone, Debug)]
pub struct OverlayImage {
    pixels: RgbaImage,
}

impl OverlayImage {
    /// Reads and validates an overlay file.
    pub fn load(path: &Path) -> Result<Self, StampError> {
        let img = image::open(path).map_err(|e| {
            StampError::OverlayAsset(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_dynamic(img)
    }

    /// Accepts a decoded image only if its source color type carries alpha.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self, StampError> {
        if !img.color().has_alpha() {
            return Err(StampError::OverlayAsset(format!(
                "overlay has no alpha channel (color type {:?})",
                img.color()
            )));
        }
        Self::from_rgba(img.into_rgba8())
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, StampError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(StampError::OverlayAsset(
                "overlay dimensions are zero".to_string(),
            ));
        }
        Ok(Self { pixels })
    }

    /// Overlay of a single RGBA color.
    #[cfg(test)]
    pub(crate) fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, StampError> {
        Self::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}
