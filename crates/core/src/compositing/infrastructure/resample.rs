use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::shared::overlay::OverlayImage;

/// Resampling filter used to fit the overlay to each face box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
    /// Catmull-Rom; the usual default for photo-style resizing.
    #[default]
    Bicubic,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::Bicubic => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::Bicubic => "bicubic",
            ResampleFilter::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

impl FromStr for ResampleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResampleFilter::Nearest),
            "bilinear" => Ok(ResampleFilter::Bilinear),
            "bicubic" => Ok(ResampleFilter::Bicubic),
            "lanczos3" => Ok(ResampleFilter::Lanczos3),
            other => Err(format!(
                "Resample filter must be one of: nearest, bilinear, bicubic, lanczos3, got '{other}'"
            )),
        }
    }
}

/// Produces a fresh `width × height` copy of the overlay. The shared overlay
/// is only read.
pub fn resize_overlay(
    overlay: &OverlayImage,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> RgbaImage {
    imageops::resize(overlay.as_rgba(), width, height, filter.into())
}
