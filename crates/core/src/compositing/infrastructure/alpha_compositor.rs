use std::sync::Arc;

use crate::compositing::domain::frame_compositor::FrameCompositor;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::StampError;
use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::overlay::OverlayImage;

use super::resample::{resize_overlay, ResampleFilter};

/// Channels per overlay pixel (RGBA).
const OVERLAY_CHANNELS: usize = 4;

/// "Over" compositing of a shared RGBA overlay onto every face box.
///
/// Holds the overlay behind an `Arc` so one loaded asset can serve any number
/// of compositors and threads without copying or locking.
pub struct AlphaCompositor {
    overlay: Arc<OverlayImage>,
    filter: ResampleFilter,
}

impl AlphaCompositor {
    pub fn new(overlay: Arc<OverlayImage>, filter: ResampleFilter) -> Self {
        Self { overlay, filter }
    }
}

impl FrameCompositor for AlphaCompositor {
    fn composite(&self, frame: &Frame, boxes: &[BoundingBox]) -> Result<Frame, StampError> {
        apply_overlay(frame, boxes, &self.overlay, self.filter)
    }
}

/// Stamps `overlay` onto each box of `frame` and returns the result.
///
/// Boxes are applied in order, so where boxes overlap the later one wins.
/// All boxes are validated first; on error nothing is produced.
pub fn apply_overlay(
    frame: &Frame,
    boxes: &[BoundingBox],
    overlay: &OverlayImage,
    filter: ResampleFilter,
) -> Result<Frame, StampError> {
    for b in boxes {
        b.validate(frame.width(), frame.height())?;
    }

    let mut output = frame.clone();
    for b in boxes {
        blend_box(&mut output, b, overlay, filter);
    }
    Ok(output)
}

/// Blends a box-sized copy of the overlay into `output`. `b` must be valid.
fn blend_box(output: &mut Frame, b: &BoundingBox, overlay: &OverlayImage, filter: ResampleFilter) {
    let (bw, bh) = (b.width() as usize, b.height() as usize);
    let (top, left) = (b.top as usize, b.left as usize);
    let stamp = resize_overlay(overlay, bw as u32, bh as u32, filter);
    let stamp = stamp.as_raw();

    let fw = output.width() as usize;
    let data = output.data_mut();

    for row in 0..bh {
        let dst_offset = ((top + row) * fw + left) * CHANNELS;
        let src_offset = row * bw * OVERLAY_CHANNELS;
        let dst_row = &mut data[dst_offset..dst_offset + bw * CHANNELS];
        let src_row = &stamp[src_offset..src_offset + bw * OVERLAY_CHANNELS];

        for (px, ov) in dst_row
            .chunks_exact_mut(CHANNELS)
            .zip(src_row.chunks_exact(OVERLAY_CHANNELS))
        {
            let alpha = ov[CHANNELS] as f32 / 255.0;
            for c in 0..CHANNELS {
                px[c] = blend_channel(ov[c], px[c], alpha);
            }
        }
    }
}

/// `fg * alpha + bg * (1 - alpha)`, rounded back into `[0, 255]`.
fn blend_channel(fg: u8, bg: u8, alpha: f32) -> u8 {
    let value = fg as f32 * alpha + bg as f32 * (1.0 - alpha);
    value.round().clamp(0.0, 255.0) as u8
}
