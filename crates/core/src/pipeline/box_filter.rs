use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::StampError;

/// A located box that could not be stamped, with the reason.
#[derive(Debug)]
pub struct DiscardedBox {
    pub bbox: BoundingBox,
    pub error: StampError,
}

/// Splits located boxes into those safe to composite and those to discard.
///
/// Order of the kept boxes is preserved, since compositing order decides
/// which stamp wins where boxes overlap. Each discard is logged.
pub fn partition_valid_boxes(
    boxes: &[BoundingBox],
    image_width: u32,
    image_height: u32,
) -> (Vec<BoundingBox>, Vec<DiscardedBox>) {
    let mut kept = Vec::with_capacity(boxes.len());
    let mut discarded = Vec::new();

    for b in boxes {
        match b.validate(image_width, image_height) {
            Ok(()) => kept.push(*b),
            Err(error) => {
                log::warn!("Discarding face: {error}");
                discarded.push(DiscardedBox { bbox: *b, error });
            }
        }
    }

    (kept, discarded)
}
