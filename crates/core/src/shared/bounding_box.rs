use std::fmt;

use crate::shared::error::StampError;

/// Axis-aligned face box in `(top, right, bottom, left)` pixel coordinates.
///
/// `right` and `bottom` are exclusive. Coordinates are signed so raw detector
/// output can be represented before it is checked with [`BoundingBox::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BoundingBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Converts a top-left corner plus size into the canonical ordering:
    /// `(y, x + w, y + h, x)`.
    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(y, x.saturating_add(w), y.saturating_add(h), x)
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Checks `0 <= top < bottom <= height` and `0 <= left < right <= width`.
    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), StampError> {
        let reason = if self.width() <= 0 || self.height() <= 0 {
            Some("non-positive width or height")
        } else if self.top < 0 || self.left < 0 {
            Some("starts before the image origin")
        } else if self.right as i64 > image_width as i64 || self.bottom as i64 > image_height as i64 {
            Some("extends past the image edge")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StampError::InvalidBoundingBox {
                bbox: *self,
                image_width,
                image_height,
                reason,
            }),
            None => Ok(()),
        }
    }

}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(top={}, right={}, bottom={}, left={})",
            self.top, self.right, self.bottom, self.left
        )
    }
}
