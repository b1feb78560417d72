use std::time::Instant;

use crate::compositing::domain::frame_compositor::FrameCompositor;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::box_filter::{partition_valid_boxes, DiscardedBox};
use crate::pipeline::pipeline_logger::{PipelineLogger, STAGE_COMPOSITE, STAGE_DETECT};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::StampError;
use crate::shared::frame::Frame;

/// Result of stamping one image.
#[derive(Debug)]
pub struct StampOutcome {
    pub image: Frame,
    /// Boxes that passed validation, in compositing order.
    pub faces: Vec<BoundingBox>,
    pub discarded: Vec<DiscardedBox>,
    /// False when nothing was composited (no usable faces, or no overlay).
    pub stamped: bool,
}

impl StampOutcome {
    /// Every face the locator reported, including discarded ones.
    pub fn faces_detected(&self) -> usize {
        self.faces.len() + self.discarded.len()
    }
}

/// Single-image stamping pipeline: detect → validate boxes → composite.
///
/// Without a compositor the use case runs in degraded mode: faces are still
/// located and reported, but the image is returned unstamped.
pub struct StampImageUseCase {
    detector: Box<dyn FaceDetector>,
    compositor: Option<Box<dyn FrameCompositor>>,
    logger: Box<dyn PipelineLogger>,
}

impl StampImageUseCase {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        compositor: Option<Box<dyn FrameCompositor>>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            detector,
            compositor,
            logger,
        }
    }

    /// Processes one normalized frame.
    ///
    /// Detection failures abort the request. Boxes outside the frame are
    /// dropped individually and returned in [`StampOutcome::discarded`].
    pub fn execute(&mut self, frame: Frame) -> Result<StampOutcome, StampError> {
        let started = Instant::now();
        let located = self.detector.detect(&frame)?;
        self.logger.timing(STAGE_DETECT, elapsed_ms(started));

        let (faces, discarded) = partition_valid_boxes(&located, frame.width(), frame.height());
        self.logger.metric("faces", located.len() as f64);
        self.logger.metric("discarded", discarded.len() as f64);

        if faces.is_empty() {
            self.logger.info(if located.is_empty() {
                "No faces detected"
            } else {
                "No usable face boxes; image left unchanged"
            });
            return Ok(StampOutcome {
                image: frame,
                faces,
                discarded,
                stamped: false,
            });
        }

        let Some(compositor) = self.compositor.as_ref() else {
            log::warn!(
                "Overlay unavailable; {} face(s) detected but not stamped",
                faces.len()
            );
            return Ok(StampOutcome {
                image: frame,
                faces,
                discarded,
                stamped: false,
            });
        };

        let started = Instant::now();
        let image = compositor.composite(&frame, &faces)?;
        self.logger.timing(STAGE_COMPOSITE, elapsed_ms(started));
        self.logger
            .info(&format!("Stamped {} face(s)", faces.len()));

        Ok(StampOutcome {
            image,
            faces,
            discarded,
            stamped: true,
        })
    }

    /// Flushes the logger's end-of-run summary.
    pub fn finish(&self) {
        self.logger.summary();
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
