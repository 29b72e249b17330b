//! Validated construction of detections from detector-native box layouts.

use crate::error::CountError;
use crate::tracker::{Detection, Rect};

/// Collects a box and a score, then checks them in [`DetectionBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    rect: Rect,
    score: f32,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Corner layout `(x1, y1, x2, y2)`.
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.rect = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Centre layout `(cx, cy, w, h)`, as most YOLO heads emit.
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.rect = Rect::new(cx - w / 2.0, cy - h / 2.0, w, h);
        self
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`, rejecting non-finite or empty boxes.
    pub fn build(self) -> Result<Detection, CountError> {
        let Self { rect, score } = self;
        if !rect.is_finite() || !score.is_finite() {
            return Err(CountError::InvalidDetection(format!(
                "non-finite values in {rect:?} (score {score})"
            )));
        }
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(CountError::InvalidDetection(format!(
                "empty box {:?}",
                rect.to_tlbr()
            )));
        }
        Ok(Detection::from_rect(rect, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_corners() {
        let det = DetectionBuilder::new()
            .score(0.7)
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .build()
            .unwrap();

        assert_eq!(det.score, 0.7);
        assert_eq!(det.bbox.bottom(), 80.0);
    }

    #[test]
    fn test_xywh_matches_tlbr() {
        let a = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build().unwrap();
        let b = DetectionBuilder::new().tlbr(10.0, 20.0, 50.0, 80.0).build().unwrap();
        assert_eq!(a.bbox, b.bbox);
    }

    #[test]
    fn test_rejects_inverted_box() {
        assert!(DetectionBuilder::new().tlbr(50.0, 80.0, 10.0, 20.0).build().is_err());
        assert!(
            DetectionBuilder::new()
                .tlbr(0.0, f32::NAN, 10.0, 20.0)
                .build()
                .is_err()
        );
    }
}
