//! Traits for frame acquisition and object detection backends.

use crate::tracker::Detection;

/// One decoded video frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// 1-based position in the stream
    pub index: u64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw pixel bytes (layout depends on the source)
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(index: u64, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            index,
            width,
            height,
            data,
        }
    }

    /// A frame without pixel data, for sources whose detections come precomputed.
    pub fn blank(index: u64, width: u32, height: u32) -> Self {
        Self::new(index, width, height, Vec::new())
    }
}

/// Source of frames consumed strictly in arrival order.
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Frame dimensions `(width, height)`, known before the first frame is read.
    fn frame_size(&self) -> (u32, u32);

    /// Read the next frame, or `None` once the input is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any person detector to the counting pipeline.
///
/// # Example
///
/// ```ignore
/// use footfall_counter::{Detection, Detector, Frame};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl Detector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return person boxes scoring at least `threshold`
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Detector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on a frame and return person detections.
    ///
    /// # Arguments
    /// * `frame` - The frame to analyse
    /// * `threshold` - Minimum confidence a detection needs to be returned
    fn detect(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<Detection>, Self::Error>;
}

/// Keep only detections scoring at least `threshold`.
pub fn filter_confident(detections: &mut Vec<Detection>, threshold: f32) {
    detections.retain(|d| d.score >= threshold);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_confident_keeps_threshold() {
        let mut detections = vec![
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.49),
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.5),
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.9),
        ];
        filter_confident(&mut detections, 0.5);
        assert_eq!(detections.len(), 2);
        assert!(detections.iter().all(|d| d.score >= 0.5));
    }
}
