use serde::Serialize;

use crate::error::CountError;

/// Fixed horizontal boundary, in pixel rows from the top of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryLine {
    y: i32,
    ratio: Option<f64>,
}

impl BoundaryLine {
    /// Place the line at `round(frame_height * ratio)`.
    pub fn from_ratio(frame_height: u32, ratio: f64) -> Result<Self, CountError> {
        if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
            return Err(CountError::InvalidBoundaryRatio(ratio));
        }
        if frame_height == 0 {
            return Err(CountError::InvalidFrameHeight);
        }
        let y = (frame_height as f64 * ratio).round() as i32;
        Ok(Self {
            y,
            ratio: Some(ratio),
        })
    }

    /// A line at an explicit row, bypassing the ratio computation.
    pub fn at(y: i32) -> Self {
        Self { y, ratio: None }
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// The configured ratio, absent for a line placed with [`BoundaryLine::at`].
    #[inline]
    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    /// Caption drawn next to the line, e.g. `ROI LINE (65%)`.
    pub fn label(&self) -> String {
        match self.ratio {
            Some(ratio) => format!("ROI LINE ({}%)", (ratio * 100.0).round()),
            None => format!("ROI LINE (y={})", self.y),
        }
    }
}
