//! Playback of precomputed detections.
//!
//! The input is plain text with one detection per line:
//!
//! ```text
//! # frame,x1,y1,x2,y2,score
//! 1,100,40,160,210,0.91
//! 2,101,46,161,216,0.88
//! ```
//!
//! Frame numbers are 1-based; frames without detections may be omitted.
//! Blank lines and lines starting with `#` are ignored.

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;

use thiserror::Error;

use crate::integration::{DetectionBuilder, Detector, Frame, FrameSource};
use crate::tracker::Detection;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read detections file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Detections for a whole clip, grouped by frame.
#[derive(Debug, Clone, Default)]
pub struct DetectionReplay {
    width: u32,
    height: u32,
    frame_count: u64,
    detections: HashMap<u64, Vec<Detection>>,
}

impl DetectionReplay {
    /// Parse detections for frames of `width` x `height` pixels.
    pub fn parse(text: &str, width: u32, height: u32) -> Result<Self, ReplayError> {
        let mut replay = Self {
            width,
            height,
            ..Self::default()
        };

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (frame, detection) = parse_line(line).map_err(|message| ReplayError::Parse {
                line: i + 1,
                message,
            })?;
            replay.frame_count = replay.frame_count.max(frame);
            replay.detections.entry(frame).or_default().push(detection);
        }
        Ok(replay)
    }

    pub fn load(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, width, height)
    }

    /// Extend playback to at least `count` frames.
    pub fn with_frame_count(mut self, count: u64) -> Self {
        self.frame_count = self.frame_count.max(count);
        self
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn detection_count(&self) -> usize {
        self.detections.values().map(Vec::len).sum()
    }

    /// Split into the frame source and detector halves consumed by the pipeline.
    pub fn split(self) -> (ReplayFrames, ReplayDetector) {
        let frames = ReplayFrames {
            width: self.width,
            height: self.height,
            frame_count: self.frame_count,
            next: 1,
        };
        let detector = ReplayDetector {
            detections: self.detections,
        };
        (frames, detector)
    }
}

fn parse_line(line: &str) -> Result<(u64, Detection), String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let &[frame, x1, y1, x2, y2, score] = fields.as_slice() else {
        return Err(format!(
            "expected 6 fields (frame,x1,y1,x2,y2,score), got {}",
            fields.len()
        ));
    };

    let frame: u64 = frame
        .parse()
        .map_err(|e| format!("invalid frame number {frame:?}: {e}"))?;
    if frame == 0 {
        return Err("frame numbers start at 1".to_string());
    }

    let number = |name: &str, value: &str| -> Result<f32, String> {
        value
            .parse::<f32>()
            .map_err(|e| format!("invalid {name} {value:?}: {e}"))
    };

    let detection = DetectionBuilder::new()
        .tlbr(
            number("x1", x1)?,
            number("y1", y1)?,
            number("x2", x2)?,
            number("y2", y2)?,
        )
        .score(number("score", score)?)
        .build()
        .map_err(|e| e.to_string())?;
    Ok((frame, detection))
}

/// Blank frames numbered `1..=frame_count`.
#[derive(Debug, Clone)]
pub struct ReplayFrames {
    width: u32,
    height: u32,
    frame_count: u64,
    next: u64,
}

impl FrameSource for ReplayFrames {
    type Error = Infallible;

    fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        if self.next > self.frame_count {
            return Ok(None);
        }
        let frame = Frame::blank(self.next, self.width, self.height);
        self.next += 1;
        Ok(Some(frame))
    }
}

/// Returns the recorded detections for each frame index.
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    detections: HashMap<u64, Vec<Detection>>,
}

impl Detector for ReplayDetector {
    type Error = Infallible;

    fn detect(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<Detection>, Self::Error> {
        let mut detections = self.detections.remove(&frame.index).unwrap_or_default();
        detections.retain(|d| d.score >= threshold);
        Ok(detections)
    }
}
