//! Overlay primitives and the renderer seam.
//!
//! Renderers receive the frame together with everything worth drawing on it;
//! nothing flows back from a renderer into counting.

use std::convert::Infallible;
use std::io::{self, Write};

use serde::Serialize;

use crate::counting::{BoundaryLine, CrossingEvent, CrossingTotals, TrackId};
use crate::integration::Frame;
use crate::tracker::TrackedBox;

/// One labelled box to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    pub track_id: TrackId,
    /// `[x1, y1, x2, y2]`
    pub tlbr: [f32; 4],
    pub label: String,
    /// Bottom-centre point used as the reference for crossings
    pub anchor: (f32, f32),
}

impl From<&TrackedBox> for OverlayBox {
    fn from(tracked: &TrackedBox) -> Self {
        Self {
            track_id: tracked.track_id,
            tlbr: tracked.bbox.to_tlbr(),
            label: format!("ID:{}", tracked.track_id),
            anchor: tracked.bbox.bottom_center(),
        }
    }
}

/// The boundary line as drawn across the full frame width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLine {
    pub start: (u32, i32),
    pub end: (u32, i32),
    pub label: String,
}

/// Everything a renderer needs to annotate one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub frame: u64,
    pub boxes: Vec<OverlayBox>,
    pub line: OverlayLine,
    pub totals: CrossingTotals,
    /// Events admitted on this frame
    pub events: Vec<CrossingEvent>,
}

impl Overlay {
    pub fn new(
        frame: &Frame,
        boundary: BoundaryLine,
        tracks: &[TrackedBox],
        totals: CrossingTotals,
        events: Vec<CrossingEvent>,
    ) -> Self {
        Self {
            frame: frame.index,
            boxes: tracks.iter().map(OverlayBox::from).collect(),
            line: OverlayLine {
                start: (0, boundary.y()),
                end: (frame.width, boundary.y()),
                label: boundary.label(),
            },
            totals,
            events,
        }
    }

    /// Running totals as shown on screen.
    pub fn caption(&self) -> [String; 2] {
        [
            format!("IN: {}", self.totals.entered),
            format!("OUT: {}", self.totals.exited),
        ]
    }
}

/// Consumer of annotated frames (display, video writer, log).
pub trait Renderer {
    /// Error type for rendering or output failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn render(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Self::Error>;

    /// Flush buffered output once the run ends.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Renderer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    type Error = Infallible;

    fn render(&mut self, _frame: &Frame, _overlay: &Overlay) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Writes one JSON record per frame.
#[derive(Debug)]
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
    frames_written: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, _frame: &Frame, overlay: &Overlay) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.writer, overlay)?;
        self.writer.write_all(b"\n")?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.writer.flush()
    }
}
