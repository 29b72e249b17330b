use crate::error::CountError;
use crate::tracker::{Rect, TrackedBox};

use super::TrackId;

/// One identity's position in one frame, reduced to what counting needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackObservation {
    pub track_id: TrackId,
    pub bbox: Rect,
    /// Bottom edge of the box in integer pixel rows.
    pub reference_y: i32,
}

impl TrackObservation {
    /// Build from a TLBR box; the bottom edge is truncated to whole pixels.
    pub fn new(track_id: TrackId, bbox: Rect) -> Result<Self, CountError> {
        let [x1, y1, x2, y2] = bbox.to_tlbr();
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(CountError::MalformedTrackTuple(format!(
                "track {track_id} has non-finite coordinates ({x1}, {y1}, {x2}, {y2})"
            )));
        }
        if y2 < y1 || x2 < x1 {
            return Err(CountError::MalformedTrackTuple(format!(
                "track {track_id} has inverted box ({x1}, {y1}, {x2}, {y2})"
            )));
        }
        Ok(Self {
            track_id,
            bbox,
            reference_y: y2.trunc() as i32,
        })
    }

    /// Parse an `(x1, y1, x2, y2, id)` row as emitted by array-based trackers.
    pub fn from_row(row: &[f64]) -> Result<Self, CountError> {
        let &[x1, y1, x2, y2, id] = row else {
            return Err(CountError::MalformedTrackTuple(format!(
                "expected 5 values (x1, y1, x2, y2, id), got {}",
                row.len()
            )));
        };
        if !id.is_finite() || id < 0.0 || id.fract() != 0.0 {
            return Err(CountError::MalformedTrackTuple(format!(
                "track identity {id} is not a non-negative integer"
            )));
        }
        Self::new(
            id as TrackId,
            Rect::from_tlbr(x1 as f32, y1 as f32, x2 as f32, y2 as f32),
        )
    }
}

impl TryFrom<&TrackedBox> for TrackObservation {
    type Error = CountError;

    fn try_from(tracked: &TrackedBox) -> Result<Self, Self::Error> {
        Self::new(tracked.track_id, tracked.bbox)
    }
}
