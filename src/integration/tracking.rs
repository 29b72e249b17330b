//! Trait for identity assignment backends.

use std::convert::Infallible;

use crate::tracker::{Detection, SortTracker, TrackedBox};

/// Associates per-frame detections into persistent identities.
///
/// Implementations must keep an identity stable for the same object across
/// frames and return nothing when given no detections.
pub trait Tracker {
    /// Error type for tracking failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Consume this frame's detections and return the tracked boxes.
    fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedBox>, Self::Error>;
}

impl Tracker for SortTracker {
    type Error = Infallible;

    fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedBox>, Self::Error> {
        Ok(SortTracker::update(self, detections))
    }
}
