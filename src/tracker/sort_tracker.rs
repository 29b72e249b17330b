//! SORT: Kalman prediction plus IoU assignment, one association pass per frame.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::counting::TrackId;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::track::{Track, TrackedBox};

/// Configuration for the SortTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Frames a track survives without a matching detection
    pub max_age: u32,
    /// Consecutive matches before a track is reported
    pub min_hits: u32,
    /// Minimum IoU between a prediction and a detection to match them
    pub iou_threshold: f32,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            max_age: 1,
            min_hits: 3,
            iou_threshold: 0.3,
        }
    }
}

/// Multi-object tracker assigning identities that start at 1 and are never
/// reused by the same instance.
#[derive(Debug, Clone)]
pub struct SortTracker {
    tracks: Vec<Track>,
    frame_count: u32,
    next_id: TrackId,
    config: SortConfig,
    kalman_filter: KalmanFilter,
}

impl SortTracker {
    pub fn new(config: SortConfig) -> Self {
        Self {
            tracks: Vec::new(),
            frame_count: 0,
            next_id: 1,
            config,
            kalman_filter: KalmanFilter::default(),
        }
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Live tracks, reported or not.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of live tracks, reported or not.
    pub fn live_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Advance one frame and return the tracks reported for it.
    ///
    /// A track is reported when it was matched this frame and has either
    /// reached `min_hits` consecutive matches or the tracker is still within
    /// its first `min_hits` frames.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<TrackedBox> {
        self.frame_count += 1;

        // Step 1: Predict, dropping tracks whose prediction diverged
        let kalman_filter = &self.kalman_filter;
        let mut predicted = Vec::with_capacity(self.tracks.len());
        self.tracks.retain_mut(|track| {
            let rect = track.predict(kalman_filter);
            let keep = rect.is_finite();
            if keep {
                predicted.push(rect);
            }
            keep
        });

        // Step 2: Associate predictions with detections
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::associate(&predicted, &det_rects, self.config.iou_threshold);

        for (itrack, idet) in matches {
            self.tracks[itrack].update(&det_rects[idet], &self.kalman_filter, self.config.min_hits);
        }
        for itrack in unmatched_tracks {
            self.tracks[itrack].mark_lost();
        }

        // Step 3: Start tracks for unmatched detections
        for idet in unmatched_detections {
            let track = Track::new(
                self.next_id,
                &det_rects[idet],
                &self.kalman_filter,
                self.config.min_hits,
            );
            self.next_id += 1;
            self.tracks.push(track);
        }

        // Step 4: Report and retire
        let warming_up = self.frame_count <= self.config.min_hits;
        let output = self
            .tracks
            .iter()
            .filter(|t| t.time_since_update == 0)
            .filter(|t| warming_up || t.is_confirmed())
            .map(|t| TrackedBox::new(t.track_id, t.rect()))
            .collect::<Vec<_>>();

        let max_age = self.config.max_age;
        self.tracks.retain(|t| t.time_since_update <= max_age);

        debug!(
            frame = self.frame_count,
            detections = detections.len(),
            live = self.tracks.len(),
            reported = output.len(),
            "sort update"
        );
        output
    }
}

impl Default for SortTracker {
    fn default() -> Self {
        Self::new(SortConfig::default())
    }
}
