//! Single object track for SORT-style tracking.

use serde::Serialize;
use tracing::warn;

use crate::counting::TrackId;
use crate::tracker::kalman_filter::{KalmanFilter, KalmanState};
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// One identity reported by a tracker for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedBox {
    pub track_id: TrackId,
    /// Bounding box, stored as TLWH
    pub bbox: Rect,
}

impl TrackedBox {
    pub fn new(track_id: TrackId, bbox: Rect) -> Self {
        Self { track_id, bbox }
    }
}

fn measurement(rect: &Rect) -> [f64; 4] {
    rect.to_xysr().map(f64::from)
}

/// Kalman-filtered box with SORT bookkeeping.
#[derive(Debug, Clone)]
pub struct Track {
    /// Identity assigned by the owning tracker
    pub track_id: TrackId,
    pub state: TrackState,
    /// Total number of matched detections
    pub hits: u32,
    /// Consecutive frames matched without a miss
    pub hit_streak: u32,
    /// Frames since the track was created
    pub age: u32,
    /// Frames since the last matched detection
    pub time_since_update: u32,
    kalman: KalmanState,
}

impl Track {
    /// Start a track from an unmatched detection.
    ///
    /// With `min_hits == 0` the track is confirmed from birth.
    pub fn new(track_id: TrackId, bbox: &Rect, kalman_filter: &KalmanFilter, min_hits: u32) -> Self {
        Self {
            track_id,
            state: if min_hits == 0 {
                TrackState::Confirmed
            } else {
                TrackState::Tentative
            },
            hits: 0,
            hit_streak: 0,
            age: 0,
            time_since_update: 0,
            kalman: kalman_filter.initiate(measurement(bbox)),
        }
    }

    /// Current box estimate.
    pub fn rect(&self) -> Rect {
        let m = &self.kalman.mean;
        Rect::from_xysr(m[0] as f32, m[1] as f32, m[2] as f32, m[3] as f32)
    }

    /// Advance one frame and return the predicted box.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) -> Rect {
        kalman_filter.predict(&mut self.kalman);
        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
            self.state = TrackState::Lost;
        }
        self.time_since_update += 1;
        self.rect()
    }

    /// Correct the track with a matched detection.
    pub fn update(&mut self, bbox: &Rect, kalman_filter: &KalmanFilter, min_hits: u32) {
        if !kalman_filter.update(&mut self.kalman, measurement(bbox)) {
            warn!(track_id = self.track_id, "singular innovation covariance, keeping prediction");
        }
        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        self.state = if self.hit_streak >= min_hits {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn mark_lost(&mut self) {
        self.state = TrackState::Lost;
    }
}
