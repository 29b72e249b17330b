use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CounterConfig, CountingPolicy};
use crate::error::CountError;
use crate::tracker::TrackedBox;

use super::{
    BoundaryLine, CrossingDirection, CrossingRegistry, CrossingTotals, PositionHistory, TrackId,
    TrackObservation, detect_crossing,
};

/// A crossing admitted into the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossingEvent {
    pub frame: u64,
    pub track_id: TrackId,
    pub direction: CrossingDirection,
    pub previous_y: i32,
    pub current_y: i32,
}

/// What happened while counting one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub events: Vec<CrossingEvent>,
    /// Track records rejected as malformed.
    pub skipped: usize,
    /// Identities whose state was evicted after this frame.
    pub evicted: Vec<TrackId>,
}

/// Run-scoped counting state: position history, crossing registry and totals.
///
/// Frames must be fed in arrival order; within a frame, tracks may come in any
/// order since no decision depends on another track.
#[derive(Debug, Clone)]
pub struct LineCounter {
    boundary: BoundaryLine,
    policy: CountingPolicy,
    eviction_window: Option<u64>,
    history: PositionHistory,
    registry: CrossingRegistry,
    totals: CrossingTotals,
    last_frame: Option<u64>,
}

impl LineCounter {
    /// Counter with the default policy and no eviction.
    pub fn new(boundary: BoundaryLine) -> Self {
        Self {
            boundary,
            policy: CountingPolicy::default(),
            eviction_window: None,
            history: PositionHistory::new(),
            registry: CrossingRegistry::new(),
            totals: CrossingTotals::default(),
            last_frame: None,
        }
    }

    /// Counter for frames of `frame_height` rows, placed and tuned by `config`.
    pub fn from_config(frame_height: u32, config: &CounterConfig) -> Result<Self, CountError> {
        config.validate()?;
        let boundary = BoundaryLine::from_ratio(frame_height, config.line_height_ratio)?;
        Ok(Self::new(boundary)
            .with_policy(config.policy)
            .with_eviction_window(config.eviction_window))
    }

    pub fn with_policy(mut self, policy: CountingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_eviction_window(mut self, window: Option<u64>) -> Self {
        self.eviction_window = window;
        self
    }

    pub fn boundary(&self) -> BoundaryLine {
        self.boundary
    }

    pub fn totals(&self) -> CrossingTotals {
        self.totals
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn registry(&self) -> &CrossingRegistry {
        &self.registry
    }

    /// Feed one observation and return the event it produced, if any.
    ///
    /// The position history is updated whether or not an event fires.
    pub fn observe(&mut self, frame: u64, observation: &TrackObservation) -> Option<CrossingEvent> {
        let id = observation.track_id;
        let current_y = observation.reference_y;
        let previous_y = self.history.get(id);

        let mut event = None;
        if let (Some(previous_y), Some(direction)) =
            (previous_y, detect_crossing(previous_y, current_y, self.boundary.y()))
        {
            if self.admit(direction, id) {
                self.totals.record(direction);
                info!(
                    frame,
                    track_id = id,
                    %direction,
                    "{direction} | ID:{id} | Y:{previous_y}->{current_y}"
                );
                event = Some(CrossingEvent {
                    frame,
                    track_id: id,
                    direction,
                    previous_y,
                    current_y,
                });
            }
        }

        self.history.set(id, current_y, frame);
        event
    }

    /// Count every track reported for `frame`.
    ///
    /// Malformed records are skipped without touching state. A frame index
    /// lower than the last one processed is rejected before anything changes.
    pub fn process_frame(
        &mut self,
        frame: u64,
        tracks: &[TrackedBox],
    ) -> Result<FrameOutcome, CountError> {
        if let Some(last) = self.last_frame {
            if frame < last {
                return Err(CountError::OutOfOrderFrame { last, got: frame });
            }
        }
        self.last_frame = Some(frame);

        let mut outcome = FrameOutcome::default();
        for tracked in tracks {
            match TrackObservation::try_from(tracked) {
                Ok(observation) => outcome.events.extend(self.observe(frame, &observation)),
                Err(err) => {
                    warn!(frame, track_id = tracked.track_id, "skipping track: {err}");
                    outcome.skipped += 1;
                }
            }
        }

        if let Some(window) = self.eviction_window {
            outcome.evicted = self.evict_stale(frame, window);
        }
        Ok(outcome)
    }

    fn admit(&mut self, direction: CrossingDirection, id: TrackId) -> bool {
        match self.policy {
            CountingPolicy::OncePerDirection => self.registry.try_register(direction, id),
            CountingPolicy::EveryTraversal => true,
        }
    }

    fn evict_stale(&mut self, frame: u64, window: u64) -> Vec<TrackId> {
        let evicted = self.history.evict_stale(frame, window);
        for &id in &evicted {
            self.registry.forget(id);
        }
        if !evicted.is_empty() {
            debug!(frame, count = evicted.len(), "evicted stale identities");
        }
        evicted
    }
}
