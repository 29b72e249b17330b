use std::collections::HashMap;

use super::TrackId;

#[derive(Debug, Clone, Copy)]
struct Position {
    y: i32,
    last_seen: u64,
}

/// Last known reference coordinate for every identity seen so far.
///
/// Only the immediately preceding position is kept; `set` overwrites it.
#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    positions: HashMap<TrackId, Position>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous reference coordinate, `None` for an identity not seen yet.
    pub fn get(&self, id: TrackId) -> Option<i32> {
        self.positions.get(&id).map(|p| p.y)
    }

    /// Record `y` as the latest coordinate of `id`, observed at `frame`.
    pub fn set(&mut self, id: TrackId, y: i32, frame: u64) {
        self.positions.insert(id, Position { y, last_seen: frame });
    }

    /// Frame at which `id` was last observed.
    pub fn last_seen(&self, id: TrackId) -> Option<u64> {
        self.positions.get(&id).map(|p| p.last_seen)
    }

    /// Drop identities unobserved for more than `window` frames as of `current_frame`.
    ///
    /// Returns the evicted identities.
    pub fn evict_stale(&mut self, current_frame: u64, window: u64) -> Vec<TrackId> {
        let mut evicted = Vec::new();
        self.positions.retain(|&id, p| {
            let keep = current_frame.saturating_sub(p.last_seen) <= window;
            if !keep {
                evicted.push(id);
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
