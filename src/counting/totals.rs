use serde::{Deserialize, Serialize};

use super::CrossingDirection;

/// Running enter/exit totals for a run. Both only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingTotals {
    pub entered: u64,
    pub exited: u64,
}

impl CrossingTotals {
    pub fn record_enter(&mut self) {
        self.entered += 1;
    }

    pub fn record_exit(&mut self) {
        self.exited += 1;
    }

    pub fn record(&mut self, direction: CrossingDirection) {
        match direction {
            CrossingDirection::Enter => self.record_enter(),
            CrossingDirection::Exit => self.record_exit(),
        }
    }
}
