//! Run configuration for a counting session.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CountError;
use crate::tracker::SortConfig;

/// How detected crossings are admitted into the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingPolicy {
    /// Each identity contributes at most one enter and at most one exit.
    #[default]
    OncePerDirection,
    /// Every traversal of the line is counted, with no per-identity latch.
    EveryTraversal,
}

/// Configuration for one counting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Input source path.
    pub input: PathBuf,
    /// Output destination path.
    pub output: PathBuf,
    /// Detections scoring below this are dropped before tracking.
    pub confidence_threshold: f32,
    /// Boundary height as a fraction of frame height, in (0, 1).
    pub line_height_ratio: f64,
    pub policy: CountingPolicy,
    /// An identity unobserved for more than this many consecutive frames has
    /// its state evicted. `None` keeps every identity for the whole run.
    pub eviction_window: Option<u64>,
    pub tracker: SortConfig,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("detections.csv"),
            output: PathBuf::from("output_with_counts.jsonl"),
            confidence_threshold: 0.5,
            line_height_ratio: 0.65,
            policy: CountingPolicy::OncePerDirection,
            eviction_window: Some(300),
            tracker: SortConfig::default(),
        }
    }
}

impl CounterConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the values that must hold before a run starts.
    pub fn validate(&self) -> Result<(), CountError> {
        let ratio = self.line_height_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
            return Err(CountError::InvalidBoundaryRatio(ratio));
        }
        let threshold = self.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CountError::InvalidConfidenceThreshold(threshold));
        }
        Ok(())
    }
}
