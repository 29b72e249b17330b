//! Directional footfall counting over tracked pedestrian detections.
//!
//! Detections from any [`Detector`] are associated into persistent identities
//! by a [`Tracker`] (a SORT implementation is provided), and the bottom edge of
//! every tracked box is compared frame-to-frame against a fixed horizontal
//! boundary. A [`LineCounter`] turns those comparisons into enter/exit events
//! with at most one event per identity and direction.
//!
//! ```ignore
//! use footfall_counter::{CounterConfig, FramePipeline, NullRenderer, SortTracker};
//!
//! let config = CounterConfig::default();
//! let tracker = SortTracker::new(config.tracker.clone());
//! let mut pipeline = FramePipeline::new(source, detector, tracker, NullRenderer, &config)?;
//! let report = pipeline.run();
//! println!("entered={} exited={}", report.summary.totals.entered, report.summary.totals.exited);
//! ```

pub mod config;
pub mod counting;
pub mod error;
pub mod integration;
pub mod tracker;

pub use config::{CounterConfig, CountingPolicy};
pub use counting::{
    BoundaryLine, CrossingDirection, CrossingEvent, CrossingRegistry, CrossingTotals, LineCounter,
    PositionHistory, TrackId, TrackObservation, detect_crossing,
};
pub use error::{CountError, PipelineError};
pub use integration::{
    DetectionBuilder, DetectionReplay, Detector, Frame, FramePipeline, FrameSource,
    JsonLinesRenderer, NullRenderer, Overlay, Renderer, RunReport, RunSummary, StopHandle,
    Termination, TrackedBox, Tracker,
};
pub use tracker::{Detection, Rect, SortConfig, SortTracker};
