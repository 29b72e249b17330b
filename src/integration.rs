//! Integration module for connecting frame sources, detectors, trackers and
//! renderers to the counting core.
//!
//! Every external collaborator sits behind a capability trait so alternative
//! backends can be swapped in without touching [`crate::counting`].

mod builder;
mod detector;
mod pipeline;
mod render;
mod replay;
mod tracking;

pub use builder::DetectionBuilder;
pub use detector::{Detector, Frame, FrameSource, filter_confident};
pub use pipeline::{FramePipeline, RunReport, RunSummary, StopHandle, Termination};
pub use render::{JsonLinesRenderer, NullRenderer, Overlay, OverlayBox, OverlayLine, Renderer};
pub use replay::{DetectionReplay, ReplayDetector, ReplayError, ReplayFrames};
pub use tracking::Tracker;

pub use crate::tracker::TrackedBox;

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BoxFormat, BurnDetectorError, BurnModel, BurnPersonDetector, ModelOutput};
