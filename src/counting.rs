//! Track-state and line-crossing decision engine.
//!
//! Per-frame tracked boxes are reduced to a single reference coordinate (the
//! bottom edge), compared with the identity's previous coordinate against a
//! fixed boundary, and admitted into the running totals at most once per
//! identity and direction.

mod boundary;
mod crossing;
mod history;
mod line_counter;
mod observation;
mod registry;
mod totals;

pub use boundary::BoundaryLine;
pub use crossing::{CrossingDirection, detect_crossing};
pub use history::PositionHistory;
pub use line_counter::{CrossingEvent, FrameOutcome, LineCounter};
pub use observation::TrackObservation;
pub use registry::CrossingRegistry;
pub use totals::CrossingTotals;

/// Identity assigned to one physical object by the tracker.
pub type TrackId = u64;
