//! Error types for counting and for the frame pipeline.

use thiserror::Error;

/// Boxed error raised by an external collaborator (source, detector, tracker, renderer).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the counting core and its configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CountError {
    /// A track record is missing its identity or has unusable coordinates.
    #[error("malformed track tuple: {0}")]
    MalformedTrackTuple(String),

    /// The boundary ratio does not lie strictly between 0 and 1.
    #[error("boundary line ratio {0} must lie strictly between 0 and 1")]
    InvalidBoundaryRatio(f64),

    #[error("confidence threshold {0} must lie within [0, 1]")]
    InvalidConfidenceThreshold(f32),

    #[error("frame height must be greater than zero")]
    InvalidFrameHeight,

    /// A detection box could not be built from its inputs.
    #[error("invalid detection: {0}")]
    InvalidDetection(String),

    /// A frame arrived with an index lower than one already processed.
    #[error("frame {got} arrived after frame {last}")]
    OutOfOrderFrame { last: u64, got: u64 },
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("frame source failed: {0}")]
    Source(#[source] CollaboratorError),

    #[error("detector failed on frame {frame}: {source}")]
    Detector {
        frame: u64,
        #[source]
        source: CollaboratorError,
    },

    #[error("tracker failed on frame {frame}: {source}")]
    Tracker {
        frame: u64,
        #[source]
        source: CollaboratorError,
    },

    #[error("renderer failed on frame {frame}: {source}")]
    Renderer {
        frame: u64,
        #[source]
        source: CollaboratorError,
    },

    #[error(transparent)]
    Count(#[from] CountError),
}
