//! FramePipeline: detection, tracking, counting and rendering, one frame at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::CounterConfig;
use crate::counting::{CrossingEvent, CrossingTotals, LineCounter};
use crate::error::{CountError, PipelineError};

use super::detector::filter_confident;
use super::{Detector, FrameSource, Overlay, Renderer, Tracker};

/// Cloneable flag asking a running pipeline to stop before its next frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The frame source ran out of frames.
    Exhausted,
    /// A [`StopHandle`] was triggered.
    Stopped,
    /// A collaborator failed; counts cover the frames processed before it.
    Failed { reason: String },
}

/// Final report of a run.
///
/// `frames_processed` counts frames whose tracks reached the counter, so the
/// totals always cover exactly those frames. When the renderer fails, the last
/// counted frame may be missing from the rendered output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames_processed: u64,
    pub boundary_y: i32,
    pub totals: CrossingTotals,
    /// Track records skipped as malformed over the whole run
    pub skipped_tracks: u64,
    pub termination: Termination,
}

/// Summary plus the error that ended the run, if any.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub error: Option<PipelineError>,
}

impl RunReport {
    pub fn into_result(self) -> Result<RunSummary, PipelineError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.summary),
        }
    }
}

/// Drives one counting run over a frame source.
///
/// Frames are processed strictly in arrival order and each one completes
/// (detect, track, count, render) before the next is read. All counting state
/// belongs to this pipeline.
pub struct FramePipeline<S, D, T, R> {
    source: S,
    detector: D,
    tracker: T,
    renderer: R,
    counter: LineCounter,
    confidence_threshold: f32,
    stop: StopHandle,
    frames_processed: u64,
    skipped_tracks: u64,
}

impl<S, D, T, R> FramePipeline<S, D, T, R>
where
    S: FrameSource,
    D: Detector,
    T: Tracker,
    R: Renderer,
{
    /// Create a pipeline; the boundary is fixed from the source's frame height.
    ///
    /// Fails when the configuration cannot place a boundary line.
    pub fn new(
        source: S,
        detector: D,
        tracker: T,
        renderer: R,
        config: &CounterConfig,
    ) -> Result<Self, CountError> {
        let (width, height) = source.frame_size();
        let counter = LineCounter::from_config(height, config)?;
        info!(
            width,
            height,
            boundary_y = counter.boundary().y(),
            ratio = config.line_height_ratio,
            "boundary line fixed; top->bottom = ENTER, bottom->top = EXIT"
        );

        Ok(Self {
            source,
            detector,
            tracker,
            renderer,
            counter,
            confidence_threshold: config.confidence_threshold,
            stop: StopHandle::new(),
            frames_processed: 0,
            skipped_tracks: 0,
        })
    }

    /// Handle that stops [`FramePipeline::run`] before the next frame.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }

    pub fn totals(&self) -> CrossingTotals {
        self.counter.totals()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Process a single frame and return the events it produced.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn step(&mut self) -> Result<Option<Vec<CrossingEvent>>, PipelineError> {
        let Some(frame) = self
            .source
            .next_frame()
            .map_err(|e| PipelineError::Source(Box::new(e)))?
        else {
            return Ok(None);
        };

        let mut detections = self
            .detector
            .detect(&frame, self.confidence_threshold)
            .map_err(|e| PipelineError::Detector {
                frame: frame.index,
                source: Box::new(e),
            })?;
        filter_confident(&mut detections, self.confidence_threshold);

        let tracks = self
            .tracker
            .update(&detections)
            .map_err(|e| PipelineError::Tracker {
                frame: frame.index,
                source: Box::new(e),
            })?;
        debug!(
            frame = frame.index,
            detections = detections.len(),
            tracks = tracks.len(),
            "frame tracked"
        );

        let outcome = self.counter.process_frame(frame.index, &tracks)?;
        self.skipped_tracks += outcome.skipped as u64;
        self.frames_processed += 1;

        let overlay = Overlay::new(
            &frame,
            self.counter.boundary(),
            &tracks,
            self.counter.totals(),
            outcome.events.clone(),
        );
        self.renderer
            .render(&frame, &overlay)
            .map_err(|e| PipelineError::Renderer {
                frame: frame.index,
                source: Box::new(e),
            })?;

        Ok(Some(outcome.events))
    }

    /// Run until the source is exhausted, a stop is requested, or a
    /// collaborator fails. Counts gathered so far are always reported.
    pub fn run(&mut self) -> RunReport {
        let outcome = loop {
            if self.stop.is_stopped() {
                break Ok(Termination::Stopped);
            }
            match self.step() {
                Ok(Some(_)) => {}
                Ok(None) => break Ok(Termination::Exhausted),
                Err(err) => break Err(err),
            }
        };

        let finished = self
            .renderer
            .finish()
            .map_err(|e| PipelineError::Renderer {
                frame: self.frames_processed,
                source: Box::new(e),
            });

        if let (Err(_), Err(finish_err)) = (&outcome, &finished) {
            warn!("renderer also failed to finish: {finish_err}");
        }
        let (termination, error) = match outcome.and_then(|t| finished.map(|()| t)) {
            Ok(termination) => (termination, None),
            Err(err) => {
                error!(frames = self.frames_processed, "run aborted: {err}");
                (
                    Termination::Failed {
                        reason: err.to_string(),
                    },
                    Some(err),
                )
            }
        };

        let summary = RunSummary {
            frames_processed: self.frames_processed,
            boundary_y: self.counter.boundary().y(),
            totals: self.counter.totals(),
            skipped_tracks: self.skipped_tracks,
            termination,
        };
        info!(
            frames = summary.frames_processed,
            entered = summary.totals.entered,
            exited = summary.totals.exited,
            boundary_y = summary.boundary_y,
            "final footfall count"
        );
        RunReport { summary, error }
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Get a reference to the underlying renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Take the pipeline apart, e.g. to recover a renderer's output buffer.
    pub fn into_parts(self) -> (S, D, T, R) {
        (self.source, self.detector, self.tracker, self.renderer)
    }
}
