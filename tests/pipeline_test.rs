use std::collections::VecDeque;
use std::convert::Infallible;
use std::io;

use footfall_counter::{
    CountError, CounterConfig, CountingPolicy, Detection, DetectionReplay, Detector, Frame,
    FramePipeline, FrameSource, JsonLinesRenderer, NullRenderer, Overlay, PipelineError, Rect,
    Renderer, SortTracker, Termination, TrackedBox, Tracker,
};

/// Emits `count` blank 640x400 frames.
struct BlankFrames {
    count: u64,
    next: u64,
}

impl BlankFrames {
    fn new(count: u64) -> Self {
        Self { count, next: 0 }
    }
}

impl FrameSource for BlankFrames {
    type Error = Infallible;

    fn frame_size(&self) -> (u32, u32) {
        (640, 400)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        if self.next == self.count {
            return Ok(None);
        }
        self.next += 1;
        Ok(Some(Frame::blank(self.next, 640, 400)))
    }
}

/// Detector that fails on a chosen frame.
struct FlakyDetector {
    fail_on: Option<u64>,
}

impl Detector for FlakyDetector {
    type Error = io::Error;

    fn detect(&mut self, frame: &Frame, _threshold: f32) -> Result<Vec<Detection>, Self::Error> {
        if self.fail_on == Some(frame.index) {
            return Err(io::Error::other("model crashed"));
        }
        Ok(vec![Detection::new(0.0, 0.0, 10.0, 10.0, 0.9)])
    }
}

/// Tracker returning a fixed script of boxes per frame.
struct ScriptedTracker {
    frames: VecDeque<Vec<TrackedBox>>,
}

impl ScriptedTracker {
    fn new(script: Vec<Vec<(u64, i32)>>) -> Self {
        let frames = script
            .into_iter()
            .map(|frame| {
                frame
                    .into_iter()
                    .map(|(id, bottom)| {
                        TrackedBox::new(
                            id,
                            Rect::from_tlbr(50.0, (bottom - 120) as f32, 90.0, bottom as f32),
                        )
                    })
                    .collect()
            })
            .collect();
        Self { frames }
    }
}

impl Tracker for ScriptedTracker {
    type Error = Infallible;

    fn update(&mut self, _detections: &[Detection]) -> Result<Vec<TrackedBox>, Self::Error> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

/// Renderer keeping every overlay it is given.
#[derive(Default)]
struct RecordingRenderer {
    overlays: Vec<Overlay>,
    finished: bool,
}

impl Renderer for RecordingRenderer {
    type Error = Infallible;

    fn render(&mut self, _frame: &Frame, overlay: &Overlay) -> Result<(), Self::Error> {
        self.overlays.push(overlay.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.finished = true;
        Ok(())
    }
}

fn config(ratio: f64) -> CounterConfig {
    CounterConfig {
        line_height_ratio: ratio,
        ..CounterConfig::default()
    }
}

#[test]
fn test_scripted_run_counts_and_renders() {
    // 400 * 0.5 = 200
    let tracker = ScriptedTracker::new(vec![
        vec![(1, 180), (2, 230)],
        vec![(1, 195), (2, 210)],
        vec![(1, 205), (2, 190)],
        vec![(1, 240)],
    ]);
    let mut pipeline = FramePipeline::new(
        BlankFrames::new(4),
        FlakyDetector { fail_on: None },
        tracker,
        RecordingRenderer::default(),
        &config(0.5),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(report.error.is_none());
    assert_eq!(report.summary.termination, Termination::Exhausted);
    assert_eq!(report.summary.boundary_y, 200);
    assert_eq!(report.summary.frames_processed, 4);
    assert_eq!(report.summary.totals.entered, 1);
    assert_eq!(report.summary.totals.exited, 1);

    let (_, _, _, renderer) = pipeline.into_parts();
    assert!(renderer.finished);
    assert_eq!(renderer.overlays.len(), 4);
    assert_eq!(renderer.overlays[2].events.len(), 2);
    assert_eq!(renderer.overlays[3].totals.entered, 1);
    assert_eq!(renderer.overlays[0].line.start, (0, 200));
    assert_eq!(renderer.overlays[0].boxes.len(), 2);
}

#[test]
fn test_detector_failure_keeps_counts() {
    let tracker = ScriptedTracker::new(vec![vec![(1, 150)], vec![(1, 250)], vec![(1, 150)]]);
    let mut pipeline = FramePipeline::new(
        BlankFrames::new(5),
        FlakyDetector { fail_on: Some(3) },
        tracker,
        RecordingRenderer::default(),
        &config(0.5),
    )
    .unwrap();

    let report = pipeline.run();
    assert_eq!(report.summary.frames_processed, 2);
    assert_eq!(report.summary.totals.entered, 1);
    assert!(matches!(
        report.summary.termination,
        Termination::Failed { .. }
    ));
    assert!(matches!(
        report.error,
        Some(PipelineError::Detector { frame: 3, .. })
    ));

    let (_, _, _, renderer) = pipeline.into_parts();
    assert!(renderer.finished);
}

#[test]
fn test_invalid_ratio_is_fatal_at_startup() {
    let result = FramePipeline::new(
        BlankFrames::new(1),
        FlakyDetector { fail_on: None },
        SortTracker::default(),
        NullRenderer,
        &config(1.0),
    );
    assert!(matches!(result, Err(CountError::InvalidBoundaryRatio(_))));
}

#[test]
fn test_malformed_tracks_are_skipped() {
    struct NanTracker;

    impl Tracker for NanTracker {
        type Error = Infallible;

        fn update(&mut self, _detections: &[Detection]) -> Result<Vec<TrackedBox>, Self::Error> {
            Ok(vec![TrackedBox::new(1, Rect::new(f32::NAN, 0.0, 10.0, 10.0))])
        }
    }

    let mut pipeline = FramePipeline::new(
        BlankFrames::new(3),
        FlakyDetector { fail_on: None },
        NanTracker,
        NullRenderer,
        &CounterConfig::default(),
    )
    .unwrap();

    let summary = pipeline.run().into_result().unwrap();
    assert_eq!(summary.frames_processed, 3);
    assert_eq!(summary.skipped_tracks, 3);
    assert!(pipeline.counter().history().is_empty());
}

#[test]
fn test_stop_handle_ends_run() {
    let mut pipeline = FramePipeline::new(
        BlankFrames::new(100),
        FlakyDetector { fail_on: None },
        ScriptedTracker::new(vec![]),
        NullRenderer,
        &CounterConfig::default(),
    )
    .unwrap();

    for _ in 0..5 {
        pipeline.step().unwrap();
    }
    pipeline.stop_handle().stop();
    let summary = pipeline.run().into_result().unwrap();
    assert_eq!(summary.termination, Termination::Stopped);
    assert_eq!(summary.frames_processed, 5);
}

/// One person walking down through the line at 5 px per frame.
fn walking_person(frames: u64, start_bottom: f32) -> String {
    let mut text = String::from("# frame,x1,y1,x2,y2,score\n");
    for frame in 1..=frames {
        let bottom = start_bottom + 5.0 * (frame - 1) as f32;
        text.push_str(&format!(
            "{frame},300,{},340,{bottom},0.9\n",
            bottom - 100.0
        ));
        // Low-confidence clutter is gated before tracking.
        text.push_str(&format!("{frame},10,10,30,40,0.2\n"));
    }
    text
}

#[test]
fn test_replay_through_sort() {
    // Line at 400 * 0.5 = 200; bottoms run 150..=245.
    let replay = DetectionReplay::parse(&walking_person(20, 150.0), 640, 400).unwrap();
    let (source, detector) = replay.split();

    let mut pipeline = FramePipeline::new(
        source,
        detector,
        SortTracker::default(),
        JsonLinesRenderer::new(Vec::new()),
        &config(0.5),
    )
    .unwrap();

    let summary = pipeline.run().into_result().unwrap();
    assert_eq!(summary.frames_processed, 20);
    assert_eq!(summary.totals.entered, 1);
    assert_eq!(summary.totals.exited, 0);

    let (_, _, tracker, renderer) = pipeline.into_parts();
    assert_eq!(tracker.live_tracks(), 1);
    let output = String::from_utf8(renderer.into_inner()).unwrap();
    assert_eq!(output.lines().count(), 20);
}

#[test]
fn test_every_traversal_policy_through_pipeline() {
    let tracker = ScriptedTracker::new(vec![
        vec![(7, 190)],
        vec![(7, 210)],
        vec![(7, 190)],
        vec![(7, 210)],
    ]);
    let config = CounterConfig {
        line_height_ratio: 0.5,
        policy: CountingPolicy::EveryTraversal,
        ..CounterConfig::default()
    };
    let mut pipeline = FramePipeline::new(
        BlankFrames::new(4),
        FlakyDetector { fail_on: None },
        tracker,
        NullRenderer,
        &config,
    )
    .unwrap();

    let summary = pipeline.run().into_result().unwrap();
    assert_eq!(summary.totals.entered, 2);
    assert_eq!(summary.totals.exited, 1);
}

/// Frame source whose stream breaks after `good` frames.
struct BrokenStream {
    good: u64,
    next: u64,
}

impl FrameSource for BrokenStream {
    type Error = io::Error;

    fn frame_size(&self) -> (u32, u32) {
        (640, 400)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        if self.next == self.good {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream truncated"));
        }
        self.next += 1;
        Ok(Some(Frame::blank(self.next, 640, 400)))
    }
}

/// Output sink that fails to render one frame, or fails on finish.
#[derive(Default)]
struct FailingSink {
    fail_render_on: Option<u64>,
    fail_finish: bool,
    rendered: Vec<u64>,
    finish_called: bool,
}

impl Renderer for FailingSink {
    type Error = io::Error;

    fn render(&mut self, frame: &Frame, _overlay: &Overlay) -> Result<(), Self::Error> {
        if self.fail_render_on == Some(frame.index) {
            return Err(io::Error::other("disk full"));
        }
        self.rendered.push(frame.index);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.finish_called = true;
        if self.fail_finish {
            return Err(io::Error::other("flush failed"));
        }
        Ok(())
    }
}

fn entering_script() -> ScriptedTracker {
    ScriptedTracker::new(vec![vec![(1, 150)], vec![(1, 250)], vec![(1, 260)]])
}

#[test]
fn test_source_failure_keeps_counts() {
    let mut pipeline = FramePipeline::new(
        BrokenStream { good: 2, next: 0 },
        FlakyDetector { fail_on: None },
        entering_script(),
        FailingSink::default(),
        &config(0.5),
    )
    .unwrap();

    let report = pipeline.run();
    assert_eq!(report.summary.frames_processed, 2);
    assert_eq!(report.summary.totals.entered, 1);
    assert!(matches!(
        report.summary.termination,
        Termination::Failed { .. }
    ));
    assert!(matches!(report.error, Some(PipelineError::Source(_))));

    let (_, _, _, sink) = pipeline.into_parts();
    assert!(sink.finish_called);
    assert_eq!(sink.rendered, vec![1, 2]);
}

#[test]
fn test_render_failure_counts_the_committed_frame() {
    let sink = FailingSink {
        fail_render_on: Some(2),
        ..FailingSink::default()
    };
    let mut pipeline = FramePipeline::new(
        BlankFrames::new(3),
        FlakyDetector { fail_on: None },
        entering_script(),
        sink,
        &config(0.5),
    )
    .unwrap();

    let report = pipeline.run();
    // The entry on frame 2 was counted before the sink failed.
    assert_eq!(report.summary.frames_processed, 2);
    assert_eq!(report.summary.totals.entered, 1);
    assert!(matches!(
        report.summary.termination,
        Termination::Failed { ref reason } if reason.contains("disk full")
    ));
    assert!(matches!(
        report.error,
        Some(PipelineError::Renderer { frame: 2, .. })
    ));

    let (_, _, _, sink) = pipeline.into_parts();
    assert!(sink.finish_called);
    assert_eq!(sink.rendered, vec![1]);
}

#[test]
fn test_finish_failure_is_reported() {
    let sink = FailingSink {
        fail_finish: true,
        ..FailingSink::default()
    };
    let mut pipeline = FramePipeline::new(
        BlankFrames::new(3),
        FlakyDetector { fail_on: None },
        entering_script(),
        sink,
        &config(0.5),
    )
    .unwrap();

    let report = pipeline.run();
    assert_eq!(report.summary.frames_processed, 3);
    assert_eq!(report.summary.totals.entered, 1);
    assert!(matches!(
        report.summary.termination,
        Termination::Failed { .. }
    ));
    assert!(matches!(
        report.error,
        Some(PipelineError::Renderer { frame: 3, .. })
    ));
}
