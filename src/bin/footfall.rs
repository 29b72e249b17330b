//! Replay a detections file through SORT and the line counter.
//!
//! Writes one JSON overlay record per frame to `--output` and prints the run
//! summary as JSON on stdout.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use footfall_counter::{
    CounterConfig, CountingPolicy, DetectionReplay, FramePipeline, JsonLinesRenderer, SortTracker,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Each track counts at most once per direction
    Once,
    /// Every traversal counts
    Every,
}

impl From<Policy> for CountingPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Once => CountingPolicy::OncePerDirection,
            Policy::Every => CountingPolicy::EveryTraversal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "footfall", about = "Count people crossing a horizontal line")]
struct Args {
    /// Detections file (`frame,x1,y1,x2,y2,score` per line)
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Destination for per-frame overlay records (JSON lines)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// JSON configuration file; flags given on the command line take precedence
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long)]
    confidence: Option<f32>,
    /// Boundary height as a fraction of the frame height
    #[arg(long)]
    line_ratio: Option<f64>,
    #[arg(long, default_value_t = 1920)]
    frame_width: u32,
    #[arg(long, default_value_t = 1080)]
    frame_height: u32,
    /// Play at least this many frames, even past the last detection
    #[arg(long)]
    frames: Option<u64>,
    #[arg(long, value_enum)]
    policy: Option<Policy>,
    /// Forget an identity once it has gone unseen for more than this many frames
    /// (0 keeps identities forever)
    #[arg(long)]
    eviction_window: Option<u64>,
    #[arg(long)]
    max_age: Option<u32>,
    #[arg(long)]
    min_hits: Option<u32>,
    #[arg(long)]
    iou_threshold: Option<f32>,
}

impl Args {
    fn into_config(self) -> Result<CounterConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                CounterConfig::from_json(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => CounterConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(confidence) = self.confidence {
            config.confidence_threshold = confidence;
        }
        if let Some(ratio) = self.line_ratio {
            config.line_height_ratio = ratio;
        }
        if let Some(policy) = self.policy {
            config.policy = policy.into();
        }
        if let Some(window) = self.eviction_window {
            config.eviction_window = (window > 0).then_some(window);
        }
        if let Some(max_age) = self.max_age {
            config.tracker.max_age = max_age;
        }
        if let Some(min_hits) = self.min_hits {
            config.tracker.min_hits = min_hits;
        }
        if let Some(iou) = self.iou_threshold {
            config.tracker.iou_threshold = iou;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let (width, height, frames) = (args.frame_width, args.frame_height, args.frames);
    let config = args.into_config()?;

    let replay = DetectionReplay::load(&config.input, width, height)
        .with_context(|| format!("loading detections from {}", config.input.display()))?;
    let replay = match frames {
        Some(count) => replay.with_frame_count(count),
        None => replay,
    };
    info!(
        frames = replay.frame_count(),
        detections = replay.detection_count(),
        "processing {}",
        config.input.display()
    );

    let output = File::create(&config.output)
        .with_context(|| format!("creating {}", config.output.display()))?;
    let (source, detector) = replay.split();
    let mut pipeline = FramePipeline::new(
        source,
        detector,
        SortTracker::new(config.tracker.clone()),
        JsonLinesRenderer::new(BufWriter::new(output)),
        &config,
    )?;

    let report = pipeline.run();
    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    info!("output saved to {}", config.output.display());

    let summary = report.into_result().context("run ended early")?;
    info!(
        entered = summary.totals.entered,
        exited = summary.totals.exited,
        "done"
    );
    Ok(())
}
