//! Person detection with a Burn model.
//!
//! The model sees the frame as a normalised `[1, C, H, W]` tensor and returns
//! raw boxes; [`BurnPersonDetector`] keeps the confident ones of the person
//! class.
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use footfall_counter::integration::{BoxFormat, BurnModel, BurnPersonDetector, ModelOutput};
//!
//! struct Yolo { /* weights */ }
//!
//! impl BurnModel<NdArray> for Yolo {
//!     fn forward(&self, pixels: burn::tensor::Tensor<NdArray, 4>) -> Vec<ModelOutput> {
//!         todo!()
//!     }
//! }
//!
//! let detector = BurnPersonDetector::new(Yolo::load("yolo.mpk"), Default::default());
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use thiserror::Error;
use tracing::debug;

use super::{DetectionBuilder, Detector, Frame};
use crate::tracker::Detection;

/// Class index of "person" in COCO-trained models.
pub const COCO_PERSON_CLASS: usize = 0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BurnDetectorError {
    #[error("frame is {got_w}x{got_h} but the model takes {want_w}x{want_h}")]
    FrameSize {
        want_w: u32,
        want_h: u32,
        got_w: u32,
        got_h: u32,
    },

    #[error("frame carries {got} bytes, expected {want} ({channels} channels)")]
    PixelCount {
        want: usize,
        got: usize,
        channels: u32,
    },
}

/// Layout of the four box numbers a model emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxFormat {
    /// `[cx, cy, w, h]`
    #[default]
    CenterSize,
    /// `[x1, y1, x2, y2]`
    Corners,
}

/// One box as produced by the model, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub bbox: [f32; 4],
    pub score: f32,
    /// `None` for single-class models
    pub class_id: Option<usize>,
}

/// A detection network runnable on backend `B`.
pub trait BurnModel<B: Backend>: Send + Sync {
    fn forward(&self, pixels: Tensor<B, 4>) -> Vec<ModelOutput>;

    /// `(channels, height, width)` of the expected input.
    fn input_shape(&self) -> (u32, u32, u32) {
        (3, 640, 640)
    }

    fn box_format(&self) -> BoxFormat {
        BoxFormat::CenterSize
    }
}

pub struct BurnPersonDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
    person_class: usize,
}

impl<B: Backend, M: BurnModel<B>> BurnPersonDetector<B, M> {
    pub fn new(model: M, device: B::Device) -> Self {
        Self {
            model,
            device,
            person_class: COCO_PERSON_CLASS,
        }
    }

    /// Treat `class_id` as the person class instead of the COCO index.
    pub fn with_person_class(mut self, class_id: usize) -> Self {
        self.person_class = class_id;
        self
    }

    /// Planar `u8` pixels to a `[1, C, H, W]` tensor scaled to `[0, 1]`.
    pub fn to_tensor(&self, frame: &Frame) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let (channels, height, width) = self.model.input_shape();
        if (frame.width, frame.height) != (width, height) {
            return Err(BurnDetectorError::FrameSize {
                want_w: width,
                want_h: height,
                got_w: frame.width,
                got_h: frame.height,
            });
        }
        let want = (channels * width * height) as usize;
        if frame.data.len() != want {
            return Err(BurnDetectorError::PixelCount {
                want,
                got: frame.data.len(),
                channels,
            });
        }

        let scaled: Vec<f32> = frame.data.iter().map(|&p| f32::from(p) / 255.0).collect();
        let shape = [1, channels as usize, height as usize, width as usize];
        Ok(Tensor::<B, 1>::from_floats(scaled.as_slice(), &self.device).reshape(shape))
    }

    fn keep_people(&self, outputs: Vec<ModelOutput>, threshold: f32) -> Vec<Detection> {
        let format = self.model.box_format();
        outputs
            .into_iter()
            .filter(|o| o.score >= threshold)
            .filter(|o| o.class_id.is_none_or(|c| c == self.person_class))
            .filter_map(|o| {
                let [a, b, c, d] = o.bbox;
                let builder = match format {
                    BoxFormat::CenterSize => DetectionBuilder::new().xywh(a, b, c, d),
                    BoxFormat::Corners => DetectionBuilder::new().tlbr(a, b, c, d),
                };
                builder
                    .score(o.score)
                    .build()
                    .inspect_err(|err| debug!("dropping model output: {err}"))
                    .ok()
            })
            .collect()
    }
}

impl<B: Backend, M: BurnModel<B>> Detector for BurnPersonDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<Detection>, Self::Error> {
        let pixels = self.to_tensor(frame)?;
        let outputs = self.model.forward(pixels);
        Ok(self.keep_people(outputs, threshold))
    }
}
