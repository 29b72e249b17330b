//! Detection type and IoU-based association.

use ndarray::Array2;
use serde::Serialize;

use crate::tracker::rect::{Rect, iou_batch};

/// One scored person box handed to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Bounding box, stored as TLWH
    pub bbox: Rect,
    /// Confidence in `[0, 1]`
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// `1 - IoU` for every (track, detection) pair.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    iou_batch(track_boxes, det_boxes).mapv(|iou| 1.0 - iou)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve the assignment on `cost_matrix`, keeping only pairs with cost `<= thresh`.
pub fn linear_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    // lapjv needs a square matrix; pad with a prohibitive cost.
    let size = num_rows.max(num_cols);
    let padded = Array2::<f64>::from_shape_fn((size, size), |(i, j)| {
        if i < num_rows && j < num_cols {
            cost_matrix[[i, j]] as f64
        } else {
            1e6
        }
    });

    let mut result = AssignmentResult::default();
    let mut detection_matched = vec![false; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
                if col < num_cols && cost_matrix[[row, col]] <= thresh {
                    result.matches.push((row, col));
                    detection_matched[col] = true;
                } else {
                    result.unmatched_tracks.push(row);
                }
            }
        }
        Err(_) => {
            result.unmatched_tracks = (0..num_rows).collect();
        }
    }

    result.unmatched_detections = detection_matched
        .iter()
        .enumerate()
        .filter_map(|(i, &matched)| (!matched).then_some(i))
        .collect();
    result
}

/// Associate predicted track boxes with detections, accepting pairs whose IoU
/// is at least `iou_threshold`.
pub fn associate(track_boxes: &[Rect], det_boxes: &[Rect], iou_threshold: f32) -> AssignmentResult {
    let dists = iou_distance(track_boxes, det_boxes);
    linear_assignment(&dists, 1.0 - iou_threshold)
}
