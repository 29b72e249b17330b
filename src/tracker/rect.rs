use ndarray::Array2;
use serde::Serialize;

/// Axis-aligned box in image pixels, stored as TLWH.
///
/// Detectors and the counter speak TLBR (`x1, y1, x2, y2`); the SORT filter
/// speaks XYSR (centre, area, width/height ratio).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// TLWH constructor.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanning the corners `(x1, y1)` and `(x2, y2)`.
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Inverse of [`Rect::to_xysr`]. A non-positive area collapses the box to a point at the center.
    pub fn from_xysr(cx: f32, cy: f32, area: f32, aspect_ratio: f32) -> Self {
        let width = (area * aspect_ratio).max(0.0).sqrt();
        let height = if width > 0.0 { area / width } else { 0.0 };
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Corners as `[x1, y1, x2, y2]`.
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.right(), self.bottom()]
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// `[cx, cy, area, width / height]`; a zero-height box has ratio 0.
    #[inline]
    pub fn to_xysr(&self) -> [f32; 4] {
        let (cx, cy) = self.center();
        let ratio = if self.height > 0.0 { self.width / self.height } else { 0.0 };
        [cx, cy, self.area(), ratio]
    }

    /// Bottom edge, the row where a standing person touches the ground.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Midpoint of the bottom edge.
    #[inline]
    pub fn bottom_center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.bottom())
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }

    /// Width times height; negative for inverted boxes.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when every coordinate is a finite number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Intersection over union, 0 when the boxes are disjoint or degenerate.
    pub fn iou(&self, other: &Rect) -> f32 {
        let overlap_w = self.right().min(other.right()) - self.x.max(other.x);
        let overlap_h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        let intersection = overlap_w.max(0.0) * overlap_h.max(0.0);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 { intersection / union } else { 0.0 }
    }
}

/// Pairwise IoU, rows indexed by `rows` and columns by `cols`.
pub fn iou_batch(rows: &[Rect], cols: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((rows.len(), cols.len()), |(i, j)| rows[i].iou(&cols[j]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlbr_round_trip() {
        let rect = Rect::from_tlbr(10.0, 20.0, 40.0, 60.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.bottom_center(), (25.0, 60.0));
    }

    #[test]
    fn test_xysr() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let [cx, cy, s, r] = rect.to_xysr();
        assert_eq!((cx, cy), (25.0, 40.0));
        assert_eq!(s, 1200.0);
        assert!((r - 0.75).abs() < 1e-6);

        let back = Rect::from_xysr(cx, cy, s, r);
        assert!((back.x - 10.0).abs() < 1e-4);
        assert!((back.y - 20.0).abs() < 1e-4);
        assert!((back.width - 30.0).abs() < 1e-4);
        assert!((back.height - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_xysr_degenerate() {
        let rect = Rect::from_xysr(5.0, 5.0, -3.0, 0.5);
        assert_eq!(rect.area(), 0.0);
        assert_eq!(rect.center(), (5.0, 5.0));
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);

        // Intersection 25, union 175
        assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-6);
        assert_eq!(a.iou(&Rect::new(20.0, 20.0, 10.0, 10.0)), 0.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [Rect::new(0.0, 0.0, 10.0, 10.0); 2];
        let b = [Rect::new(0.0, 0.0, 10.0, 10.0); 3];
        let ious = iou_batch(&a, &b);
        assert_eq!(ious.dim(), (2, 3));
        assert!((ious[[1, 2]] - 1.0).abs() < 1e-6);
    }
}
