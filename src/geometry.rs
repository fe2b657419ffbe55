//! Region geometry: raw detector coordinates to output records.

use crate::output::{FrameRecord, PointRecord};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle in source pixel coordinates.
///
/// Accessors use the standardized rectangle: a negative width or height
/// moves the origin, so `min_x() <= max_x()` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on (`mid_x`, `mid_y`).
    pub fn from_center(mid_x: f64, mid_y: f64, width: f64, height: f64) -> Self {
        Self::new(mid_x - width / 2.0, mid_y - height / 2.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.width.abs()
    }

    pub fn height(&self) -> f64 {
        self.height.abs()
    }

    pub fn min_x(&self) -> f64 {
        self.x.min(self.x + self.width)
    }

    pub fn min_y(&self) -> f64 {
        self.y.min(self.y + self.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x.max(self.x + self.width)
    }

    pub fn max_y(&self) -> f64 {
        self.y.max(self.y + self.height)
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// One `{x, y}` per corner, in input order. Missing and non-finite entries
/// are skipped without dropping the rest of the region.
pub fn transform_corners(points: &[Option<Point>]) -> Vec<PointRecord> {
    points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| match point {
            Some(p) if p.is_finite() => Some(PointRecord { x: p.x, y: p.y }),
            Some(p) => {
                log::warn!("skipping non-finite corner point {}: {:?}", index, p);
                None
            }
            None => {
                log::warn!("skipping missing corner point {}", index);
                None
            }
        })
        .collect()
}

/// Bounding rectangle in the output convention.
///
/// This arithmetic is kept exactly as consumers expect it; it is neither an
/// identity nor a plain reflection, so do not simplify it.
pub fn transform_frame(rect: &Rect) -> FrameRecord {
    let mid_x = rect.mid_x();
    let mid_y = rect.mid_y();
    let offset_x = (mid_x - rect.width().ceil()) / 2.0;
    let offset_y = (mid_y - rect.height().ceil()) / 2.0;

    let x = rect.max_x() + offset_x;
    let y = rect.min_y() + offset_y;

    FrameRecord {
        x: mid_x + (mid_x - x),
        y: mid_y + (y - mid_y),
        width: rect.width(),
        height: rect.height(),
        bounding_center_x: mid_x,
        bounding_center_y: mid_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_frame_reference_values() {
        let rect = Rect::from_center(10.0, 10.0, 4.0, 2.0);
        assert_eq!(rect.max_x(), 12.0);
        assert_eq!(rect.min_y(), 9.0);

        let frame = transform_frame(&rect);
        assert_eq!(
            frame,
            FrameRecord {
                x: 5.0,
                y: 13.0,
                width: 4.0,
                height: 2.0,
                bounding_center_x: 10.0,
                bounding_center_y: 10.0,
            }
        );
    }

    #[test]
    fn test_transform_frame_reapplied_from_center() {
        let first = transform_frame(&Rect::from_center(10.0, 10.0, 4.0, 2.0));
        let again = transform_frame(&Rect::from_center(
            first.bounding_center_x,
            first.bounding_center_y,
            first.width,
            first.height,
        ));
        assert_eq!(first, again);
    }

    #[test]
    fn test_transform_frame_fractional_size() {
        // ceil applies to the size only
        let frame = transform_frame(&Rect::new(0.0, 0.0, 2.5, 1.5));
        // mid (1.25, 0.75), offsets ((1.25-3)/2, (0.75-2)/2) = (-0.875, -0.625)
        assert_eq!(frame.x, 1.25 + (1.25 - (2.5 - 0.875)));
        assert_eq!(frame.y, 0.75 + ((0.0 - 0.625) - 0.75));
        assert_eq!(frame.width, 2.5);
        assert_eq!(frame.height, 1.5);
    }

    #[test]
    fn test_negative_size_is_standardized() {
        let rect = Rect::new(12.0, 11.0, -4.0, -2.0);
        assert_eq!(rect.width(), 4.0);
        assert_eq!(rect.min_x(), 8.0);
        assert_eq!(rect.max_x(), 12.0);
        assert_eq!(
            transform_frame(&rect),
            transform_frame(&Rect::from_center(10.0, 10.0, 4.0, 2.0))
        );
    }

    #[test]
    fn test_transform_corners_empty() {
        assert!(transform_corners(&[]).is_empty());
    }

    #[test]
    fn test_transform_corners_keeps_order() {
        let points = [Some(Point::new(1.0, 2.0)), Some(Point::new(3.0, 4.0))];
        assert_eq!(
            transform_corners(&points),
            vec![PointRecord { x: 1.0, y: 2.0 }, PointRecord { x: 3.0, y: 4.0 }]
        );
    }

    #[test]
    fn test_transform_corners_skips_bad_entries() {
        let points = [
            Some(Point::new(1.0, 2.0)),
            None,
            Some(Point::new(f64::NAN, 0.0)),
            Some(Point::new(5.0, f64::INFINITY)),
            Some(Point::new(7.0, 8.0)),
        ];
        assert_eq!(
            transform_corners(&points),
            vec![PointRecord { x: 1.0, y: 2.0 }, PointRecord { x: 7.0, y: 8.0 }]
        );
    }
}
