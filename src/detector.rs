//! The external text detector and the narrow view of its output that the
//! flattener reads.
//!
//! Each detector implements these traits once for its native result types;
//! nothing downstream depends on a detector's own object model.

use frame_bus::{Frame, Orientation};

use crate::geometry::{Point, Rect};

/// Fields every region (block, line or element) exposes.
pub trait DetectedRegion {
    fn text(&self) -> &str;
    /// Raw corner points in source pixels. `None` marks an entry the
    /// detector could not provide.
    fn corner_points(&self) -> &[Option<Point>];
    fn frame(&self) -> Rect;
}

/// A recognized language entry on a line. A missing code is distinct from
/// an empty one.
pub trait DetectedLanguage {
    fn language_code(&self) -> Option<&str>;
}

pub trait DetectedLine: DetectedRegion {
    type Language: DetectedLanguage;
    type Element: DetectedRegion;

    fn recognized_languages(&self) -> &[Self::Language];
    fn elements(&self) -> &[Self::Element];
}

pub trait DetectedBlock: DetectedRegion {
    type Line: DetectedLine;

    fn lines(&self) -> &[Self::Line];
}

/// Whole-frame detector output: full text plus blocks in detector order.
pub trait DetectedText {
    type Block: DetectedBlock;

    fn text(&self) -> &str;
    fn blocks(&self) -> &[Self::Block];
}

/// Text detection capability: given a normalized frame and the orientation
/// in the detector's convention, produce the region hierarchy.
pub trait TextDetector {
    type Output: DetectedText;

    fn detect(&self, frame: &Frame, orientation: Orientation) -> anyhow::Result<Self::Output>;
}
