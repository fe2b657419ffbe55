//! Owned detection hierarchy.
//!
//! Detectors that do not want to implement the adapter traits on their own
//! types can convert into these.

use crate::detector::{DetectedBlock, DetectedLanguage, DetectedLine, DetectedRegion, DetectedText};
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognizedLanguage {
    pub code: Option<String>,
}

impl RecognizedLanguage {
    pub fn new(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
        }
    }

    pub fn missing() -> Self {
        Self { code: None }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextElement {
    pub text: String,
    pub corner_points: Vec<Option<Point>>,
    pub frame: Rect,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub text: String,
    pub corner_points: Vec<Option<Point>>,
    pub frame: Rect,
    pub recognized_languages: Vec<RecognizedLanguage>,
    pub elements: Vec<TextElement>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub text: String,
    pub corner_points: Vec<Option<Point>>,
    pub frame: Rect,
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionResult {
    pub text: String,
    pub blocks: Vec<TextBlock>,
}

impl DetectedLanguage for RecognizedLanguage {
    fn language_code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

macro_rules! impl_region {
    ($($ty:ty),*) => {
        $(
            impl DetectedRegion for $ty {
                fn text(&self) -> &str {
                    &self.text
                }

                fn corner_points(&self) -> &[Option<Point>] {
                    &self.corner_points
                }

                fn frame(&self) -> Rect {
                    self.frame
                }
            }
        )*
    };
}

impl_region!(TextElement, TextLine, TextBlock);

impl DetectedLine for TextLine {
    type Language = RecognizedLanguage;
    type Element = TextElement;

    fn recognized_languages(&self) -> &[RecognizedLanguage] {
        &self.recognized_languages
    }

    fn elements(&self) -> &[TextElement] {
        &self.elements
    }
}

impl DetectedBlock for TextBlock {
    type Line = TextLine;

    fn lines(&self) -> &[TextLine] {
        &self.lines
    }
}

impl DetectedText for DetectionResult {
    type Block = TextBlock;

    fn text(&self) -> &str {
        &self.text
    }

    fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }
}
