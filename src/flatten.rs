//! Walks the detector hierarchy into output records, preserving detector
//! order at every level.

use crate::detector::{DetectedBlock, DetectedLanguage, DetectedLine, DetectedRegion, DetectedText};
use crate::geometry::{transform_corners, transform_frame};
use crate::output::{BlockRecord, ElementRecord, LineRecord, TextRecognitionResult};

const UNDETERMINED_LANGUAGE: &str = "und";

pub fn flatten<T: DetectedText>(result: &T) -> TextRecognitionResult {
    TextRecognitionResult {
        result_text: result.text().to_string(),
        blocks: result.blocks().iter().map(block_record).collect(),
    }
}

fn block_record<B: DetectedBlock>(block: &B) -> BlockRecord {
    BlockRecord {
        block_text: block.text().to_string(),
        block_corner_points: transform_corners(block.corner_points()),
        block_frame: transform_frame(&block.frame()),
        lines: block.lines().iter().map(line_record).collect(),
    }
}

fn line_record<L: DetectedLine>(line: &L) -> LineRecord {
    LineRecord {
        line_text: line.text().to_string(),
        line_languages: language_codes(line.recognized_languages()),
        line_corner_points: transform_corners(line.corner_points()),
        line_frame: transform_frame(&line.frame()),
        elements: line.elements().iter().map(element_record).collect(),
    }
}

fn element_record<E: DetectedRegion>(element: &E) -> ElementRecord {
    ElementRecord {
        element_text: element.text().to_string(),
        element_corner_points: transform_corners(element.corner_points()),
        element_frame: transform_frame(&element.frame()),
    }
}

/// Language codes of a line in detector order. An empty code becomes "und".
///
/// The first entry without a code ends the list: it and every entry after it
/// are dropped. Consumers rely on this truncation, so it is kept as is.
pub fn language_codes<L: DetectedLanguage>(languages: &[L]) -> Vec<String> {
    let mut codes = Vec::with_capacity(languages.len());
    for (index, language) in languages.iter().enumerate() {
        let Some(code) = language.language_code() else {
            log::warn!(
                "language {} has no code, dropping {} remaining entries",
                index,
                languages.len() - index
            );
            break;
        };
        if code.is_empty() {
            codes.push(UNDETERMINED_LANGUAGE.to_string());
        } else {
            codes.push(code.to_string());
        }
    }
    codes
}
