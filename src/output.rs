//! Output records handed back to the host, one fresh set per frame.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub bounding_center_x: f64,
    pub bounding_center_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub element_text: String,
    pub element_corner_points: Vec<PointRecord>,
    pub element_frame: FrameRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    pub line_text: String,
    pub line_languages: Vec<String>,
    pub line_corner_points: Vec<PointRecord>,
    pub line_frame: FrameRecord,
    pub elements: Vec<ElementRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub block_text: String,
    pub block_corner_points: Vec<PointRecord>,
    pub block_frame: FrameRecord,
    pub lines: Vec<LineRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRecognitionResult {
    pub result_text: String,
    pub blocks: Vec<BlockRecord>,
}

/// Host-facing form: `{}` when nothing was recognized or the frame was
/// dropped, otherwise the serialized result.
pub fn into_value(result: Option<TextRecognitionResult>) -> serde_json::Value {
    let empty = || serde_json::Value::Object(serde_json::Map::new());
    match result {
        Some(result) => serde_json::to_value(result).unwrap_or_else(|e| {
            log::error!("failed to serialize recognition result: {}", e);
            empty()
        }),
        None => empty(),
    }
}
