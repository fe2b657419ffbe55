//! Per-frame orchestration: classify, convert when needed, orient, detect,
//! flatten.
//!
//! Every invocation starts at [`Stage::Idle`] and ends at [`Stage::Done`].
//! The first failing stage ends the frame; the host then gets an empty
//! result. Only the converter's pool and render context outlive a frame.

use std::sync::Arc;

use frame_bus::{FormatConverter, Frame, Orientation, timing};

use crate::config::{PluginOptions, RecognitionLanguage};
use crate::detector::{DetectedText, TextDetector};
use crate::error::{FrameError, Stage, StageFailure};
use crate::flatten::flatten;
use crate::output::{TextRecognitionResult, into_value};

/// Boundary the host frame-processor runtime calls once per frame.
pub trait FrameProcessorPlugin {
    fn callback(
        &self,
        frame: &Frame,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> serde_json::Value;
}

pub struct TextRecognitionPlugin<D> {
    detector: D,
    language: RecognitionLanguage,
    converter: Arc<FormatConverter>,
}

/// Image handed to the detector: the caller's frame, or a converted copy.
enum DetectorInput<'a> {
    Original(&'a Frame),
    Converted(Frame),
}

impl DetectorInput<'_> {
    fn frame(&self) -> &Frame {
        match self {
            DetectorInput::Original(frame) => frame,
            DetectorInput::Converted(frame) => frame,
        }
    }
}

impl<D: TextDetector> TextRecognitionPlugin<D> {
    /// Builds the plugin from host options. `build` receives the selected
    /// language profile and returns the detector for it. Plugins without
    /// pool overrides share the process-wide converter.
    pub fn new<F>(options: &PluginOptions, build: F) -> anyhow::Result<Self>
    where
        F: FnOnce(RecognitionLanguage) -> anyhow::Result<D>,
    {
        let language = options.language();
        let detector = build(language)?;
        let converter = match options.pool_config() {
            Some(config) => Arc::new(FormatConverter::new(config)),
            None => FormatConverter::shared(),
        };
        log::info!("text recognition plugin ready, language: {}", language);
        Ok(Self::with_converter(detector, language, converter))
    }

    pub fn with_converter(
        detector: D,
        language: RecognitionLanguage,
        converter: Arc<FormatConverter>,
    ) -> Self {
        Self {
            detector,
            language,
            converter,
        }
    }

    pub fn language(&self) -> RecognitionLanguage {
        self.language
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn converter(&self) -> &Arc<FormatConverter> {
        &self.converter
    }

    /// Runs one frame. `Ok(None)` means the frame was processed but holds no
    /// text.
    pub fn process(&self, frame: &Frame) -> Result<Option<TextRecognitionResult>, StageFailure> {
        let mut stage = Stage::Idle;
        log::trace!("{}: {}", stage, frame);

        stage = Stage::Classifying;
        if frame.buffer().is_empty() {
            return Err(StageFailure::new(
                stage,
                FrameError::BufferAcquisition(format!(
                    "{}x{} {:?} has no pixel data",
                    frame.width(),
                    frame.height(),
                    frame.buffer().pixel()
                )),
            ));
        }
        let format = frame.format();

        let input = if format.is_detector_compatible() {
            DetectorInput::Original(frame)
        } else {
            stage = Stage::Converting;
            log::trace!("{}: {} frame", stage, format);
            let converted = self
                .converter
                .convert(frame.buffer())
                .map_err(|e| StageFailure::new(stage, e))?;

            stage = Stage::Wrapping;
            let wrapped = timing::wrap(converted, frame).map_err(|e| StageFailure::new(stage, e))?;
            DetectorInput::Converted(wrapped)
        };

        stage = Stage::Orienting;
        let orientation: Orientation = frame.orientation().for_detector();
        log::trace!("{}: {} -> {}", stage, frame.orientation(), orientation);

        stage = Stage::Detecting;
        let detected = self
            .detector
            .detect(input.frame(), orientation)
            .map_err(|e| StageFailure::new(stage, FrameError::Detection(e)))?;

        stage = Stage::Flattening;
        log::trace!("{}: {} blocks detected", stage, detected.blocks().len());
        let result = if detected.text().is_empty() {
            None
        } else {
            Some(flatten(&detected))
        };

        stage = Stage::Done;
        log::trace!("{}: text found: {}", stage, result.is_some());
        Ok(result)
    }
}

impl<D: TextDetector> FrameProcessorPlugin for TextRecognitionPlugin<D> {
    /// Any failure drops the frame: it is logged and the host gets `{}`.
    fn callback(
        &self,
        frame: &Frame,
        _arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> serde_json::Value {
        match self.process(frame) {
            Ok(result) => into_value(result),
            Err(failure) => {
                log::warn!("{:#}", anyhow::Error::new(failure));
                into_value(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "plugin_test.rs"]
mod plugin_test;
