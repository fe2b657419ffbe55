//! Text recognition for camera frames.
//!
//! Frames arrive from the host one at a time. Those not already in a format
//! the detector reads are converted to BGRA through a shared pool, then the
//! detector's block/line/element hierarchy is flattened into
//! [`TextRecognitionResult`] records.

pub mod config;
pub mod detector;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod model;
pub mod output;
pub mod plugin;

pub use config::{PluginOptions, RecognitionLanguage};
pub use detector::TextDetector;
pub use error::{FrameError, Stage, StageFailure};
pub use frame_bus::{Frame, Orientation, PixelFormat, SampleTiming};
pub use output::TextRecognitionResult;
pub use plugin::{FrameProcessorPlugin, TextRecognitionPlugin};
