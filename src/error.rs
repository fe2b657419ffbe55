use std::fmt::{Display, Formatter};

use frame_bus::ConvertError;
use thiserror::Error;

/// Steps of one frame's trip through the plugin. `Idle` is where every
/// invocation starts and `Done` where every one ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Classifying,
    Converting,
    Wrapping,
    Orienting,
    Detecting,
    Flattening,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Classifying => "classifying",
            Stage::Converting => "converting",
            Stage::Wrapping => "wrapping",
            Stage::Orienting => "orienting",
            Stage::Detecting => "detecting",
            Stage::Flattening => "flattening",
            Stage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame has no readable image.
    #[error("no usable source image: {0}")]
    BufferAcquisition(String),
    #[error("conversion pool setup failed")]
    PoolCreation(#[source] ConvertError),
    #[error("pixel format conversion failed")]
    Conversion(#[source] ConvertError),
    #[error("cannot rebuild a timed frame")]
    Timing(#[source] ConvertError),
    #[error("text detection failed")]
    Detection(#[source] anyhow::Error),
}

impl From<ConvertError> for FrameError {
    fn from(err: ConvertError) -> Self {
        if err.is_pool_creation() {
            FrameError::PoolCreation(err)
        } else if err.is_timing() {
            FrameError::Timing(err)
        } else {
            FrameError::Conversion(err)
        }
    }
}

/// A dropped frame: which stage failed and why.
#[derive(Debug, Error)]
#[error("frame dropped while {stage}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: FrameError,
}

impl StageFailure {
    pub fn new(stage: Stage, error: impl Into<FrameError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}
