use thiserror::Error;

/// Failures of the frame normalization path (pool, render, re-wrap).
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to create {width}x{height} conversion pool: {reason}")]
    PoolCreation {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("conversion pool exhausted: all {capacity} buffers in use")]
    BufferAcquisition { capacity: usize },
    #[error("conversion pool is {pool_width}x{pool_height}, frame is {width}x{height}")]
    DimensionMismatch {
        pool_width: u32,
        pool_height: u32,
        width: u32,
        height: u32,
    },
    #[error("render into conversion buffer failed: {0}")]
    Render(#[from] ffmpeg_next::Error),
    #[error("source frame carries no timing info")]
    TimingExtraction,
    #[error("cannot describe buffer: {0}")]
    FormatDescription(String),
    #[error("cannot construct frame: {0}")]
    FrameConstruction(String),
}

impl ConvertError {
    /// True for errors raised while re-attaching timing to a converted buffer.
    pub fn is_timing(&self) -> bool {
        matches!(
            self,
            ConvertError::TimingExtraction
                | ConvertError::FormatDescription(_)
                | ConvertError::FrameConstruction(_)
        )
    }

    pub fn is_pool_creation(&self) -> bool {
        matches!(self, ConvertError::PoolCreation { .. })
    }
}
