//! Frame plumbing for the text recognition pipeline: pixel format
//! classification, pooled BGRA conversion, timing re-wrap and orientation.

/// Registers FFmpeg components (formats, codecs). Only needed before opening
/// inputs; buffer conversion works without it.
pub fn init() -> anyhow::Result<()> {
    ffmpeg_next::init().map_err(|e| anyhow::anyhow!("ffmpeg_next init: {}", e))
}

pub mod convert;
pub mod error;
pub mod format;
pub mod frame;
pub mod orientation;
pub mod pool;
pub mod scaler;
pub mod source;
pub mod timing;

pub use convert::FormatConverter;
pub use error::ConvertError;
pub use format::PixelFormat;
pub use frame::{Frame, PixelBuffer, SampleTiming};
pub use orientation::Orientation;
pub use pool::{BufferPool, PoolConfig, PoolSlot};
pub use source::VideoSource;
