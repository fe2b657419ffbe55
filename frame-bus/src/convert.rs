//! Renders frames the detector cannot read into pooled BGRA buffers.

use std::sync::{Arc, LazyLock};

use crate::error::ConvertError;
use crate::frame::PixelBuffer;
use crate::pool::{PoolConfig, PoolSlot};
use crate::scaler::RenderContext;

/// Pool plus render context: the only state shared across frames.
pub struct FormatConverter {
    pool: PoolSlot,
    render: RenderContext,
}

impl Default for FormatConverter {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl FormatConverter {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            pool: PoolSlot::new(config),
            render: RenderContext::new(),
        }
    }

    /// The process-wide converter with default pool sizing.
    pub fn shared() -> Arc<FormatConverter> {
        static SHARED: LazyLock<Arc<FormatConverter>> =
            LazyLock::new(|| Arc::new(FormatConverter::default()));
        SHARED.clone()
    }

    pub fn pool(&self) -> &PoolSlot {
        &self.pool
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.render
    }

    /// Renders `source` into a BGRA buffer of the same size drawn from the
    /// pool. The source pixels are read in place, never copied.
    pub fn convert(&self, source: &PixelBuffer) -> Result<PixelBuffer, ConvertError> {
        let mut target = self.pool.acquire(source.width(), source.height())?;
        let video = source.as_video();
        let output = target.get_mut();
        self.render.render(video, output)?;
        output.set_color_range(ffmpeg_next::color::Range::JPEG);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::format::Pixel;

    use super::*;
    use crate::format::PixelFormat;

    fn gray_yuv420p(width: u32, height: u32) -> PixelBuffer {
        let mut video = ffmpeg_next::frame::Video::new(Pixel::YUV420P, width, height);
        for plane in 0..3 {
            for byte in video.data_mut(plane).iter_mut() {
                *byte = 128;
            }
        }
        PixelBuffer::from(video)
    }

    #[test]
    fn test_convert_to_bgra() {
        let converter = FormatConverter::default();
        let source = gray_yuv420p(64, 48);
        let converted = converter.convert(&source).unwrap();

        assert_eq!(converted.format(), PixelFormat::Bgra32);
        assert_eq!(converted.width(), 64);
        assert_eq!(converted.height(), 48);
        assert!(converted.is_pooled());

        let bytes = converted.bgra_bytes().unwrap();
        let center = ((24 * 64 + 32) * 4) as usize;
        let (b, g, r, a) = (
            bytes[center],
            bytes[center + 1],
            bytes[center + 2],
            bytes[center + 3],
        );
        assert_eq!(a, 255);
        assert!(b.abs_diff(g) <= 2 && g.abs_diff(r) <= 2, "{b} {g} {r}");
        assert!((115..=145).contains(&g), "{g}");
    }

    #[test]
    fn test_convert_reuses_pool_buffers() {
        let converter = FormatConverter::default();
        let source = gray_yuv420p(64, 48);
        for _ in 0..20 {
            let converted = converter.convert(&source).unwrap();
            drop(converted);
        }
        let pool = converter.pool().pool().unwrap();
        assert_eq!(pool.allocated(), 3);
        assert_eq!(converter.pool().creation_count(), 1);
        assert_eq!(converter.render_context().builds(), 1);
    }

    #[test]
    fn test_exhausted_pool_drops_frame_then_recovers() {
        let converter = FormatConverter::new(PoolConfig::default().with_max_buffer_count(3));
        let source = gray_yuv420p(32, 32);
        let held: Vec<_> = (0..3).map(|_| converter.convert(&source).unwrap()).collect();
        assert!(matches!(
            converter.convert(&source),
            Err(ConvertError::BufferAcquisition { .. })
        ));
        drop(held);
        assert!(converter.convert(&source).is_ok());
    }

    #[test]
    fn test_shared_is_one_instance() {
        assert!(Arc::ptr_eq(
            &FormatConverter::shared(),
            &FormatConverter::shared()
        ));
    }
}
