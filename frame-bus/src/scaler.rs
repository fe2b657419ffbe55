use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{Context, Flags};

use crate::error::ConvertError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScalerKey {
    source: Pixel,
    width: u32,
    height: u32,
    target: Pixel,
}

/// A swscale context bound to one source format and size, rendering at the
/// same size into `target`.
pub struct Scaler {
    context: Context,
    key: ScalerKey,
}

impl Scaler {
    pub fn new(
        source: Pixel,
        width: u32,
        height: u32,
        target: Pixel,
    ) -> Result<Self, ffmpeg_next::Error> {
        let context = Context::get(source, width, height, target, width, height, Flags::BILINEAR)?;
        Ok(Self {
            context,
            key: ScalerKey {
                source,
                width,
                height,
                target,
            },
        })
    }

    fn matches(&self, key: &ScalerKey) -> bool {
        self.key == *key
    }

    pub fn run(
        &mut self,
        frame: &ffmpeg_next::frame::Video,
        dst: &mut ffmpeg_next::frame::Video,
    ) -> Result<(), ffmpeg_next::Error> {
        self.context.run(frame, dst)
    }
}

unsafe impl Send for Scaler {}

/// Shared rendering context. Construction is expensive, so one scaler is kept
/// and rebuilt only when the source format or geometry changes. Renders are
/// serialized by the lock.
pub struct RenderContext {
    scaler: Mutex<Option<Scaler>>,
    builds: AtomicUsize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            scaler: Mutex::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    /// Number of scaler contexts built so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }

    /// Renders `source` into `dst`, converting to `dst`'s pixel format. Both
    /// frames must have the same dimensions.
    pub fn render(
        &self,
        source: &ffmpeg_next::frame::Video,
        dst: &mut ffmpeg_next::frame::Video,
    ) -> Result<(), ConvertError> {
        let key = ScalerKey {
            source: source.format(),
            width: source.width(),
            height: source.height(),
            target: dst.format(),
        };
        let mut guard = self.scaler.lock().unwrap_or_else(PoisonError::into_inner);
        let mut scaler = match guard.take() {
            Some(scaler) if scaler.matches(&key) => scaler,
            _ => {
                let scaler = Scaler::new(key.source, key.width, key.height, key.target)?;
                self.builds.fetch_add(1, Ordering::AcqRel);
                log::debug!(
                    "built scaler {:?} -> {:?} at {}x{}",
                    key.source,
                    key.target,
                    key.width,
                    key.height
                );
                scaler
            }
        };
        // a scaler that failed stays dropped; the next render builds a new one
        scaler.run(source, dst)?;
        *guard = Some(scaler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler_is_reused_until_source_changes() {
        let render = RenderContext::new();
        let source = ffmpeg_next::frame::Video::new(Pixel::YUV420P, 64, 48);
        let mut dst = ffmpeg_next::frame::Video::new(Pixel::BGRA, 64, 48);

        render.render(&source, &mut dst).unwrap();
        render.render(&source, &mut dst).unwrap();
        assert_eq!(render.builds(), 1);

        let rgb = ffmpeg_next::frame::Video::new(Pixel::RGB24, 64, 48);
        render.render(&rgb, &mut dst).unwrap();
        assert_eq!(render.builds(), 2);
    }

    #[test]
    fn test_size_mismatch_does_not_poison() {
        let render = RenderContext::new();
        let source = ffmpeg_next::frame::Video::new(Pixel::YUV420P, 64, 48);
        let mut wrong = ffmpeg_next::frame::Video::new(Pixel::BGRA, 32, 32);
        assert!(render.render(&source, &mut wrong).is_err());

        let mut dst = ffmpeg_next::frame::Video::new(Pixel::BGRA, 64, 48);
        render.render(&source, &mut dst).unwrap();
    }
}
