use std::fmt::{Debug, Display, Formatter};
use std::mem::ManuallyDrop;
use std::sync::Weak;

use bytes::{Bytes, BytesMut};
use ffmpeg_next::Rational;
use ffmpeg_next::format::Pixel;

use crate::format::PixelFormat;
use crate::orientation::Orientation;
use crate::pool::Shared;

/// A 2D pixel buffer backed by an FFmpeg video frame.
///
/// Buffers drawn from a [`crate::pool::BufferPool`] go back to that pool when
/// dropped; any other buffer is simply freed.
pub struct PixelBuffer {
    frame: ManuallyDrop<ffmpeg_next::frame::Video>,
    home: Option<Weak<Shared>>,
}

impl PixelBuffer {
    pub(crate) fn pooled(frame: ffmpeg_next::frame::Video, home: Weak<Shared>) -> Self {
        Self {
            frame: ManuallyDrop::new(frame),
            home: Some(home),
        }
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    pub fn pixel(&self) -> Pixel {
        self.frame.format()
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::of(&self.frame)
    }

    pub fn pts(&self) -> Option<i64> {
        self.frame.pts()
    }

    pub fn planes(&self) -> usize {
        self.frame.planes()
    }

    pub fn is_pooled(&self) -> bool {
        self.home.is_some()
    }

    /// True when there is no pixel data to read: unallocated planes, an
    /// unknown format, or a zero dimension.
    pub fn is_empty(&self) -> bool {
        self.frame.format() == Pixel::None
            || self.frame.width() == 0
            || self.frame.height() == 0
            || self.frame.planes() == 0
    }

    pub fn as_video(&self) -> &ffmpeg_next::frame::Video {
        &self.frame
    }

    pub fn get_mut(&mut self) -> &mut ffmpeg_next::frame::Video {
        &mut self.frame
    }

    /// Tightly packed copy of a BGRA buffer (row padding removed).
    pub fn bgra_bytes(&self) -> Option<Bytes> {
        if self.pixel() != Pixel::BGRA || self.is_empty() {
            return None;
        }
        let row = self.width() as usize * 4;
        let stride = self.frame.stride(0);
        let data = self.frame.data(0);
        let mut packed = BytesMut::with_capacity(row * self.height() as usize);
        for y in 0..self.height() as usize {
            let start = y * stride;
            packed.extend_from_slice(&data[start..start + row]);
        }
        Some(packed.freeze())
    }
}

impl From<ffmpeg_next::frame::Video> for PixelBuffer {
    fn from(frame: ffmpeg_next::frame::Video) -> Self {
        Self {
            frame: ManuallyDrop::new(frame),
            home: None,
        }
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        match self.home.take().and_then(|home| home.upgrade()) {
            Some(pool) => {
                // the frame is not touched again after being moved out
                let frame = unsafe { ManuallyDrop::take(&mut self.frame) };
                pool.recycle(frame);
            }
            None => unsafe { ManuallyDrop::drop(&mut self.frame) },
        }
    }
}

impl Debug for PixelBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.pixel())
            .field("pooled", &self.is_pooled())
            .finish()
    }
}

/// Presentation timestamp and duration, both in `time_base` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTiming {
    pub pts: i64,
    pub duration: i64,
    pub time_base: Rational,
}

impl SampleTiming {
    pub fn new(pts: i64, duration: i64, time_base: Rational) -> Self {
        Self {
            pts,
            duration,
            time_base,
        }
    }

    pub fn pts_ms(&self) -> u64 {
        to_ms(self.pts, self.time_base)
    }

    pub fn duration_ms(&self) -> u64 {
        to_ms(self.duration, self.time_base)
    }
}

fn to_ms(value: i64, time_base: Rational) -> u64 {
    let value = value.max(0) as u64;
    let num = time_base.numerator().max(0) as u64;
    let den = time_base.denominator().max(1) as u64;
    value * num * 1000 / den
}

/// One captured (or re-wrapped) video frame: pixels, orientation and timing.
#[derive(Debug)]
pub struct Frame {
    buffer: PixelBuffer,
    orientation: Orientation,
    timing: Option<SampleTiming>,
}

impl Frame {
    pub fn new(
        buffer: impl Into<PixelBuffer>,
        orientation: Orientation,
        timing: Option<SampleTiming>,
    ) -> Self {
        Self {
            buffer: buffer.into(),
            orientation,
            timing,
        }
    }

    /// Builds a frame from decoder output. Timing is taken from the frame's
    /// pts, falling back to the best-effort timestamp; a frame with neither
    /// carries no timing.
    pub fn from_video(
        video: ffmpeg_next::frame::Video,
        orientation: Orientation,
        time_base: Rational,
        duration: i64,
    ) -> Self {
        let timing = video
            .pts()
            .or_else(|| video.timestamp())
            .map(|pts| SampleTiming::new(pts, duration, time_base));
        Self::new(video, orientation, timing)
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn timing(&self) -> Option<SampleTiming> {
        self.timing
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn format(&self) -> PixelFormat {
        self.buffer.format()
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "Frame {}x{} format: {}, orientation: {}, pts: {:?}",
            self.width(),
            self.height(),
            self.format(),
            self.orientation,
            self.timing.map(|t| t.pts)
        )
    }
}
