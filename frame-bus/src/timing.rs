//! Re-attaching capture timing to converted buffers.

use ffmpeg_next::format::Pixel;

use crate::error::ConvertError;
use crate::format::PixelFormat;
use crate::frame::{Frame, PixelBuffer, SampleTiming};

/// Layout of a buffer as seen by frame consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescription {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

impl FormatDescription {
    pub fn for_buffer(buffer: &PixelBuffer) -> Result<Self, ConvertError> {
        if buffer.pixel() == Pixel::None {
            return Err(ConvertError::FormatDescription(
                "unknown pixel format".to_string(),
            ));
        }
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(ConvertError::FormatDescription(format!(
                "invalid size {}x{}",
                buffer.width(),
                buffer.height()
            )));
        }
        if buffer.planes() == 0 {
            return Err(ConvertError::FormatDescription(
                "no pixel data".to_string(),
            ));
        }
        Ok(Self {
            format: buffer.format(),
            width: buffer.width(),
            height: buffer.height(),
        })
    }

    fn describes(&self, buffer: &PixelBuffer) -> bool {
        self.format == buffer.format()
            && self.width == buffer.width()
            && self.height == buffer.height()
    }
}

/// Wraps `buffer` into a new frame carrying `timing_source`'s timing and
/// orientation. The buffer's own pts is set to match.
pub fn wrap(mut buffer: PixelBuffer, timing_source: &Frame) -> Result<Frame, ConvertError> {
    let timing = timing_source
        .timing()
        .ok_or(ConvertError::TimingExtraction)?;
    let description = FormatDescription::for_buffer(&buffer)?;
    check_timing(&timing)?;
    if !description.describes(&buffer) {
        return Err(ConvertError::FrameConstruction(format!(
            "description {:?} does not match buffer {:?}",
            description, buffer
        )));
    }
    buffer.get_mut().set_pts(Some(timing.pts));
    Ok(Frame::new(buffer, timing_source.orientation(), Some(timing)))
}

fn check_timing(timing: &SampleTiming) -> Result<(), ConvertError> {
    let time_base = timing.time_base;
    if time_base.numerator() <= 0 || time_base.denominator() <= 0 {
        return Err(ConvertError::FrameConstruction(format!(
            "invalid time base {}/{}",
            time_base.numerator(),
            time_base.denominator()
        )));
    }
    if timing.duration < 0 {
        return Err(ConvertError::FrameConstruction(format!(
            "negative duration {}",
            timing.duration
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::Rational;

    use super::*;
    use crate::orientation::Orientation;

    fn source(timing: Option<SampleTiming>) -> Frame {
        let video = ffmpeg_next::frame::Video::new(Pixel::YUV420P, 64, 48);
        Frame::new(video, Orientation::Right, timing)
    }

    fn bgra() -> PixelBuffer {
        PixelBuffer::from(ffmpeg_next::frame::Video::new(Pixel::BGRA, 64, 48))
    }

    #[test]
    fn test_wrap_copies_timing() {
        let timing = SampleTiming::new(9000, 3000, Rational::new(1, 90000));
        let source = source(Some(timing));
        let frame = wrap(bgra(), &source).unwrap();

        assert_eq!(frame.timing(), Some(timing));
        assert_eq!(frame.buffer().pts(), Some(9000));
        assert_eq!(frame.orientation(), Orientation::Right);
        assert_eq!(frame.format(), PixelFormat::Bgra32);
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }

    #[test]
    fn test_wrap_without_timing() {
        assert!(matches!(
            wrap(bgra(), &source(None)),
            Err(ConvertError::TimingExtraction)
        ));
    }

    #[test]
    fn test_wrap_malformed_buffer() {
        let timing = SampleTiming::new(0, 1, Rational::new(1, 30));
        let empty = PixelBuffer::from(ffmpeg_next::frame::Video::empty());
        assert!(matches!(
            wrap(empty, &source(Some(timing))),
            Err(ConvertError::FormatDescription(_))
        ));
    }

    #[test]
    fn test_wrap_bad_time_base() {
        let timing = SampleTiming::new(0, 1, Rational::new(1, 0));
        let err = wrap(bgra(), &source(Some(timing))).unwrap_err();
        assert!(matches!(err, ConvertError::FrameConstruction(_)));
        assert!(err.is_timing());

        let timing = SampleTiming::new(0, -1, Rational::new(1, 30));
        assert!(matches!(
            wrap(bgra(), &source(Some(timing))),
            Err(ConvertError::FrameConstruction(_))
        ));
    }
}
