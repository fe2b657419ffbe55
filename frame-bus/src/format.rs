//! Pixel format classification.
//!
//! The text detector reads three layouts directly: NV12 in video range, NV12
//! in full range, and packed BGRA. Everything else has to be rendered into
//! BGRA first.

use std::fmt::{Display, Formatter};

use ffmpeg_next::color::Range;
use ffmpeg_next::format::Pixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4:2:0 biplanar luma/chroma, limited (16-235) range.
    Yuv420BiPlanarVideoRange,
    /// 4:2:0 biplanar luma/chroma, full (0-255) range.
    Yuv420BiPlanarFullRange,
    /// Packed 32-bit BGRA.
    Bgra32,
    Other(Pixel),
}

impl PixelFormat {
    /// Classify a decoded frame by its declared format tag and color range.
    pub fn of(frame: &ffmpeg_next::frame::Video) -> Self {
        Self::from_parts(frame.format(), frame.color_range())
    }

    pub fn from_parts(pixel: Pixel, range: Range) -> Self {
        match pixel {
            Pixel::NV12 if range == Range::JPEG => PixelFormat::Yuv420BiPlanarFullRange,
            Pixel::NV12 => PixelFormat::Yuv420BiPlanarVideoRange,
            Pixel::BGRA => PixelFormat::Bgra32,
            other => PixelFormat::Other(other),
        }
    }

    /// Whether the detector accepts this layout without conversion.
    pub fn is_detector_compatible(self) -> bool {
        !matches!(self, PixelFormat::Other(_))
    }

    pub fn pixel(self) -> Pixel {
        match self {
            PixelFormat::Yuv420BiPlanarVideoRange | PixelFormat::Yuv420BiPlanarFullRange => {
                Pixel::NV12
            }
            PixelFormat::Bgra32 => Pixel::BGRA,
            PixelFormat::Other(pixel) => pixel,
        }
    }
}

impl Display for PixelFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            PixelFormat::Yuv420BiPlanarVideoRange => write!(f, "nv12(video-range)"),
            PixelFormat::Yuv420BiPlanarFullRange => write!(f, "nv12(full-range)"),
            PixelFormat::Bgra32 => write!(f, "bgra"),
            PixelFormat::Other(pixel) => write!(f, "{:?}", pixel),
        }
    }
}

/// Returns true when a buffer with this format can go straight to detection.
pub fn is_compatible(frame: &ffmpeg_next::frame::Video) -> bool {
    PixelFormat::of(frame).is_detector_compatible()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_formats() {
        assert_eq!(
            PixelFormat::from_parts(Pixel::NV12, Range::MPEG),
            PixelFormat::Yuv420BiPlanarVideoRange
        );
        assert_eq!(
            PixelFormat::from_parts(Pixel::NV12, Range::Unspecified),
            PixelFormat::Yuv420BiPlanarVideoRange
        );
        assert_eq!(
            PixelFormat::from_parts(Pixel::NV12, Range::JPEG),
            PixelFormat::Yuv420BiPlanarFullRange
        );
        assert_eq!(
            PixelFormat::from_parts(Pixel::BGRA, Range::Unspecified),
            PixelFormat::Bgra32
        );
        for pixel in [Pixel::NV12, Pixel::BGRA] {
            assert!(PixelFormat::from_parts(pixel, Range::MPEG).is_detector_compatible());
        }
    }

    #[test]
    fn test_rejected_formats() {
        for pixel in [
            Pixel::YUV420P,
            Pixel::YUYV422,
            Pixel::RGB24,
            Pixel::RGBA,
            Pixel::NV21,
            Pixel::YUVJ420P,
        ] {
            let format = PixelFormat::from_parts(pixel, Range::JPEG);
            assert_eq!(format, PixelFormat::Other(pixel));
            assert!(!format.is_detector_compatible());
        }
    }

    #[test]
    fn test_classify_frame() {
        let mut frame = ffmpeg_next::frame::Video::new(Pixel::NV12, 32, 16);
        assert!(is_compatible(&frame));
        frame.set_color_range(Range::JPEG);
        assert_eq!(PixelFormat::of(&frame), PixelFormat::Yuv420BiPlanarFullRange);

        let frame = ffmpeg_next::frame::Video::new(Pixel::YUV420P, 32, 16);
        assert!(!is_compatible(&frame));
        assert_eq!(PixelFormat::of(&frame).pixel(), Pixel::YUV420P);
    }
}
