//! Demuxes and decodes a file or capture device into timed [`Frame`]s.

use std::collections::VecDeque;
use std::ffi::CString;
use std::path::Path;

use ffmpeg_next::{Dictionary, Rational};

use crate::frame::Frame;
use crate::orientation::Orientation;

/// Best video stream of one input, decoded synchronously.
pub struct VideoSource {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::codec::decoder::Video,
    stream_index: usize,
    time_base: Rational,
    frame_rate: Rational,
    orientation: Orientation,
    ready: VecDeque<ffmpeg_next::frame::Video>,
    at_eof: bool,
}

impl VideoSource {
    /// Opens `url`. `format` forces an FFmpeg input format (e.g. "v4l2" for
    /// a capture device); every frame is tagged with `orientation`.
    pub fn open(url: &str, format: Option<&str>, orientation: Orientation) -> anyhow::Result<Self> {
        let path = Path::new(url);
        let input = match format {
            Some(name) => {
                let format = ffmpeg_next::format::format::Format::Input(find_input_format(name)?);
                ffmpeg_next::format::open_with(path, &format, Dictionary::new())?.input()
            }
            None => ffmpeg_next::format::input(path)?,
        };

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream in {}", url))?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let frame_rate = stream.avg_frame_rate();

        let mut context = ffmpeg_next::codec::Context::from_parameters(stream.parameters())?;
        unsafe {
            (*context.as_mut_ptr()).time_base = time_base.into();
        }
        let decoder = context.decoder().video()?;
        if decoder.format() == ffmpeg_next::format::Pixel::None
            || decoder.width() == 0
            || decoder.height() == 0
        {
            return Err(anyhow::anyhow!(
                "stream {} is missing codec parameters",
                stream_index
            ));
        }

        Ok(Self {
            input,
            decoder,
            stream_index,
            time_base,
            frame_rate,
            orientation,
            ready: VecDeque::new(),
            at_eof: false,
        })
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn fps(&self) -> f32 {
        if self.frame_rate.denominator() == 0 {
            return 0.0;
        }
        self.frame_rate.numerator() as f32 / self.frame_rate.denominator() as f32
    }

    /// Next decoded frame, or `None` once the input and the decoder are
    /// both drained.
    pub fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        loop {
            if let Some(video) = self.ready.pop_front() {
                let duration = frame_duration(self.time_base, self.frame_rate);
                return Ok(Some(Frame::from_video(
                    video,
                    self.orientation,
                    self.time_base,
                    duration,
                )));
            }
            if self.at_eof {
                return Ok(None);
            }

            let next = self
                .input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match next {
                Some((index, _)) if index != self.stream_index => continue,
                Some((_, packet)) => self.decoder.send_packet(&packet)?,
                None => {
                    self.decoder.send_eof()?;
                    self.at_eof = true;
                }
            }
            self.receive_ready()?;
        }
    }

    fn receive_ready(&mut self) -> anyhow::Result<()> {
        loop {
            let mut video = ffmpeg_next::frame::Video::empty();
            match self.decoder.receive_frame(&mut video) {
                Ok(()) => self.ready.push_back(video),
                Err(ffmpeg_next::Error::Eof) => return Ok(()),
                Err(ffmpeg_next::Error::Other { errno })
                    if errno == ffmpeg_next::util::error::EAGAIN =>
                {
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Resolves an input format by name via `av_find_input_format`.
fn find_input_format(name: &str) -> anyhow::Result<ffmpeg_next::format::format::Input> {
    let cname =
        CString::new(name).map_err(|e| anyhow::anyhow!("invalid format name {:?}: {}", name, e))?;
    let ptr = unsafe { ffmpeg_next::ffi::av_find_input_format(cname.as_ptr()) };
    if ptr.is_null() {
        return Err(anyhow::anyhow!("input format not found: {}", name));
    }
    Ok(unsafe { ffmpeg_next::format::format::Input::wrap(ptr as *mut _) })
}

/// Length of one frame in `time_base` units at `frame_rate`. Zero when
/// either is unknown.
pub fn frame_duration(time_base: Rational, frame_rate: Rational) -> i64 {
    let tb_num = time_base.numerator() as i64;
    let tb_den = time_base.denominator() as i64;
    let rate_num = frame_rate.numerator() as i64;
    let rate_den = frame_rate.denominator() as i64;
    if tb_num <= 0 || tb_den <= 0 || rate_num <= 0 || rate_den <= 0 {
        return 0;
    }
    (tb_den * rate_den) / (tb_num * rate_num)
}
