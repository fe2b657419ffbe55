use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use clap::Parser;
use frame_bus::{FormatConverter, Frame, Orientation, PixelBuffer, VideoSource, timing};

/// Decode a video file or capture device and run every frame through the
/// normalization path the text detector sees.
#[derive(Parser, Debug)]
#[command(name = "frame-bus")]
struct Args {
    /// File path or device (e.g. /dev/video0)
    input: String,
    /// FFmpeg input format, e.g. "v4l2"
    #[arg(long)]
    format: Option<String>,
    /// Orientation reported for every frame
    #[arg(long, default_value = "up")]
    orientation: Orientation,
    /// Stop after this many frames (0 = no limit)
    #[arg(long, default_value_t = 0)]
    max_frames: usize,
    /// Write the first normalized BGRA frame as JPEG
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Default)]
struct ProbeStats {
    frames: usize,
    passed_through: usize,
    converted: usize,
    dropped: usize,
}

impl Display for ProbeStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "frames: {}, passed through: {}, converted: {}, dropped: {}",
            self.frames, self.passed_through, self.converted, self.dropped
        )
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    frame_bus::init()?;

    let args = Args::parse();
    let mut source = VideoSource::open(&args.input, args.format.as_deref(), args.orientation)?;
    log::info!(
        "stream index: {}, {}x{}, fps: {:.2}, time_base: {}",
        source.stream_index(),
        source.width(),
        source.height(),
        source.fps(),
        source.time_base()
    );

    let converter = FormatConverter::shared();
    let mut stats = ProbeStats::default();
    let mut snapshot = args.snapshot.clone();

    while let Some(frame) = source.next_frame()? {
        normalize(&converter, frame, &mut stats, &mut snapshot)?;
        if args.max_frames > 0 && stats.frames >= args.max_frames {
            break;
        }
    }

    log::info!("{}", stats);
    if let Some(pool) = converter.pool().pool() {
        log::info!(
            "conversion pool {}x{}: {} buffers allocated",
            pool.width(),
            pool.height(),
            pool.allocated()
        );
    }
    Ok(())
}

fn normalize(
    converter: &FormatConverter,
    frame: Frame,
    stats: &mut ProbeStats,
    snapshot: &mut Option<PathBuf>,
) -> anyhow::Result<()> {
    stats.frames += 1;
    let detector_orientation = frame.orientation().for_detector();

    let normalized = if frame.format().is_detector_compatible() {
        stats.passed_through += 1;
        frame
    } else {
        let wrapped = converter
            .convert(frame.buffer())
            .and_then(|buffer| timing::wrap(buffer, &frame));
        match wrapped {
            Ok(converted) => {
                stats.converted += 1;
                converted
            }
            Err(e) => {
                stats.dropped += 1;
                log::warn!("frame {} dropped: {:#}", stats.frames, e);
                return Ok(());
            }
        }
    };
    log::debug!("{} -> detector orientation {}", normalized, detector_orientation);

    if normalized.buffer().bgra_bytes().is_some() {
        if let Some(path) = snapshot.take() {
            write_snapshot(&path, normalized.buffer())?;
            log::info!("snapshot written to {}", path.display());
        }
    }
    Ok(())
}

fn write_snapshot(path: &Path, buffer: &PixelBuffer) -> anyhow::Result<()> {
    let bytes = buffer
        .bgra_bytes()
        .ok_or_else(|| anyhow::anyhow!("snapshot needs a BGRA buffer"))?;
    let width = u16::try_from(buffer.width())?;
    let height = u16::try_from(buffer.height())?;
    let encoder = jpeg_encoder::Encoder::new_file(path, 90)?;
    encoder.encode(&bytes, width, height, jpeg_encoder::ColorType::Bgra)?;
    Ok(())
}
