//! Writers for PNG snapshots and CSV dumps

use crate::colorize::Colorizer;
use crate::error::{CaptureError, Result};
use crate::frame::{ColorFrame, DepthFrame, VideoFrame};
use crate::types::StreamKind;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Why nothing was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The frame set had no frame for this stream
    MissingStream(StreamKind),
    /// The frame has zero width or height
    EmptyFrame(StreamKind),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingStream(kind) => write!(f, "no {} frame in frame set", kind),
            SkipReason::EmptyFrame(kind) => write!(f, "{} frame is empty", kind),
        }
    }
}

/// Outcome of one write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    /// File written at this path
    Written(PathBuf),
    /// Nothing written
    Skipped(SkipReason),
}

impl Persisted {
    /// Path of the written file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Persisted::Written(path) => Some(path),
            Persisted::Skipped(_) => None,
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        warn!("skipped write: {}", reason);
        Persisted::Skipped(reason)
    }
}

/// `<prefix>_<frame_number>.csv`
pub fn csv_path<P: AsRef<Path>>(prefix: P, frame_number: u64) -> PathBuf {
    let mut name = OsString::from(prefix.as_ref().as_os_str());
    name.push(format!("_{}.csv", frame_number));
    PathBuf::from(name)
}

/// Write depth rows as distances: `d * depth_units` with two decimals, each followed by `", "`.
pub fn write_depth_csv<W: Write>(out: &mut W, frame: &DepthFrame, depth_units: f32) -> io::Result<()> {
    for row in frame.rows() {
        for &d in row {
            write!(out, "{:.2}, ", d as f32 * depth_units)?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write color rows as `0xAABBCC,` cells, channels in frame order.
pub fn write_color_csv<W: Write>(out: &mut W, frame: &ColorFrame) -> io::Result<()> {
    let bpp = frame.pixel_format().bytes_per_pixel();
    for row in frame.rows() {
        for px in row.chunks_exact(bpp) {
            write!(out, "0x{:02x}{:02x}{:02x},", px[0], px[1], px[2])?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| CaptureError::io(path, e))?;
    let mut out = BufWriter::new(file);
    body(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| CaptureError::io(path, e))
}

/// Save a depth frame as `<prefix>_<frame_number>.csv`
pub fn save_depth_csv<P: AsRef<Path>>(prefix: P, frame: Option<&DepthFrame>, depth_units: f32) -> Result<Persisted> {
    let Some(frame) = frame else {
        return Ok(Persisted::skipped(SkipReason::MissingStream(StreamKind::Depth)));
    };

    let path = csv_path(prefix, frame.frame_number());
    write_file(&path, |out| write_depth_csv(out, frame, depth_units))?;
    info!("Saved {}", path.display());
    Ok(Persisted::Written(path))
}

/// Save a color frame as `<prefix>_<frame_number>.csv`
pub fn save_color_csv<P: AsRef<Path>>(prefix: P, frame: Option<&ColorFrame>) -> Result<Persisted> {
    let Some(frame) = frame else {
        return Ok(Persisted::skipped(SkipReason::MissingStream(StreamKind::Color)));
    };

    let path = csv_path(prefix, frame.frame_number());
    write_file(&path, |out| write_color_csv(out, frame))?;
    info!("Saved {}", path.display());
    Ok(Persisted::Written(path))
}

/// Save a frame as an 8-bit RGB PNG at `path`.
///
/// Depth frames go through `colorizer` first.
pub fn save_photo<P: AsRef<Path>>(
    path: P,
    frame: Option<&VideoFrame>,
    colorizer: &Colorizer,
    depth_units: f32,
    stream: StreamKind,
) -> Result<Persisted> {
    let path = path.as_ref();
    let Some(frame) = frame else {
        return Ok(Persisted::skipped(SkipReason::MissingStream(stream)));
    };

    let res = frame.resolution();
    if res.pixel_count() == 0 {
        return Ok(Persisted::skipped(SkipReason::EmptyFrame(frame.kind())));
    }

    let rgb = match frame {
        VideoFrame::Depth(depth) => colorizer.process(depth, depth_units)?.to_rgb24(),
        VideoFrame::Color(color) => color.to_rgb24(),
    };

    let image = image::RgbImage::from_raw(res.width, res.height, rgb).ok_or_else(|| {
        CaptureError::InvalidFrame(format!("{}x{} buffer too small for PNG", res.width, res.height))
    })?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| CaptureError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Saved {}", path.display());
    Ok(Persisted::Written(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelFormat;
    use tempfile::TempDir;

    #[test]
    fn test_depth_csv_rows() {
        let frame = DepthFrame::new(2, 2, 0, vec![10, 20, 30, 40]).unwrap();
        let mut out = Vec::new();
        write_depth_csv(&mut out, &frame, 0.001).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.01, 0.02, \n0.03, 0.04, \n");
    }

    #[test]
    fn test_depth_csv_zero_and_rounding() {
        let frame = DepthFrame::new(2, 1, 0, vec![0, 1234]).unwrap();
        let mut out = Vec::new();
        write_depth_csv(&mut out, &frame, 0.001).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.00, 1.23, \n");
    }

    #[test]
    fn test_color_csv_zero_padded() {
        let frame = ColorFrame::new(1, 1, 0, PixelFormat::Rgb24, vec![255, 0, 128]).unwrap();
        let mut out = Vec::new();
        write_color_csv(&mut out, &frame).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0xff0080,\n");
    }

    #[test]
    fn test_color_csv_keeps_frame_order_and_drops_alpha() {
        let frame = ColorFrame::new(2, 1, 0, PixelFormat::Bgra32, vec![1, 2, 3, 255, 10, 11, 12, 255]).unwrap();
        let mut out = Vec::new();
        write_color_csv(&mut out, &frame).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0x010203,0x0a0b0c,\n");
    }

    #[test]
    fn test_csv_path_appends_frame_number() {
        assert_eq!(csv_path("out/depth/4", 1234), Path::new("out/depth/4_1234.csv"));
    }

    #[test]
    fn test_save_depth_csv_file() {
        let dir = TempDir::new().unwrap();
        let frame = DepthFrame::new(2, 2, 77, vec![10, 20, 30, 40]).unwrap();
        let saved = save_depth_csv(dir.path().join("5"), Some(&frame), 0.001).unwrap();
        let path = saved.path().unwrap().to_path_buf();
        assert_eq!(path, dir.path().join("5_77.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "0.01, 0.02, \n0.03, 0.04, \n");
    }

    #[test]
    fn test_missing_stream_is_reported() {
        let dir = TempDir::new().unwrap();
        let saved = save_color_csv(dir.path().join("0"), None).unwrap();
        assert_eq!(saved, Persisted::Skipped(SkipReason::MissingStream(StreamKind::Color)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_photo_color_png() {
        let dir = TempDir::new().unwrap();
        let frame = VideoFrame::Color(ColorFrame::new(2, 1, 0, PixelFormat::Bgr24, vec![0, 0, 255, 255, 0, 0]).unwrap());
        let path = dir.path().join("3.png");
        let saved = save_photo(&path, Some(&frame), &Colorizer::default(), 0.001, StreamKind::Color).unwrap();
        assert_eq!(saved, Persisted::Written(path.clone()));

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_save_photo_colorizes_depth() {
        let dir = TempDir::new().unwrap();
        let frame = VideoFrame::Depth(DepthFrame::new(2, 1, 0, vec![0, 800]).unwrap());
        let path = dir.path().join("0.png");
        save_photo(&path, Some(&frame), &Colorizer::default(), 0.001, StreamKind::Depth).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [50, 0, 0]);
    }

    #[test]
    fn test_save_photo_empty_frame_skipped() {
        let dir = TempDir::new().unwrap();
        let frame = VideoFrame::Depth(DepthFrame::new(0, 0, 0, Vec::new()).unwrap());
        let saved = save_photo(dir.path().join("0.png"), Some(&frame), &Colorizer::default(), 0.001, StreamKind::Depth).unwrap();
        assert_eq!(saved, Persisted::Skipped(SkipReason::EmptyFrame(StreamKind::Depth)));
    }
}
