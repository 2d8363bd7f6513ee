//! Capture parameters and output layout

use crate::colorize::Colorizer;
use crate::error::{CaptureError, Result};
use crate::session::next_session_index_across;
use crate::types::StreamKind;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output root, relative to the working directory
pub const DEFAULT_OUTPUT_ROOT: &str = "./pictures/purplering";
/// Frames discarded while auto-exposure settles
pub const DEFAULT_WARMUP_FRAMES: u32 = 30;
/// One frame set in this many is persisted
pub const DEFAULT_SAMPLE_INTERVAL: u64 = 100;
/// Upper bound on a single frame wait
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Directories receiving each artifact family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// PNG snapshots
    pub png: PathBuf,
    /// Depth CSV dumps
    pub depth: PathBuf,
    /// Color CSV dumps
    pub color: PathBuf,
}

impl OutputLayout {
    /// `png/`, `depth/` and `color/` below `root`
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        OutputLayout {
            png: root.join("png"),
            depth: root.join("depth"),
            color: root.join("color"),
        }
    }

    /// Create all three directories
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.png, &self.depth, &self.color] {
            fs::create_dir_all(dir).map_err(|e| CaptureError::io(dir, e))?;
        }
        Ok(())
    }

    /// Next sample index not used by any of the three directories
    pub fn next_session_index(&self) -> Result<u64> {
        next_session_index_across([&self.png, &self.depth, &self.color])
    }

    /// PNG path for a sample
    pub fn png_path(&self, index: u64) -> PathBuf {
        self.png.join(format!("{}.png", index))
    }

    /// Depth CSV prefix for a sample; the frame number is appended on write
    pub fn depth_prefix(&self, index: u64) -> PathBuf {
        self.depth.join(index.to_string())
    }

    /// Color CSV prefix for a sample; the frame number is appended on write
    pub fn color_prefix(&self, index: u64) -> PathBuf {
        self.color.join(index.to_string())
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        OutputLayout::under(DEFAULT_OUTPUT_ROOT)
    }
}

/// Parameters of a capture run
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Frame sets discarded before sampling starts
    pub warmup_frames: u32,
    /// Persist every `sample_interval`th frame set
    pub sample_interval: u64,
    /// Where artifacts go
    pub output: OutputLayout,
    /// Per-wait timeout; `None` blocks forever
    pub wait_timeout: Option<Duration>,
    /// Stop after this many streaming iterations; `None` runs until stopped
    pub max_iterations: Option<u64>,
    /// Stream written as the PNG snapshot
    pub photo_stream: StreamKind,
    /// Used when the snapshot stream is depth
    pub colorizer: Colorizer,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            warmup_frames: DEFAULT_WARMUP_FRAMES,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            output: OutputLayout::default(),
            wait_timeout: Some(DEFAULT_WAIT_TIMEOUT),
            max_iterations: None,
            photo_stream: StreamKind::Color,
            colorizer: Colorizer::default(),
        }
    }
}

impl CaptureConfig {
    /// Write below `root` instead of the default location
    pub fn with_output_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.output = OutputLayout::under(root);
        self
    }

    /// Set the number of warm-up frames
    pub fn with_warmup_frames(mut self, frames: u32) -> Self {
        self.warmup_frames = frames;
        self
    }

    /// Set the sampling interval
    pub fn with_sample_interval(mut self, interval: u64) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Set the per-wait timeout
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Bound the number of streaming iterations
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Choose which stream becomes the PNG snapshot
    pub fn with_photo_stream(mut self, stream: StreamKind) -> Self {
        self.photo_stream = stream;
        self
    }

    /// Replace the depth colorizer
    pub fn with_colorizer(mut self, colorizer: Colorizer) -> Self {
        self.colorizer = colorizer;
        self
    }

    /// Reject values the capture loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sample_interval == 0 {
            return Err(CaptureError::InvalidParameter(
                "sample interval must be at least 1".to_string(),
            ));
        }
        if self.wait_timeout == Some(Duration::ZERO) {
            return Err(CaptureError::InvalidParameter(
                "wait timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.warmup_frames, 30);
        assert_eq!(config.sample_interval, 100);
        assert_eq!(config.photo_stream, StreamKind::Color);
        assert_eq!(config.output.png, Path::new("./pictures/purplering/png"));
        assert!(config.max_iterations.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_artifact_paths() {
        let layout = OutputLayout::under("out");
        assert_eq!(layout.png_path(12), Path::new("out/png/12.png"));
        assert_eq!(layout.depth_prefix(12), Path::new("out/depth/12"));
        assert_eq!(layout.color_prefix(3), Path::new("out/color/3"));
    }

    #[test]
    fn test_prepare_creates_directories() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::under(dir.path().join("session"));
        layout.prepare().unwrap();
        assert!(layout.png.is_dir());
        assert!(layout.depth.is_dir());
        assert!(layout.color.is_dir());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = CaptureConfig::default().with_sample_interval(0);
        assert!(matches!(config.validate(), Err(CaptureError::InvalidParameter(_))));
    }
}
