use crate::error::{CaptureError, Result};
use crate::frame::{ColorFrame, DepthFrame};
use crate::types::PixelFormat;
use std::cmp::Ordering;

/// Jet gradient control points, near to far
const JET: [[u8; 3]; 5] = [[0, 0, 255], [0, 255, 255], [255, 255, 0], [255, 0, 0], [50, 0, 0]];

/// How depth values are spread over the gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorizeMode {
    /// Cumulative histogram of the frame, so every depth band gets contrast
    HistogramEqualization,
    /// Linear mapping of a fixed distance window in meters
    FixedRange {
        /// Distance mapped to the near end of the gradient
        min_distance: f32,
        /// Distance mapped to the far end of the gradient
        max_distance: f32,
    },
}

/// Depth to RGB colorizer
#[derive(Debug, Clone)]
pub struct Colorizer {
    mode: ColorizeMode,
}

impl Default for Colorizer {
    fn default() -> Self {
        Colorizer {
            mode: ColorizeMode::HistogramEqualization,
        }
    }
}

impl Colorizer {
    /// Create a colorizer with the given mode
    pub fn new(mode: ColorizeMode) -> Result<Self> {
        if let ColorizeMode::FixedRange {
            min_distance,
            max_distance,
        } = mode
        {
            if min_distance.partial_cmp(&max_distance) != Some(Ordering::Less) {
                return Err(CaptureError::InvalidParameter(format!(
                    "colorizer range {}..{} is empty",
                    min_distance, max_distance
                )));
            }
        }
        Ok(Colorizer { mode })
    }

    /// Current mode
    pub fn mode(&self) -> ColorizeMode {
        self.mode
    }

    /// Map a depth frame to an RGB24 frame of the same size and frame number.
    ///
    /// Zero samples carry no depth and stay black.
    pub fn process(&self, depth: &DepthFrame, depth_units: f32) -> Result<ColorFrame> {
        let mut rgb = Vec::with_capacity(depth.data().len() * 3);

        match self.mode {
            ColorizeMode::HistogramEqualization => {
                let cumulative = cumulative_histogram(depth.data());
                let total = cumulative[u16::MAX as usize].max(1) as f32;
                for &d in depth.data() {
                    if d == 0 {
                        rgb.extend_from_slice(&[0, 0, 0]);
                    } else {
                        rgb.extend_from_slice(&jet(cumulative[d as usize] as f32 / total));
                    }
                }
            }
            ColorizeMode::FixedRange {
                min_distance,
                max_distance,
            } => {
                let span = max_distance - min_distance;
                for &d in depth.data() {
                    if d == 0 {
                        rgb.extend_from_slice(&[0, 0, 0]);
                    } else {
                        let meters = d as f32 * depth_units;
                        rgb.extend_from_slice(&jet((meters - min_distance) / span));
                    }
                }
            }
        }

        ColorFrame::new(depth.width(), depth.height(), depth.frame_number(), PixelFormat::Rgb24, rgb)
    }
}

/// Running count of non-zero samples at or below each depth value
fn cumulative_histogram(samples: &[u16]) -> Vec<u32> {
    let mut hist = vec![0u32; u16::MAX as usize + 1];
    for &d in samples.iter().filter(|&&d| d != 0) {
        hist[d as usize] += 1;
    }
    for i in 1..hist.len() {
        hist[i] += hist[i - 1];
    }
    hist
}

/// Sample the jet gradient at `t` in [0, 1]
fn jet(t: f32) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (JET.len() - 1) as f32;
    let i = (pos.floor() as usize).min(JET.len() - 2);
    let frac = pos - i as f32;

    let (lo, hi) = (JET[i], JET[i + 1]);
    let mut out = [0u8; 3];
    for c in 0..3 {
        let v = lo[c] as f32 + (hi[c] as f32 - lo[c] as f32) * frac;
        out[c] = v.round() as u8;
    }
    out
}
