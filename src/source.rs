//! Frame sources for the capture loop

use crate::{error::*, frame::*, types::*};
use std::time::Duration;

/// A synchronized set of frames as delivered by a source.
///
/// Implementations may hold SDK-owned buffers and only copy pixels out
/// when asked, so dropped frame sets cost nothing beyond the wait.
pub trait Frames {
    /// Copy out the depth frame, if present
    fn depth_frame(&self) -> Result<Option<DepthFrame>>;

    /// Copy out the color frame, if present
    fn color_frame(&self) -> Result<Option<ColorFrame>>;

    /// Copy out both frames
    fn to_frame_set(&self) -> Result<FrameSet> {
        Ok(FrameSet {
            depth: self.depth_frame()?,
            color: self.color_frame()?,
        })
    }
}

impl Frames for FrameSet {
    fn depth_frame(&self) -> Result<Option<DepthFrame>> {
        Ok(self.depth.clone())
    }

    fn color_frame(&self) -> Result<Option<ColorFrame>> {
        Ok(self.color.clone())
    }
}

/// Produces a sequence of synchronized depth + color frame sets
pub trait FrameSource {
    /// Frame set type returned by [`FrameSource::wait_for_frames`]
    type Frames: Frames;

    /// Meters per raw depth count
    fn depth_units(&self) -> f32;

    /// Block until the next frame set arrives.
    ///
    /// `None` waits forever. An elapsed timeout returns [`CaptureError::Timeout`].
    fn wait_for_frames(&mut self, timeout: Option<Duration>) -> Result<Self::Frames>;
}

/// Hardware-free source generating deterministic test patterns
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    resolution: Resolution,
    depth_units: f32,
    color_format: PixelFormat,
    next_frame_number: u64,
    waits: u64,
    timeout_every: Option<u64>,
}

impl SyntheticSource {
    /// Create a source producing frames of the given size
    pub fn new(width: u32, height: u32) -> Self {
        SyntheticSource {
            resolution: Resolution { width, height },
            depth_units: 0.001,
            color_format: PixelFormat::Rgb24,
            next_frame_number: 0,
            waits: 0,
            timeout_every: None,
        }
    }

    /// Override the reported depth unit
    pub fn with_depth_units(mut self, depth_units: f32) -> Self {
        self.depth_units = depth_units;
        self
    }

    /// Override the color layout
    pub fn with_color_format(mut self, format: PixelFormat) -> Self {
        self.color_format = format;
        self
    }

    /// Make every `n`th wait time out instead of delivering frames
    pub fn with_timeout_every(mut self, n: u64) -> Self {
        self.timeout_every = Some(n).filter(|&n| n > 0);
        self
    }

    /// Number of wait calls so far, including timed-out ones
    pub fn waits(&self) -> u64 {
        self.waits
    }

    /// Number of frame sets delivered so far
    pub fn frames_delivered(&self) -> u64 {
        self.next_frame_number
    }

    fn depth_pattern(&self, frame_number: u64) -> Vec<u16> {
        let Resolution { width, height } = self.resolution;
        let mut data = Vec::with_capacity(self.resolution.pixel_count());
        for y in 0..height {
            for x in 0..width {
                // A ramp that shifts with the frame counter; every 8th column reads as "no data".
                let value = if x % 8 == 7 {
                    0
                } else {
                    500 + x as u64 * 4 + y as u64 * 2 + frame_number % 256
                };
                data.push(value.min(u16::MAX as u64) as u16);
            }
        }
        data
    }

    fn color_pattern(&self, frame_number: u64) -> Vec<u8> {
        let Resolution { width, height } = self.resolution;
        let bpp = self.color_format.bytes_per_pixel();
        let mut data = Vec::with_capacity(self.resolution.pixel_count() * bpp);
        for y in 0..height {
            for x in 0..width {
                let r = (x.wrapping_mul(255) / width.max(1)) as u8;
                let g = (y.wrapping_mul(255) / height.max(1)) as u8;
                let b = (frame_number % 256) as u8;
                let (c0, c2) = if self.color_format.is_bgr() { (b, r) } else { (r, b) };
                data.extend_from_slice(&[c0, g, c2]);
                if self.color_format.has_alpha() {
                    data.push(u8::MAX);
                }
            }
        }
        data
    }
}

impl FrameSource for SyntheticSource {
    type Frames = FrameSet;

    fn depth_units(&self) -> f32 {
        self.depth_units
    }

    fn wait_for_frames(&mut self, _timeout: Option<Duration>) -> Result<FrameSet> {
        self.waits += 1;
        if let Some(n) = self.timeout_every {
            if self.waits % n == 0 {
                return Err(CaptureError::Timeout);
            }
        }

        let frame_number = self.next_frame_number;
        self.next_frame_number += 1;

        let Resolution { width, height } = self.resolution;
        Ok(FrameSet {
            depth: Some(DepthFrame::new(width, height, frame_number, self.depth_pattern(frame_number))?),
            color: Some(ColorFrame::new(
                width,
                height,
                frame_number,
                self.color_format,
                self.color_pattern(frame_number),
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_frame_numbers_increase() {
        let mut source = SyntheticSource::new(4, 3);
        let first = source.wait_for_frames(None).unwrap();
        let second = source.wait_for_frames(None).unwrap();
        assert_eq!(first.depth.as_ref().unwrap().frame_number(), 0);
        assert_eq!(second.color.as_ref().unwrap().frame_number(), 1);
        assert_eq!(source.frames_delivered(), 2);
    }

    #[test]
    fn test_synthetic_timeouts() {
        let mut source = SyntheticSource::new(2, 2).with_timeout_every(3);
        assert!(source.wait_for_frames(None).is_ok());
        assert!(source.wait_for_frames(None).is_ok());
        assert!(matches!(source.wait_for_frames(None), Err(CaptureError::Timeout)));
        assert_eq!(source.waits(), 3);
        assert_eq!(source.frames_delivered(), 2);
    }

    #[test]
    fn test_synthetic_bgra_layout() {
        let mut source = SyntheticSource::new(3, 2).with_color_format(PixelFormat::Bgra32);
        let set = source.wait_for_frames(None).unwrap();
        let color = set.color_frame().unwrap().unwrap();
        assert_eq!(color.pixel_format(), PixelFormat::Bgra32);
        assert_eq!(color.data().len(), 3 * 2 * 4);
    }
}
