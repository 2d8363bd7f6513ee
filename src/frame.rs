use crate::{error::CaptureError, types::*};

/// Raw 16-bit depth frame
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: u32,
    height: u32,
    frame_number: u64,
    data: Vec<u16>,
}

impl DepthFrame {
    /// Create a depth frame from row-major samples
    pub fn new(width: u32, height: u32, frame_number: u64, data: Vec<u16>) -> crate::error::Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(CaptureError::InvalidFrame(format!(
                "depth {}x{} needs {} samples, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(DepthFrame {
            width,
            height,
            frame_number,
            data,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Device frame counter
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// All samples, row-major
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// Samples of row `y`, or None if out of bounds
    pub fn row(&self, y: u32) -> Option<&[u16]> {
        if y >= self.height {
            return None;
        }
        let offset = y as usize * self.width as usize;
        self.data.get(offset..offset + self.width as usize)
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u16]> {
        // chunks_exact panics on zero; an empty frame has no rows anyway
        self.data.chunks_exact(self.width.max(1) as usize)
    }

    /// Raw sample at (x, y)
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width {
            return None;
        }
        self.row(y).map(|row| row[x as usize])
    }
}

/// Interleaved 8-bit color frame
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFrame {
    width: u32,
    height: u32,
    frame_number: u64,
    format: PixelFormat,
    data: Vec<u8>,
}

impl ColorFrame {
    /// Create a color frame from tightly packed rows
    pub fn new(
        width: u32,
        height: u32,
        frame_number: u64,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> crate::error::Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(CaptureError::InvalidFrame(format!(
                "{:?} {}x{} needs {} bytes, got {}",
                format,
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(ColorFrame {
            width,
            height,
            frame_number,
            format,
            data,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Device frame counter
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Channel layout
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// All bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.stride().max(1))
    }

    /// Convert to tightly packed RGB24 bytes
    pub fn to_rgb24(&self) -> Vec<u8> {
        if self.format == PixelFormat::Rgb24 {
            return self.data.clone();
        }

        let bpp = self.format.bytes_per_pixel();
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(bpp) {
            if self.format.is_bgr() {
                rgb.extend_from_slice(&[px[2], px[1], px[0]]);
            } else {
                rgb.extend_from_slice(&px[..3]);
            }
        }
        rgb
    }
}

/// A single video frame of either stream
#[derive(Debug, Clone, PartialEq)]
pub enum VideoFrame {
    /// Depth stream frame
    Depth(DepthFrame),
    /// Color stream frame
    Color(ColorFrame),
}

impl VideoFrame {
    /// Stream this frame came from
    pub fn kind(&self) -> StreamKind {
        match self {
            VideoFrame::Depth(_) => StreamKind::Depth,
            VideoFrame::Color(_) => StreamKind::Color,
        }
    }

    /// Device frame counter
    pub fn frame_number(&self) -> u64 {
        match self {
            VideoFrame::Depth(f) => f.frame_number(),
            VideoFrame::Color(f) => f.frame_number(),
        }
    }

    /// Frame dimensions
    pub fn resolution(&self) -> Resolution {
        match self {
            VideoFrame::Depth(f) => Resolution { width: f.width(), height: f.height() },
            VideoFrame::Color(f) => Resolution { width: f.width(), height: f.height() },
        }
    }
}

/// Owned synchronized depth + color pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSet {
    /// Depth frame, if the stream delivered one
    pub depth: Option<DepthFrame>,
    /// Color frame, if the stream delivered one
    pub color: Option<ColorFrame>,
}

impl FrameSet {
    /// Frame of the requested stream
    pub fn frame(&self, kind: StreamKind) -> Option<VideoFrame> {
        match kind {
            StreamKind::Depth => self.depth.clone().map(VideoFrame::Depth),
            StreamKind::Color => self.color.clone().map(VideoFrame::Color),
        }
    }
}
