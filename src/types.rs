/// Pixel layout of a color frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit R, G, B
    Rgb24,
    /// 8-bit B, G, R
    Bgr24,
    /// 8-bit R, G, B, A
    Rgba32,
    /// 8-bit B, G, R, A
    Bgra32,
}

impl PixelFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 3,
            PixelFormat::Rgba32 | PixelFormat::Bgra32 => 4,
        }
    }

    /// Whether the first channel is blue
    pub fn is_bgr(self) -> bool {
        matches!(self, PixelFormat::Bgr24 | PixelFormat::Bgra32)
    }

    /// Whether pixels carry an alpha channel
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba32 | PixelFormat::Bgra32)
    }
}

/// Stream of a synchronized frame set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// 16-bit depth samples
    Depth,
    /// 8-bit color image
    Color,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Depth => write!(f, "Depth"),
            StreamKind::Color => write!(f, "Color"),
        }
    }
}

/// Resolution structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Number of pixels in one image
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
