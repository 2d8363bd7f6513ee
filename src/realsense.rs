//! Intel RealSense frame source

use crate::{error::*, frame, source::*, types::*};
use realsense_rust::{
    config::Config,
    context::Context,
    device::Device,
    frame::{ColorFrame, CompositeFrame, DepthFrame, FrameEx, PixelKind},
    kind::{Rs2CameraInfo, Rs2Format, Rs2Option, Rs2StreamKind},
    pipeline::{ActivePipeline, InactivePipeline},
};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

/// Frame rate requested for both streams
const STREAM_FPS: usize = 30;

/// Device-owned frame set; pixels are copied out only on request
pub struct RealsenseFrames(CompositeFrame);

impl Frames for RealsenseFrames {
    fn depth_frame(&self) -> Result<Option<frame::DepthFrame>> {
        match self.0.frames_of_type::<DepthFrame>().pop() {
            Some(depth) => copy_depth(&depth).map(Some),
            None => Ok(None),
        }
    }

    fn color_frame(&self) -> Result<Option<frame::ColorFrame>> {
        match self.0.frames_of_type::<ColorFrame>().pop() {
            Some(color) => copy_color(&color).map(Some),
            None => Ok(None),
        }
    }
}

/// Camera provider streaming synchronized depth + color from one device
pub struct RealsenseProvider {
    // Field order matters: the pipeline must drop before the context.
    pipeline: ActivePipeline,
    _context: Context,
    name: String,
    serial: String,
    depth_units: f32,
}

impl RealsenseProvider {
    /// Open the first enumerated device and start its depth and color streams
    pub fn open_first() -> Result<Self> {
        let context = Context::new().map_err(|e| CaptureError::device("rs2_create_context", "", e))?;
        let mut devices = context.query_devices(HashSet::new());
        if devices.is_empty() {
            return Err(CaptureError::NoDeviceFound);
        }
        let device = devices.remove(0);

        let name = camera_info(&device, Rs2CameraInfo::Name);
        let serial = camera_info(&device, Rs2CameraInfo::SerialNumber);
        let depth_units = read_depth_units(&device, &name)?;
        info!("using {} (serial {}), depth units {} m", name, serial, depth_units);

        let mut config = Config::new();
        if let Some(serial_cstr) = device.info(Rs2CameraInfo::SerialNumber) {
            config
                .enable_device_from_serial(serial_cstr)
                .and_then(|c| c.disable_all_streams())
                .map_err(|e| CaptureError::device("rs2_config_enable_device", serial.clone(), e))?;
        }
        config
            .enable_stream(Rs2StreamKind::Depth, None, 0, 0, Rs2Format::Z16, STREAM_FPS)
            .map_err(|e| CaptureError::device("rs2_config_enable_stream", "Depth, Z16", e))?;
        config
            .enable_stream(Rs2StreamKind::Color, None, 0, 0, Rs2Format::Rgb8, STREAM_FPS)
            .map_err(|e| CaptureError::device("rs2_config_enable_stream", "Color, RGB8", e))?;

        let pipeline = InactivePipeline::try_from(&context)
            .map_err(|e| CaptureError::device("rs2_create_pipeline", "", e))?;
        let pipeline = pipeline
            .start(Some(config))
            .map_err(|e| CaptureError::device("rs2_pipeline_start_with_config", serial.clone(), e))?;
        info!("streaming depth + color at {} fps", STREAM_FPS);

        Ok(RealsenseProvider {
            pipeline,
            _context: context,
            name,
            serial,
            depth_units,
        })
    }

    /// Device product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device serial number
    pub fn serial(&self) -> &str {
        &self.serial
    }
}

impl FrameSource for RealsenseProvider {
    type Frames = RealsenseFrames;

    fn depth_units(&self) -> f32 {
        self.depth_units
    }

    fn wait_for_frames(&mut self, timeout: Option<Duration>) -> Result<RealsenseFrames> {
        use realsense_rust::pipeline::FrameWaitError;

        match self.pipeline.wait(timeout) {
            Ok(frames) => Ok(RealsenseFrames(frames)),
            Err(FrameWaitError::DidTimeoutBeforeFrameArrival) => Err(CaptureError::Timeout),
            Err(e) => Err(CaptureError::device(
                "rs2_pipeline_wait_for_frames",
                format!("{:?}", timeout),
                e,
            )),
        }
    }
}

fn camera_info(device: &Device, info: Rs2CameraInfo) -> String {
    device
        .info(info)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Depth units from the first sensor, or the first one that reports them
fn read_depth_units(device: &Device, name: &str) -> Result<f32> {
    let sensors = device.sensors();
    if let Some(units) = sensors.first().and_then(|s| s.get_option(Rs2Option::DepthUnits)) {
        return Ok(units);
    }

    match sensors.iter().find_map(|s| s.get_option(Rs2Option::DepthUnits)) {
        Some(units) => {
            warn!("first sensor of {} has no depth units, using another sensor's", name);
            Ok(units)
        }
        None => Err(CaptureError::DepthUnitsUnavailable(name.to_string())),
    }
}

fn dimensions(width: usize, height: usize) -> Result<(u32, u32)> {
    let w = u32::try_from(width).map_err(|_| CaptureError::InvalidFrame(format!("width {}", width)))?;
    let h = u32::try_from(height).map_err(|_| CaptureError::InvalidFrame(format!("height {}", height)))?;
    Ok((w, h))
}

fn copy_depth(depth: &DepthFrame) -> Result<frame::DepthFrame> {
    let (width, height) = dimensions(depth.width(), depth.height())?;
    let mut data = Vec::with_capacity(depth.width() * depth.height());
    for row in 0..depth.height() {
        for col in 0..depth.width() {
            match depth.get(col, row) {
                Some(PixelKind::Z16 { depth }) => data.push(*depth),
                _ => {
                    return Err(CaptureError::InvalidFrame(format!(
                        "depth pixel ({}, {}) is not Z16",
                        col, row
                    )))
                }
            }
        }
    }
    frame::DepthFrame::new(width, height, depth.frame_number(), data)
}

fn copy_color(color: &ColorFrame) -> Result<frame::ColorFrame> {
    let (width, height) = dimensions(color.width(), color.height())?;
    let mut format = None;
    let mut data = Vec::with_capacity(color.width() * color.height() * 3);

    for row in 0..color.height() {
        for col in 0..color.width() {
            let px_format = match color.get(col, row) {
                Some(PixelKind::Rgb8 { r, g, b }) => {
                    data.extend_from_slice(&[*r, *g, *b]);
                    PixelFormat::Rgb24
                }
                Some(PixelKind::Bgr8 { b, g, r }) => {
                    data.extend_from_slice(&[*b, *g, *r]);
                    PixelFormat::Bgr24
                }
                Some(PixelKind::Rgba8 { r, g, b, a }) => {
                    data.extend_from_slice(&[*r, *g, *b, *a]);
                    PixelFormat::Rgba32
                }
                Some(PixelKind::Bgra8 { b, g, r, a }) => {
                    data.extend_from_slice(&[*b, *g, *r, *a]);
                    PixelFormat::Bgra32
                }
                _ => {
                    return Err(CaptureError::InvalidFrame(format!(
                        "color pixel ({}, {}) has an unsupported format",
                        col, row
                    )))
                }
            };
            format.get_or_insert(px_format);
        }
    }

    frame::ColorFrame::new(
        width,
        height,
        color.frame_number(),
        format.unwrap_or(PixelFormat::Rgb24),
        data,
    )
}
