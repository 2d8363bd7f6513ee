//! Error handling for depthcap

use std::path::PathBuf;
use thiserror::Error;

/// Error types for capture operations
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No depth camera device found
    #[error("No depth camera device found")]
    NoDeviceFound,

    /// A device SDK call failed
    #[error("{function}({args}): {message}")]
    Device {
        /// Name of the SDK function that failed
        function: &'static str,
        /// Arguments passed to the failing function
        args: String,
        /// Message reported by the SDK
        message: String,
    },

    /// Depth unit option not reported by any sensor
    #[error("Depth units not reported by device {0}")]
    DepthUnitsUnavailable(String),

    /// Waiting for a frame set timed out
    #[error("Timed out waiting for frames")]
    Timeout,

    /// Frame buffer does not match its declared geometry
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Invalid configuration value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// File operation failed
    #[error("File operation failed on {}: {source}", .path.display())]
    Io {
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed
    #[error("Image encoding failed for {}: {source}", .path.display())]
    Image {
        /// Path of the image being written
        path: PathBuf,
        /// Underlying encoder error
        #[source]
        source: image::ImageError,
    },
}

impl CaptureError {
    /// Build a device error from any SDK error value.
    pub fn device(function: &'static str, args: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CaptureError::Device {
            function,
            args: args.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CaptureError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the camera SDK rather than the host.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            CaptureError::Device { .. } | CaptureError::NoDeviceFound | CaptureError::DepthUnitsUnavailable(_)
        )
    }
}

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;
