//! # depthcap - Depth Camera Frame Capture
//!
//! Pulls synchronized depth + color frame sets from a depth camera and
//! periodically writes them to disk as a PNG snapshot, a depth CSV and a
//! color CSV.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod error;
mod types;
mod frame;
mod source;
mod colorize;
mod session;
mod config;
mod persist;
mod capture;

#[cfg(feature = "realsense")]
pub mod realsense;

// Public re-exports
pub use error::{CaptureError, Result};
pub use types::*;
pub use frame::*;
pub use source::{FrameSource, Frames, SyntheticSource};
pub use colorize::{ColorizeMode, Colorizer};
pub use session::{next_session_index, next_session_index_across};
pub use config::*;
pub use persist::*;
pub use capture::{Capture, CaptureState, CaptureSummary, SampleRecord};
