//! The capture loop: warm-up, then periodic sampling of frame sets

use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use crate::persist::{self, Persisted};
use crate::source::{FrameSource, Frames};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, info_span, warn};

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Discarding frames while exposure settles
    Warmup {
        /// Frame sets still to discard
        remaining: u32,
    },
    /// Sampling every Nth frame set
    Streaming {
        /// Streaming iterations completed
        iteration: u64,
    },
    /// Loop has returned
    Stopped,
}

/// Files written for one persisted frame set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    /// Sample index used in the file names
    pub index: u64,
    /// Streaming iteration the sample was taken at
    pub iteration: u64,
    /// Device frame number, from the depth frame when present
    pub frame_number: Option<u64>,
    /// Depth CSV outcome
    pub depth: Persisted,
    /// Color CSV outcome
    pub color: Persisted,
    /// PNG snapshot outcome
    pub photo: Persisted,
}

/// What a finished run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// First sample index of this run
    pub session: u64,
    /// Frame sets discarded during warm-up
    pub warmup_frames: u32,
    /// Streaming iterations completed
    pub iterations: u64,
    /// Waits that timed out
    pub timeouts: u64,
    /// Persisted samples, in order
    pub samples: Vec<SampleRecord>,
}

/// Capture loop over a frame source
pub struct Capture<S: FrameSource> {
    source: S,
    config: CaptureConfig,
    session: u64,
    state: CaptureState,
}

impl<S: FrameSource> Capture<S> {
    /// Validate `config`, create the output directories and pick the session index.
    pub fn new(source: S, config: CaptureConfig) -> Result<Self> {
        config.validate()?;
        config.output.prepare()?;
        let session = config.output.next_session_index()?;
        info!(
            "session {} writing to {}",
            session,
            config.output.png.parent().unwrap_or(&config.output.png).display()
        );

        let state = CaptureState::Warmup {
            remaining: config.warmup_frames,
        };
        Ok(Capture {
            source,
            config,
            session,
            state,
        })
    }

    /// First sample index this run will use
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Current loop state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Borrow the frame source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give back the frame source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Run until `running` is cleared or the iteration limit is hit.
    ///
    /// Timed-out waits are logged and retried. Any other error ends the run.
    pub fn run(&mut self, running: &AtomicBool) -> Result<CaptureSummary> {
        let _span = info_span!("capture", session = self.session).entered();
        let mut summary = CaptureSummary {
            session: self.session,
            ..Default::default()
        };

        let result = self.run_inner(running, &mut summary);
        self.state = CaptureState::Stopped;
        result.map(|_| summary)
    }

    fn run_inner(&mut self, running: &AtomicBool, summary: &mut CaptureSummary) -> Result<()> {
        let timeout = self.config.wait_timeout;

        while let CaptureState::Warmup { remaining } = self.state {
            if remaining == 0 {
                self.state = CaptureState::Streaming { iteration: 0 };
                break;
            }
            if !running.load(Ordering::Relaxed) {
                return Ok(());
            }
            match self.source.wait_for_frames(timeout) {
                Ok(_) => {
                    summary.warmup_frames += 1;
                    self.state = CaptureState::Warmup { remaining: remaining - 1 };
                }
                Err(CaptureError::Timeout) => {
                    warn!("timed out waiting for frames during warm-up");
                    summary.timeouts += 1;
                }
                Err(e) => return Err(e),
            }
        }
        info!("warm-up done after {} frame sets", summary.warmup_frames);

        let interval = self.config.sample_interval;
        while let CaptureState::Streaming { iteration } = self.state {
            if !running.load(Ordering::Relaxed) {
                info!("stop requested after {} iterations", iteration);
                break;
            }
            if self.config.max_iterations.is_some_and(|max| iteration >= max) {
                break;
            }

            let frames = match self.source.wait_for_frames(timeout) {
                Ok(frames) => frames,
                Err(CaptureError::Timeout) => {
                    warn!("timed out waiting for frames");
                    summary.timeouts += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!("Iteration: {}", iteration % interval);
            if iteration % interval == 0 {
                let index = self.session.checked_add(iteration / interval).ok_or_else(|| {
                    CaptureError::InvalidParameter(format!(
                        "sample index overflows after session {} iteration {}",
                        self.session, iteration
                    ))
                })?;
                let record = self.persist_sample(&frames, index, iteration)?;
                summary.samples.push(record);
            }

            summary.iterations = iteration + 1;
            self.state = CaptureState::Streaming {
                iteration: iteration + 1,
            };
        }

        Ok(())
    }

    fn persist_sample(&self, frames: &S::Frames, index: u64, iteration: u64) -> Result<SampleRecord> {
        let set = frames.to_frame_set()?;
        let depth_units = self.source.depth_units();
        let output = &self.config.output;

        let depth = persist::save_depth_csv(output.depth_prefix(index), set.depth.as_ref(), depth_units)?;
        let color = persist::save_color_csv(output.color_prefix(index), set.color.as_ref())?;
        let photo = persist::save_photo(
            output.png_path(index),
            set.frame(self.config.photo_stream).as_ref(),
            &self.config.colorizer,
            depth_units,
            self.config.photo_stream,
        )?;

        let frame_number = set
            .depth
            .as_ref()
            .map(|f| f.frame_number())
            .or_else(|| set.color.as_ref().map(|f| f.frame_number()));

        Ok(SampleRecord {
            index,
            iteration,
            frame_number,
            depth,
            color,
            photo,
        })
    }
}
