//! Capture depth + color samples from the first RealSense camera into
//! `./pictures/purplering/{png,depth,color}/` until interrupted.

use depthcap::realsense::RealsenseProvider;
use depthcap::{Capture, CaptureConfig, CaptureError};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(running: &AtomicBool) -> depthcap::Result<()> {
    let config = CaptureConfig::default();
    let provider = RealsenseProvider::open_first()?;
    let mut capture = Capture::new(provider, config)?;
    let summary = capture.run(running)?;
    info!(
        "captured {} samples over {} iterations (session {})",
        summary.samples.len(),
        summary.iterations,
        summary.session
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nreceived ctrl+c, stopping...");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(&running) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CaptureError::Device {
            function,
            args,
            message,
        }) => {
            eprintln!("RealSense error calling {}({}):\n    {}", function, args, message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
