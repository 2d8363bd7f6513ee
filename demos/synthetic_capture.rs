//! Synthetic capture example
//!
//! Runs the full capture loop against generated frames, no camera needed.

use depthcap::{Capture, CaptureConfig, Persisted, Result, StreamKind, SyntheticSource};
use std::sync::atomic::AtomicBool;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("depthcap - Synthetic Capture Example");
    println!("====================================");

    let root = std::env::temp_dir().join("depthcap-demo");
    let config = CaptureConfig::default()
        .with_output_root(&root)
        .with_max_iterations(300)
        .with_photo_stream(StreamKind::Depth);

    let source = SyntheticSource::new(64, 48);
    let mut capture = Capture::new(source, config)?;
    println!("Session index: {}", capture.session());

    let summary = capture.run(&AtomicBool::new(true))?;
    for sample in &summary.samples {
        let written: Vec<_> = [&sample.photo, &sample.depth, &sample.color]
            .into_iter()
            .filter_map(Persisted::path)
            .collect();
        println!("Sample {} (frame {:?}): {:?}", sample.index, sample.frame_number, written);
    }

    println!();
    println!(
        "Captured {} samples over {} iterations into {}",
        summary.samples.len(),
        summary.iterations,
        root.display()
    );
    println!("Run again to continue numbering at {}", summary.session + summary.samples.len() as u64);

    Ok(())
}
