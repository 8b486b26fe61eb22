use faultline::{FaultConfig, FaultInjector, ImageFaultKind};
use std::collections::HashSet;
use tracing_subscriber::prelude::*;

/// A toy worker loop that pulls fake image jobs through every fault
/// decision point. Run with `cargo run --example simulated_worker`; set
/// `RUST_LOG=faultline=debug` to see the injection logs.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faultline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();

    println!("Simulated Worker Demo");
    println!("=====================");

    // Moderate rates so a 50-job batch shows a mix of outcomes, plus one
    // image that always fails.
    let injector = FaultInjector::new(FaultConfig {
        enabled: true,
        worker_crash_rate: 0.02,
        network_error_rate: 0.10,
        corrupt_image_rate: 0.10,
        image_404_rate: 0.10,
        transient_error_rate: 0.15,
        permanent_error_images: HashSet::from(["0042.jpg".to_string()]),
    });

    println!("\n1. Processing a batch of 50 jobs:");
    let mut completed = 0;
    let mut requeued = 0;
    let mut failed = 0;
    let mut crashed = false;

    for job_id in 1..=50u32 {
        let image_url = format!("https://example.com/images/{job_id:04}.jpg");

        if injector.maybe_crash_worker("processing batch").is_crash() {
            // A real worker would exit here and let its supervisor restart
            // it. The demo just stops pulling jobs.
            println!("   job {job_id:04}: worker crashed, abandoning batch");
            crashed = true;
            break;
        }

        if injector.maybe_network_error("fetch job payload") {
            let err = injector.network_error("fetch job payload");
            println!("   job {job_id:04}: {err} (retryable: {})", err.is_retryable());
            requeued += 1;
            continue;
        }

        if injector.maybe_image_404(&image_url) {
            let err = injector.image_error(&image_url, ImageFaultKind::NotFound);
            println!("   job {job_id:04}: {err}");
            failed += 1;
            continue;
        }

        if injector.maybe_corrupt_image(&image_url) {
            let data = injector.corrupt_image_data();
            let err = injector.image_error(&image_url, ImageFaultKind::Corrupt);
            println!("   job {job_id:04}: {err} ({} garbage bytes)", data.len());
            failed += 1;
            continue;
        }

        if injector.maybe_transient_error("store result") {
            println!("   job {job_id:04}: transient store failure, re-queueing");
            requeued += 1;
            continue;
        }

        completed += 1;
    }

    println!("\n2. Batch outcome:");
    println!("   completed: {completed}");
    println!("   requeued:  {requeued}");
    println!("   failed:    {failed}");
    println!("   crashed:   {crashed}");

    // 0042.jpg is on the permanent-failure list, so it fails on every
    // attempt regardless of the rates.
    println!("\n3. Retrying the permanently failing image 3 times:");
    let stuck_url = "https://example.com/images/0042.jpg";
    for attempt in 1..=3 {
        if injector.maybe_image_404(stuck_url) {
            let err = injector.image_error(stuck_url, ImageFaultKind::NotFound);
            println!("   attempt {attempt}: {err} (retryable: {})", err.is_retryable());
        } else {
            println!("   attempt {attempt}: downloaded (unexpected!)");
        }
    }

    println!("\n4. Configured rates:");
    injector.log_statistics();

    println!("\nDemo completed!");
    Ok(())
}
