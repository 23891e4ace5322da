//! Start command - run the tracking daemon until interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::{info, warn};

use geowatch::config::TrackingConfig;
use geowatch::notify::StatusNotification;
use geowatch::service::TrackingService;
use geowatch::tracker::TrackingStatus;

use super::common::{build_providers, resolve_config, ConfigOverrides};
use crate::error::CliError;

/// Arguments for the start command.
#[derive(Debug, Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Minimum interval between fixes in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Minimum movement between fixes in meters
    #[arg(long, value_name = "METERS")]
    pub distance_m: Option<f64>,
}

/// Run the start command.
pub fn run(args: StartArgs) -> Result<(), CliError> {
    let (config_path, mut file) = resolve_config(&args.overrides)?;
    info!(path = %config_path.display(), "Configuration resolved");

    if let Some(interval) = args.interval_ms {
        file.tracking.min_interval_ms = interval;
    }
    if let Some(distance) = args.distance_m {
        file.tracking.min_distance_m = distance;
    }

    let tracking_config = TrackingConfig::from_config_file(&file);

    let runtime = tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;
    let providers = build_providers(&file, runtime.handle().clone())?;

    let sink = StatusNotification::new();
    let service = TrackingService::start(
        tracking_config,
        providers,
        Arc::new(sink.clone()),
        runtime.handle().clone(),
    );

    match service.activate() {
        TrackingStatus::PermissionDenied => {
            warn!("No provider authorized; grant access and restart to begin tracking")
        }
        TrackingStatus::Degraded => warn!("Tracking active in degraded mode"),
        status => info!(%status, "Tracking active"),
    }

    // Echo the notification content to the terminal - the CLI's stand-in
    // for a notification surface.
    let running = Arc::new(AtomicBool::new(true));
    let echo_running = Arc::clone(&running);
    let echo_sink = sink.clone();
    let echo = std::thread::spawn(move || {
        let mut last = None;
        while echo_running.load(Ordering::Relaxed) {
            let current = echo_sink.current();
            if current != last {
                if let Some(ref content) = current {
                    println!("[{}] {}", content.title, content.body);
                }
                last = current;
            }
            std::thread::sleep(Duration::from_millis(500));
        }
    });

    // Block until Ctrl-C, then shut down cleanly.
    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| CliError::Runtime(format!("failed to install signal handler: {}", e)))?;

    let _ = shutdown_rx.recv();
    info!("Interrupt received, stopping tracker");

    running.store(false, Ordering::Relaxed);
    let _ = echo.join();

    let store = service.store();
    service.shutdown();

    match store.current() {
        Some(reading) => println!("Last known position: {}", reading),
        None => println!("No position fix was received."),
    }

    Ok(())
}
