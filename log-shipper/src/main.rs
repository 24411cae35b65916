//! Log Shipper Main Entry Point
//!
//! Runs one handler standalone: JSON encoded log messages are read from stdin,
//! published on a local bus and indexed into OpenSearch.

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use log_shipper::config::EnvConfigSource;
use log_shipper::consumer::publish_lines;
use log_shipper::{Dependencies, HandlerContext, ShipperError};
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Handler name used when `LOG_SHIPPER_HANDLER` is not set.
const DEFAULT_HANDLER_NAME: &str = "handler_elasticsearch";

/// Number of events the local bus holds for a slow subscriber.
const BUS_CAPACITY: usize = 1024;

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), ShipperError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("log_shipper=info,log_shipper_repository=info"));

    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| ShipperError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "log-shipper",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        // Logs go to stderr so they never mix with piped input tooling.
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .try_init()
            .map_err(|e| ShipperError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "log-shipper",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ShipperError> {
    dotenv().ok();

    init_tracing()?;

    let handler_name =
        env::var("LOG_SHIPPER_HANDLER").unwrap_or_else(|_| DEFAULT_HANDLER_NAME.to_string());
    info!(handler = %handler_name, "Starting log shipper");

    let (bus_tx, bus_rx) = broadcast::channel(BUS_CAPACITY);
    let context = HandlerContext::new(
        handler_name,
        env!("CARGO_PKG_VERSION"),
        bus_rx,
        Arc::new(EnvConfigSource::new()),
    );

    let mut deps = match Dependencies::new(context).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    // The bridge owns the only sender, so end of input closes the bus.
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        match publish_lines(stdin, &bus_tx, BUS_CAPACITY).await {
            Ok(published) => info!(published = published, "Input exhausted"),
            Err(e) => error!(error = %e, "Failed to read input"),
        }
    });

    match deps.runner.run().await {
        Ok(()) => {
            info!("Log shipper completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Log shipper failed");
            Err(e.into())
        }
    }
}
