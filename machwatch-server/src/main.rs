//! MachWatch Server
//!
//! Runs the monitor loop and serves the REST API

use anyhow::Result;
use clap::Parser;
use machwatch_server::{
    api,
    config::Config,
    manager::{self, MonitorConfig},
    predictor::HttpPredictor,
    state::{self, SinkConfig, SinkType},
};
use machwatch_sim::DriftSimulator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting MachWatch Server");

    let predictor = HttpPredictor::new(config.predict_url.clone(), config.request_timeout())?;
    info!("Prediction service at {}", predictor.url());

    // Create application state
    let state = state::AppState::new(Arc::new(predictor));

    let machine_ids = config.machine_ids();
    anyhow::ensure!(!machine_ids.is_empty(), "at least one machine is required");

    let drift = config.drift_config();
    for (index, machine_id) in machine_ids.iter().enumerate() {
        let simulator = match config.seed {
            Some(seed) => DriftSimulator::with_seed(drift, seed.wrapping_add(index as u64)),
            None => DriftSimulator::new(drift),
        };
        state.register_machine(machine_id, Box::new(simulator)).await;
    }
    info!("Monitoring machines: {}", machine_ids.join(", "));

    if let Some(path) = &config.log_file {
        let mut sinks = state.sinks.write().await;
        sinks.push(SinkConfig {
            id: "prediction-log".to_string(),
            sink_type: SinkType::File {
                path: path.display().to_string(),
            },
        });
        info!("Writing prediction log to {}", path.display());
    }

    state.set_monitoring(!config.paused).await;

    // Build the router
    let app = api::create_router(state.clone());

    // Start monitor loop in background
    let cancel = CancellationToken::new();
    let monitor = tokio::spawn(manager::run(
        state.clone(),
        MonitorConfig {
            interval: config.interval(),
            fleet: config.fleet,
        },
        cancel.clone(),
    ));

    // Start server
    info!("Server listening on http://{}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    monitor.await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
