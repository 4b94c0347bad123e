//! WiFi Surveyor - Main Entry Point
//! Polls the platform WiFi scanner and serves the results over JSON-RPC

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::SurveyorConfig;
use surveyor_api_rpc::{RpcServer, RpcServerConfig};
use surveyor_core::application::SignalService;
use surveyor_core::port::time_provider::SystemTimeProvider;
use surveyor_infra_system::{ProcessCommandRunner, TokioProcessLauncher};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "wifi_surveyor=info,surveyor=info";
const LOG_FILE_PREFIX: &str = "wifi-surveyor.log";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Install the global subscriber
///
/// The returned guard flushes the file writer and must outlive `main`'s work.
fn init_logging() -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var("SURVEYOR_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    // Optional daily-rolling JSON file next to the console output
    let (file_layer, guard) = match std::env::var_os("SURVEYOR_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match log_format.as_str() {
        "json" => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer().pretty()).init(),
    }

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    let _log_guard = init_logging()?;

    info!("WiFi Surveyor v{} starting...", VERSION);

    // 2. Configuration
    let config = SurveyorConfig::load().context("Failed to load configuration")?;
    let platform = config.platform()?;
    let command = config.scan_command(platform);

    info!(
        platform = %platform,
        command = %command,
        poll_interval_ms = config.poll_interval_ms,
        command_timeout_ms = config.command_timeout_ms,
        "Configuration loaded"
    );

    // 3. Wiring
    let launcher = Arc::new(TokioProcessLauncher::new());
    let runner =
        Arc::new(ProcessCommandRunner::new(launcher).with_timeout(config.command_timeout()));
    let service = Arc::new(
        SignalService::new(
            runner,
            platform.parser(),
            command,
            Arc::new(SystemTimeProvider),
        )
        .with_poll_interval(config.poll_interval()),
    );

    // 4. Start polling
    service.start();

    let mut updates = service.subscribe();
    let status_logger = tokio::spawn(async move {
        let mut last_status = String::new();
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.status != last_status {
                info!(
                    status = %snapshot.status,
                    signal_count = snapshot.signals.len(),
                    "Scan status changed"
                );
                last_status = snapshot.status.clone();
            }
        }
    });

    // 5. JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, service.clone())
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(address = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    if tokio::time::timeout(SHUTDOWN_GRACE, service.stop())
        .await
        .is_err()
    {
        tracing::warn!("Signal polling did not stop in time");
    }
    status_logger.abort();

    info!("Shutdown complete.");

    Ok(())
}
