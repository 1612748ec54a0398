use std::{process::ExitCode, sync::Arc};

use store::JsonFileStore;
use todos::{
    config::{ServiceConfig, TransportRuntime},
    event_log::{DisabledEventLog, EventLog, FileEventLog},
    transport::{TodoRuntime, serve_http_with_workers},
};
use tracing_subscriber::EnvFilter;

/// Every exit path returns, so the event log writer is flushed on drop.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env();

    let events: Arc<dyn EventLog> = match config.log_path.as_deref() {
        Some(log_path) => match FileEventLog::spawn(log_path) {
            Ok(log) => Arc::new(log),
            Err(err) => {
                tracing::error!(
                    path = %log_path.display(),
                    error = %err,
                    "todos failed starting event log writer"
                );
                return ExitCode::FAILURE;
            }
        },
        None => Arc::new(DisabledEventLog),
    };

    let store = JsonFileStore::open(&config.data_path);
    let runtime = TodoRuntime::new(store, events);

    tracing::info!("todos data file: {}", config.data_path.display());
    match config.log_path.as_deref() {
        Some(log_path) => tracing::info!("todos event log: {}", log_path.display()),
        None => tracing::info!("todos event log: disabled"),
    }
    tracing::info!("todos transport workers: {}", config.http_workers);
    tracing::info!(
        "todos transport runtime: {}",
        config.transport_runtime.as_str()
    );

    let bind_addr = config.bind_addr.as_str();
    match config.transport_runtime {
        TransportRuntime::Std => {
            match serve_http_with_workers(runtime, bind_addr, config.http_workers) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    tracing::error!("todos transport failed on {bind_addr}: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        TransportRuntime::Axum => serve_axum(runtime, bind_addr, config.http_workers),
    }
}

#[cfg(feature = "async-transport")]
fn serve_axum(runtime: TodoRuntime, bind_addr: &str, workers: usize) -> ExitCode {
    match todos::transport_axum::serve_http_with_axum(runtime, bind_addr, workers) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("todos transport failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "async-transport"))]
fn serve_axum(runtime: TodoRuntime, _bind_addr: &str, _workers: usize) -> ExitCode {
    drop(runtime);
    tracing::error!("todos transport runtime 'axum' requires build feature 'async-transport'");
    ExitCode::from(2)
}
