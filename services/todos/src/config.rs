use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATA_PATH: &str = "todos.json";
pub const DEFAULT_LOG_PATH: &str = "logs.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportRuntime {
    Std,
    Axum,
}

impl TransportRuntime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Std => "std",
            Self::Axum => "axum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub data_path: PathBuf,
    /// `None` when event logging is switched off.
    pub log_path: Option<PathBuf>,
    pub http_workers: usize,
    pub transport_runtime: TransportRuntime,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = non_empty(lookup("TODOS_BIND")).unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let data_path = non_empty(lookup("TODOS_DATA_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let log_path = match non_empty(lookup("TODOS_LOG_PATH")) {
            Some(raw) if is_disabled(&raw) => None,
            Some(raw) => Some(PathBuf::from(raw)),
            None => Some(PathBuf::from(DEFAULT_LOG_PATH)),
        };
        let http_workers = parse_value::<usize>(lookup("TODOS_HTTP_WORKERS"))
            .filter(|workers| *workers > 0)
            .unwrap_or_else(default_http_workers);
        let transport_runtime = parse_transport_runtime(lookup("TODOS_TRANSPORT_RUNTIME"));
        Self {
            bind_addr,
            data_path,
            log_path,
            http_workers,
            transport_runtime,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_value<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = non_empty(value)?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(value = %raw, "ignoring invalid numeric configuration value");
            None
        }
    }
}

fn parse_transport_runtime(value: Option<String>) -> TransportRuntime {
    match non_empty(value).as_deref() {
        None | Some("std") => TransportRuntime::Std,
        Some("axum") => TransportRuntime::Axum,
        Some(other) => {
            tracing::warn!(
                value = %other,
                "ignoring unknown transport runtime, falling back to std"
            );
            TransportRuntime::Std
        }
    }
}

fn is_disabled(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "off" | "none" | "false" | "disabled"
    )
}

fn default_http_workers() -> usize {
    std::thread::available_parallelism()
        .map(|parallelism| parallelism.get().clamp(1, 32))
        .unwrap_or(4)
}
