//! Logger module
//!
//! Thin facade over `tracing` so call sites read as plain operations:
//! - Server lifecycle logging
//! - Per-request target and access lines
//! - Error and warning logging
//!
//! Output is human-readable text on stdout.

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::routing::UpstreamTarget;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG`, when set,
/// takes precedence over `logging.level`.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Proxy server listening on :{}", addr.port());
    tracing::info!("Bind address: {addr}");
    tracing::info!("Region: {}", config.upstream.region);
    tracing::info!("Upstream domain: {}", config.upstream.domain);
    tracing::info!("Public cache max-age: {}s", config.cache.max_age);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!("======================================");
}

/// Log the computed upstream URL (query string omitted)
pub fn log_target(target: &UpstreamTarget, is_bucket: bool, presigned: bool) {
    let label = match (is_bucket, presigned) {
        (false, _) => "Root URL",
        (true, true) => "Presigned URL",
        (true, false) => "Public URL",
    };
    tracing::info!("{label}: {}", target.base_url());
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!("{}", entry.format(format));
}
