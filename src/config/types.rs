// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
///
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    pub routes: RoutesConfig,
    pub performance: PerformanceConfig,
}

/// Listening socket and runtime sizing
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Object storage backend addressing
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Region selector, first label of every upstream host (e.g. `nbg1`)
    pub region: String,
    /// Base domain shared by all regions
    pub domain: String,
    /// Use inbound `X-Forwarded-For` / `X-Real-IP` when deriving the client IP
    pub trust_forwarded_headers: bool,
}

/// Cache-Control tuning for public bucket responses
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// `max-age` in seconds
    pub max_age: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, or custom pattern)
    pub access_log_format: String,
}

/// Fixed endpoints answered locally
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    pub favicon_path: String,
    pub health_path: String,
}

/// Connection handling
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
}
