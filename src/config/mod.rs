// Configuration module entry point
// Loads the process-wide configuration and holds shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::Config;

/// Environment variables honoured for compatibility with existing deployments,
/// mapped onto their configuration keys.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("HETZNER_REGION", "upstream.region"),
    ("PORT", "server.port"),
    ("CACHE_AGE", "cache.max_age"),
];

impl Config {
    /// Load configuration from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: defaults, the file, `PROXY_*` variables
    /// (`PROXY_UPSTREAM__REGION`), then the legacy variables in [`LEGACY_ENV`].
    /// Empty legacy variables count as unset.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PROXY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("upstream.region", "nbg1")?
            .set_default("upstream.domain", "your-objectstorage.com")?
            .set_default("upstream.trust_forwarded_headers", true)?
            .set_default("cache.max_age", 2_629_800)? // ~1 month
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("routes.favicon_path", "/favicon.ico")?
            .set_default("routes.health_path", "/_internal/health")?
            .set_default("performance.keep_alive", true)?;

        for (var, key) in LEGACY_ENV {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would produce unusable upstream hostnames
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !is_dns_label(&self.upstream.region) {
            return Err(config::ConfigError::Message(format!(
                "upstream.region '{}' is not a valid DNS label",
                self.upstream.region
            )));
        }
        if self.upstream.domain.is_empty() || !self.upstream.domain.split('.').all(is_dns_label) {
            return Err(config::ConfigError::Message(format!(
                "upstream.domain '{}' is not a valid domain name",
                self.upstream.domain
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Lowercase alphanumeric label of 1..=63 chars with interior hyphens only
fn is_dns_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
