//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default request log line: client, identity, route, method and status.
pub const DEFAULT_REQUEST_LOG_FORMAT: &str =
    "${remote_ip} ${account_name} ${uri} ${method} ${status}";

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging settings, including the request log template.
    pub logging: LoggingConfig,

    /// Path-based access control.
    pub security: SecurityConfig,

    /// Session cookie and backend selection.
    pub session: SessionConfig,

    /// Static file serving.
    pub static_contents: StaticContentsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration applied by the host server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub level: String,

    /// Template for the per-request summary line.
    ///
    /// Recognized fields: `${remote_ip}`, `${account_name}`, `${uri}`,
    /// `${method}`, `${status}`. Anything else renders as an empty string.
    pub request_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            request_log_format: DEFAULT_REQUEST_LOG_FORMAT.to_string(),
        }
    }
}

/// Access control configuration.
///
/// Every entry is a regular expression searched anywhere in the request path.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Install the authorization gate.
    pub enabled: bool,

    /// Paths that require authorization at all.
    pub auth_paths: Vec<String>,

    /// Protected paths that are nevertheless open to everyone.
    pub exclude_paths: Vec<String>,

    /// Paths reachable by accounts with the `Admin` authority.
    pub admin_paths: Vec<String>,

    /// Paths reachable by accounts with the `User` authority.
    pub user_paths: Vec<String>,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session ID.
    pub cookie_name: String,

    /// Inactivity lifetime in seconds. Every save pushes both the cookie
    /// and the stored record this far into the future.
    pub max_age_secs: u64,

    /// Mark the cookie `Secure` (HTTPS only).
    pub secure: bool,

    /// How often the in-process store drops expired sessions, in seconds.
    pub sweep_interval_secs: u64,

    /// Distributed session store.
    pub redis: RedisConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            max_age_secs: 30 * 24 * 60 * 60,
            secure: false,
            sweep_interval_secs: 60,
            redis: RedisConfig::default(),
        }
    }
}

/// Redis connection settings for the distributed session store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Use redis instead of the in-process store.
    pub enabled: bool,

    pub host: String,

    pub port: u16,

    /// Number of multiplexed connections opened at startup.
    pub pool_size: usize,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 6379,
            pool_size: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// Connection URL in the form accepted by the redis client.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticContentsConfig {
    /// Install the static contents stage.
    pub enabled: bool,

    /// Directory served as the site root.
    pub root: String,

    /// Path pattern never served as a static file (e.g. the API docs path).
    pub exclude_path: Option<String>,
}

impl Default for StaticContentsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: "resources/public".to_string(),
            exclude_path: None,
        }
    }
}
