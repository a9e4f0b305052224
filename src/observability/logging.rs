//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick the level from `RUST_LOG`, falling back to the config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Request summary and action boundary lines go through the same subscriber

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter directive derived from the configured level.
pub fn default_directive(config: &LoggingConfig) -> String {
    format!(
        "session_gate={},tower_http=info,tower_sessions=warn",
        config.level
    )
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(config).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        let config = LoggingConfig {
            level: "debug".into(),
            ..Default::default()
        };
        let directive = default_directive(&config);
        assert_eq!(
            directive,
            "session_gate=debug,tower_http=info,tower_sessions=warn"
        );
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
