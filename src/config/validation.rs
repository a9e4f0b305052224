//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every path pattern so a bad regex fails startup, not a request
//! - Validate value ranges (pool size > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::routing::matcher::PathMatcher;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("{field} contains an invalid pattern: {message}")]
    InvalidPattern { field: &'static str, message: String },

    #[error("logging.request_log_format must not be empty")]
    EmptyLogFormat,

    #[error("session.cookie_name must not be empty")]
    EmptyCookieName,

    #[error("session.max_age_secs must be greater than zero")]
    ZeroSessionAge,

    #[error("session.sweep_interval_secs must be greater than zero")]
    ZeroSweepInterval,

    #[error("session.redis.port must be greater than zero")]
    ZeroRedisPort,

    #[error("session.redis.pool_size must be greater than zero")]
    ZeroPoolSize,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.logging.request_log_format.trim().is_empty() {
        errors.push(ValidationError::EmptyLogFormat);
    }

    let security = &config.security;
    for (field, patterns) in [
        ("security.auth_paths", &security.auth_paths),
        ("security.exclude_paths", &security.exclude_paths),
        ("security.admin_paths", &security.admin_paths),
        ("security.user_paths", &security.user_paths),
    ] {
        check_patterns(field, patterns, &mut errors);
    }

    if let Some(path) = &config.static_contents.exclude_path {
        check_patterns(
            "static_contents.exclude_path",
            std::slice::from_ref(path),
            &mut errors,
        );
    }

    let session = &config.session;
    if session.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }
    if session.max_age_secs == 0 {
        errors.push(ValidationError::ZeroSessionAge);
    }
    if session.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }
    if session.redis.enabled {
        if session.redis.port == 0 {
            errors.push(ValidationError::ZeroRedisPort);
        }
        if session.redis.pool_size == 0 {
            errors.push(ValidationError::ZeroPoolSize);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_patterns(field: &'static str, patterns: &[String], errors: &mut Vec<ValidationError>) {
    if let Err(e) = PathMatcher::compile(patterns) {
        errors.push(ValidationError::InvalidPattern {
            field,
            message: e.to_string(),
        });
    }
}
