//! Pipeline assembly from configuration.
//!
//! # Responsibilities
//! - Select the session store (redis or in-process)
//! - Compile access rules and the request log template
//! - Install stages in their fixed outer-to-inner order
//!
//! # Design Decisions
//! - A redis connection failure is logged and the in-process store is used
//! - The authorization gate exists only when security is enabled
//! - All compilation happens here, so requests never see a bad pattern

use std::time::Duration;

use crate::config::{AppConfig, SessionConfig};
use crate::http::static_contents::StaticContents;
use crate::observability::{ActionLogger, LogTemplate, RequestLogger};
use crate::pipeline::Pipeline;
use crate::routing::matcher::PatternError;
use crate::security::{AccessRules, AuthorizationGate};
use crate::session::{BackendKind, MemoryStore, RedisStore, SessionBackend, SessionBinding};

fn memory_backend(config: &SessionConfig) -> SessionBackend {
    let store = MemoryStore::new(Duration::from_secs(config.sweep_interval_secs));
    SessionBackend::new(BackendKind::Memory, store)
}

/// Pick the session store described by the configuration.
pub async fn select_backend(config: &SessionConfig) -> SessionBackend {
    if !config.redis.enabled {
        return memory_backend(config);
    }

    let address = format!("{}:{}", config.redis.host, config.redis.port);
    tracing::info!(address = %address, pool_size = config.redis.pool_size, "Trying redis connection");
    match RedisStore::connect(&config.redis).await {
        Ok(store) => {
            tracing::info!(address = %store.address(), "Redis connection established");
            SessionBackend::new(BackendKind::Redis, store)
        }
        Err(e) => {
            tracing::error!(
                address = %address,
                error = %e,
                "Redis connection failed, falling back to in-process session store"
            );
            memory_backend(config)
        }
    }
}

/// Build the request pipeline.
///
/// Stage order, outermost first: request log, action log, session binding,
/// authorization gate (if enabled), static contents (if enabled).
pub fn assemble(
    config: &AppConfig,
    backend: SessionBackend,
) -> Result<Pipeline, PatternError> {
    let gate = if config.security.enabled {
        Some(AuthorizationGate::new(AccessRules::compile(&config.security)?))
    } else {
        None
    };
    let static_contents = if config.static_contents.enabled {
        Some(StaticContents::new(&config.static_contents)?)
    } else {
        None
    };

    let mut builder = Pipeline::builder()
        .stage(RequestLogger::new(LogTemplate::parse(
            &config.logging.request_log_format,
        )))
        .stage(ActionLogger::new())
        .stage(SessionBinding::new(backend.clone(), &config.session));
    if let Some(gate) = gate {
        builder = builder.stage(gate);
    }
    if let Some(static_contents) = static_contents {
        tracing::info!(root = %config.static_contents.root, "Serving static contents");
        builder = builder.stage(static_contents);
    }

    let pipeline = builder.build();
    tracing::info!(
        stages = ?pipeline.stage_names(),
        session_backend = ?backend.kind(),
        security_enabled = config.security.enabled,
        "Request pipeline assembled"
    );
    Ok(pipeline)
}
