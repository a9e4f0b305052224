//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Assemble the request pipeline from configuration
//! - Wrap application routes with the pipeline
//! - Wire up host-level middleware (tracing, timeout, request ID)
//!
//! # Design Decisions
//! - The request timeout wraps only the routed handlers, inside every
//!   pipeline stage, so a timed-out request still reaches the logging stages
//!   as a 408 response
//! - Bind server to listener and shut down gracefully

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::X_REQUEST_ID;
use crate::lifecycle::signals::shutdown_signal;
use crate::pipeline::{self, Pipeline};
use crate::routing::matcher::PatternError;

/// HTTP server hosting the request pipeline.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Select the session store, assemble the pipeline and wrap `routes`.
    pub async fn new(config: AppConfig, routes: Router) -> Result<Self, PatternError> {
        let backend = pipeline::select_backend(&config.session).await;
        let pipeline = pipeline::assemble(&config, backend)?;
        let router = Self::build_router(&config, &pipeline, routes);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, pipeline: &Pipeline, routes: Router) -> Router {
        let routes = routes.layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )));
        pipeline
            .wrap(routes)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully wrapped router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
