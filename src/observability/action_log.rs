//! Action boundary logging.
//!
//! Emits a trace marker before and after the inner chain runs, labelled with
//! the request's logical path. Errors reported by the inner chain are logged
//! between the two markers; the end marker is always written.

use async_trait::async_trait;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::error::ErrorReport;
use crate::pipeline::Interceptor;

#[derive(Debug, Default)]
pub struct ActionLogger;

impl ActionLogger {
    pub fn new() -> Self {
        Self
    }
}

/// The route template when routing already happened, otherwise the URI path.
fn action_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

#[async_trait]
impl Interceptor for ActionLogger {
    fn name(&self) -> &'static str {
        "action_log"
    }

    async fn intercept(&self, request: Request, next: Next) -> Response {
        let label = action_label(&request);
        tracing::debug!("{label} Action Start");

        let response = next.run(request).await;

        if let Some(report) = response.extensions().get::<ErrorReport>() {
            tracing::error!(
                path = %label,
                status = response.status().as_u16(),
                error = %report,
                "Action failed"
            );
        }

        tracing::debug!("{label} Action End");
        response
    }
}
