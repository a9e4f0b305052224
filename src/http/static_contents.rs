//! Static contents stage.
//!
//! Serves files from a directory for GET and HEAD requests. Anything the
//! directory does not have falls through to the inner chain, as does the
//! configured excluded path.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{self, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::StaticContentsConfig;
use crate::pipeline::Interceptor;
use crate::routing::matcher::{PathMatcher, PatternError};

pub struct StaticContents {
    serve_dir: ServeDir,
    exclude: PathMatcher,
}

impl StaticContents {
    pub fn new(config: &StaticContentsConfig) -> Result<Self, PatternError> {
        let exclude = match &config.exclude_path {
            Some(path) => PathMatcher::compile(std::slice::from_ref(path))?,
            None => PathMatcher::default(),
        };
        Ok(Self {
            serve_dir: ServeDir::new(&config.root),
            exclude,
        })
    }

    fn skips(&self, request: &Request) -> bool {
        !matches!(*request.method(), Method::GET | Method::HEAD)
            || self.exclude.matches(request.uri().path())
    }
}

#[async_trait]
impl Interceptor for StaticContents {
    fn name(&self) -> &'static str {
        "static_contents"
    }

    async fn intercept(&self, request: Request, next: Next) -> Response {
        if self.skips(&request) {
            return next.run(request).await;
        }

        // Probe with a bodiless copy so the original can still go inward.
        let mut lookup = http::Request::new(());
        *lookup.method_mut() = request.method().clone();
        *lookup.uri_mut() = request.uri().clone();
        *lookup.version_mut() = request.version();
        *lookup.headers_mut() = request.headers().clone();

        match self.serve_dir.clone().oneshot(lookup).await {
            Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                tracing::debug!(path = %request.uri().path(), status = %response.status(), "Served static content");
                response.map(Body::new)
            }
            _ => next.run(request).await,
        }
    }
}
