//! Request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     AppConfig
//!     → assembler.rs (select session store, compile rules, pick stages)
//!     → PipelineBuilder (ordered list of Interceptor stages)
//!     → Pipeline::wrap(router) (fold stages into axum layers)
//!
//! Per request (outer → inner):
//!     request log → action log → session binding
//!     → authorization gate → static contents → routed handler
//! ```
//!
//! # Design Decisions
//! - Every stage implements one `Interceptor` capability
//! - Installation order equals outer-to-inner wrap order
//! - Stages hold only immutable, startup-built state

pub mod assembler;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};

pub use assembler::{assemble, select_backend};

/// A single stage of the request pipeline.
///
/// A stage either calls `next.run(request)` to hand the request inward, or
/// returns its own response to short-circuit the chain.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn intercept(&self, request: Request, next: Next) -> Response;
}

/// An ordered chain of stages, outermost first.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Interceptor>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Stage names, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Wrap `router` so every request passes through the stages in order.
    ///
    /// `Router::layer` puts each new layer outside the previous ones, so the
    /// stages are applied innermost first.
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.stages.iter().rev().fold(router, |router, stage| {
            router.layer(middleware::from_fn_with_state(stage.clone(), run_stage))
        })
    }
}

async fn run_stage(
    State(stage): State<Arc<dyn Interceptor>>,
    request: Request,
    next: Next,
) -> Response {
    stage.intercept(request, next).await
}

/// Builder collecting stages in installation order.
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Interceptor>>,
}

impl PipelineBuilder {
    /// Append a stage inside all previously added ones.
    pub fn stage(mut self, stage: impl Interceptor) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append a stage only when `enabled`.
    pub fn stage_if<I, F>(self, enabled: bool, make: F) -> Self
    where
        I: Interceptor,
        F: FnOnce() -> I,
    {
        if enabled {
            self.stage(make())
        } else {
            self
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
