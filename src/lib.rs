//! Session-aware request pipeline for axum servers.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;
pub mod security;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorReport};
pub use http::HttpServer;
pub use pipeline::{Interceptor, Pipeline};
