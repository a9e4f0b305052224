//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, host-level layers)
//!     → request pipeline (logging, session, authorization)
//!     → static_contents.rs (files from disk, when enabled)
//!     → handlers.rs (application routes)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;
pub mod static_contents;

pub use request::{client_ip, X_REQUEST_ID};
pub use server::HttpServer;
pub use static_contents::StaticContents;
