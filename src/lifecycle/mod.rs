//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Select session store → Assemble pipeline → Listen
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → axum graceful shutdown (stop accepting, drain)
//! ```
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal at startup
//! - Listener binds last (traffic only when the pipeline is ready)

pub mod signals;

pub use signals::shutdown_signal;
