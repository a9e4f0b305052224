//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → request_log.rs (one INFO summary line after the response is ready)
//!     → action_log.rs (DEBUG start/end markers around the inner chain)
//!
//! Startup:
//!     → logging.rs (subscriber and filter)
//! ```
//!
//! # Design Decisions
//! - Both stages wrap the handler, they never replace it
//! - Post-processing always runs, whatever the inner chain returned

pub mod action_log;
pub mod logging;
pub mod request_log;

pub use action_log::ActionLogger;
pub use logging::init_logging;
pub use request_log::{LogTemplate, RequestLogger, RequestSummary};
