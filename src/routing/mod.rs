//! Path classification subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Compilation (at startup):
//!     Vec<String> patterns from config
//!     → matcher.rs (compile regexes)
//!     → Freeze as immutable PathMatcher
//!
//! Per request:
//!     request path → PathMatcher::matches → bool
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - Deterministic: same input always gives the same answer

pub mod matcher;

pub use matcher::{PathMatcher, PatternError};
