//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (session already bound):
//!     → gate.rs (classify path, check account role)
//!     → 401 `false` on denial, otherwise pass inward
//! ```
//!
//! # Design Decisions
//! - Fail closed: protected paths need an explicit role rule
//! - No trust in client input: the account comes only from the session store

pub mod gate;

pub use gate::{unauthorized, AccessRules, AuthorizationGate, GateState, Verdict};
