//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie: session=<id>
//!     → binding.rs (tower-sessions manager, Session handle in extensions)
//!     → handle.rs (record loaded lazily on first read)
//!     → gate / handlers read the account, persist on demand
//!     → backend.rs (MemoryStore | RedisStore behind SessionBackend)
//! ```
//!
//! # Design Decisions
//! - The store is injected once at assembly time, never global
//! - A store read failure degrades to an anonymous session
//! - A store write failure on persist is logged, never surfaced
//! - Expiry is inactivity based; every save refreshes record and cookie

pub mod account;
pub mod backend;
pub mod binding;
pub mod handle;
pub mod memory;
pub mod redis_store;

pub use account::{Account, Authority};
pub use backend::{BackendKind, SessionBackend, SessionError};
pub use binding::SessionBinding;
pub use handle::{Session, ACCOUNT_KEY};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use tower_sessions::session::{Id as SessionId, Record as SessionRecord};
