//! Session storage abstraction.
//!
//! # Responsibilities
//! - Hold the store chosen at startup behind one cloneable handle
//! - Define the session error type surfaced to handlers
//!
//! # Design Decisions
//! - Stores implement `tower_sessions::SessionStore`; the pipeline never
//!   owns a concrete store, only `Arc<dyn SessionStore>`
//! - Expiry belongs to the store (records carry their expiry date)
//! - Last write wins; no cross-request locking

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::SessionStore;

/// Errors raised by session handling.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("timed out connecting to {address}")]
    ConnectTimeout { address: String },
}

/// Which kind of store backs the sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Redis,
}

/// The session store shared by every request.
#[derive(Debug, Clone)]
pub struct SessionBackend {
    kind: BackendKind,
    store: Arc<dyn SessionStore>,
}

impl SessionBackend {
    pub fn new(kind: BackendKind, store: impl SessionStore) -> Self {
        Self {
            kind,
            store: Arc::new(store),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.store.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.store.save(record).await
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        self.store.load(id).await
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.store.delete(id).await
    }
}
