//! Per-request session handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use tower_sessions::session::Id;

use crate::session::account::Account;
use crate::session::backend::SessionError;

/// Key of the signed-in account inside the session record.
pub const ACCOUNT_KEY: &str = "account";

/// The session bound to the current request.
///
/// Cloning is cheap; all clones refer to the same session state. The record
/// is loaded from the store on first access and the store itself is shared,
/// never owned.
#[derive(Debug, Clone)]
pub struct Session {
    inner: tower_sessions::Session,
    persisted: Arc<AtomicBool>,
}

impl Session {
    pub fn new(inner: tower_sessions::Session) -> Self {
        Self {
            inner,
            persisted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The stored session ID, `None` until the session exists in the store.
    pub fn id(&self) -> Option<Id> {
        self.inner.id()
    }

    /// The account tied to this session, if anyone is signed in.
    ///
    /// A record that cannot be loaded or decoded reads as anonymous.
    pub async fn current_account(&self) -> Option<Account> {
        match self.inner.get::<Account>(ACCOUNT_KEY).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, treating it as anonymous");
                None
            }
        }
    }

    /// Replace the signed-in account. Written to the store when the request
    /// completes.
    pub async fn set_account(&self, account: Option<Account>) -> Result<(), SessionError> {
        match account {
            Some(account) => self.inner.insert(ACCOUNT_KEY, account).await?,
            None => {
                self.inner.remove_value(ACCOUNT_KEY).await?;
            }
        }
        Ok(())
    }

    /// Write the session to the store now, extending its expiry.
    pub async fn save(&self) -> Result<(), SessionError> {
        self.inner.save().await?;
        self.persisted.store(true, Ordering::Release);
        Ok(())
    }

    /// Fire-and-forget save: a store failure is logged and never surfaces.
    pub async fn persist(&self) {
        if let Err(e) = self.save().await {
            tracing::error!(
                session_id = ?self.id(),
                error = %e,
                "Failed to persist session"
            );
        }
    }

    /// True once `save` succeeded during this request.
    pub fn was_persisted(&self) -> bool {
        self.persisted.load(Ordering::Acquire)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "No session bound to request",
        ))
    }
}
