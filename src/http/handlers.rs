//! Built-in routes served by the binary.

use axum::{routing::get, Json, Router};

use crate::session::{Account, Session};

/// `GET /api/health`
pub async fn health() -> Json<&'static str> {
    Json("healthy")
}

/// `GET /api/account`: the account signed in on this session, or `null`.
pub async fn current_account(session: Session) -> Json<Option<Account>> {
    Json(session.current_account().await)
}

pub fn routes() -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/account", get(current_account))
}
