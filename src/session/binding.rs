//! Session binding stage.
//!
//! Runs `tower_sessions::SessionManagerLayer` around the inner chain, wraps
//! its session in a `Session` handle for every request, and mirrors the
//! handle onto the response so outer stages can still read the account.
//!
//! # Cookie Refresh
//! The session manager only writes back sessions a handler modified. A
//! session saved explicitly (the authorization gate's `persist`) gets its
//! cookie reissued here, so the browser's `Max-Age` moves forward together
//! with the stored expiry.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response};
use time::Duration;
use tower::{Layer, ServiceExt};
use tower_cookies::Cookies;
use tower_sessions::cookie::{Cookie, SameSite};
use tower_sessions::session::Id;
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::SessionConfig;
use crate::pipeline::Interceptor;
use crate::session::backend::SessionBackend;
use crate::session::handle::Session;

/// Attributes of the session cookie, shared with the session manager.
#[derive(Debug, Clone)]
struct CookieSettings {
    name: String,
    max_age: Duration,
    secure: bool,
}

impl CookieSettings {
    fn from_config(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age: Duration::seconds(i64::try_from(config.max_age_secs).unwrap_or(i64::MAX)),
            secure: config.secure,
        }
    }

    fn cookie(&self, id: Id) -> Cookie<'static> {
        Cookie::build((self.name.clone(), id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(self.max_age)
            .build()
    }
}

/// Binds the session named by the request cookie, or a fresh one.
pub struct SessionBinding {
    manager: SessionManagerLayer<SessionBackend>,
    cookie: Arc<CookieSettings>,
}

impl SessionBinding {
    pub fn new(backend: SessionBackend, config: &SessionConfig) -> Self {
        let cookie = CookieSettings::from_config(config);
        let manager = SessionManagerLayer::new(backend)
            .with_name(cookie.name.clone())
            .with_path("/")
            .with_http_only(true)
            .with_same_site(SameSite::Lax)
            .with_secure(cookie.secure)
            .with_expiry(Expiry::OnInactivity(cookie.max_age));
        Self {
            manager,
            cookie: Arc::new(cookie),
        }
    }
}

/// Runs inside the session manager, which has already put its session and
/// the cookie jar in the request extensions.
async fn bind(
    mut request: Request,
    next: Next,
    cookie: Arc<CookieSettings>,
) -> Result<Response, Infallible> {
    let Some(raw) = request.extensions().get::<tower_sessions::Session>().cloned() else {
        tracing::error!("Session manager did not provide a session");
        return Ok(next.run(request).await);
    };
    let cookies = request.extensions().get::<Cookies>().cloned();

    let session = Session::new(raw);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if session.was_persisted() {
        match (session.id(), cookies) {
            (Some(id), Some(cookies)) => {
                tracing::debug!(session_id = ?id, "Refreshing session cookie");
                cookies.add(cookie.cookie(id));
            }
            _ => tracing::warn!("Persisted session has no cookie to refresh"),
        }
    }

    response.extensions_mut().insert(session);
    Ok(response)
}

#[async_trait]
impl Interceptor for SessionBinding {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn intercept(&self, request: Request, next: Next) -> Response {
        let cookie = self.cookie.clone();
        let inner = tower::service_fn(move |request: Request| {
            bind(request, next.clone(), cookie.clone())
        });

        match self.manager.layer(inner).oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        let settings = CookieSettings::from_config(&SessionConfig {
            cookie_name: "sid".into(),
            max_age_secs: 600,
            ..Default::default()
        });
        let id = Id(7);
        let cookie = settings.cookie(id).to_string();

        assert!(cookie.starts_with(&format!("sid={id}")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_cookie() {
        let settings = CookieSettings::from_config(&SessionConfig {
            secure: true,
            ..Default::default()
        });
        assert!(settings.cookie(Id(7)).to_string().contains("Secure"));
    }
}
