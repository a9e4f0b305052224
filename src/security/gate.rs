//! Path and role based authorization.
//!
//! # State Transitions
//! ```text
//! Unchecked → Authorized: path outside the protected set
//! Unchecked → Excluded:   protected path listed as excluded
//! Unchecked → Denied:     protected path, no signed-in account
//! Unchecked → Authorized: account role has a rule matching the path (session persisted)
//! Unchecked → Denied:     anything else
//! ```
//!
//! # Design Decisions
//! - Rules compiled once; evaluation is a pure function of (path, account)
//! - Exclusion is checked before any role rule
//! - Fail closed: a protected path with no matching role rule is denied

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::SecurityConfig;
use crate::pipeline::Interceptor;
use crate::routing::matcher::{PathMatcher, PatternError};
use crate::session::{Account, Authority, Session};

/// Where a request ended up in the authorization state machine.
///
/// The terminal state is attached to the response extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Unchecked,
    Excluded,
    Authorized,
    Denied,
}

/// Outcome of evaluating the rules for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The path is not protected at all.
    Unprotected,
    /// The path is protected but explicitly excluded.
    Excluded,
    /// A role rule for this authority matched the path.
    Granted(Authority),
    Denied,
}

impl Verdict {
    pub fn state(&self) -> GateState {
        match self {
            Verdict::Unprotected | Verdict::Granted(_) => GateState::Authorized,
            Verdict::Excluded => GateState::Excluded,
            Verdict::Denied => GateState::Denied,
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, Verdict::Denied)
    }

    /// Only a role-based grant changes trust state and saves the session.
    pub fn persists_session(&self) -> bool {
        matches!(self, Verdict::Granted(_))
    }
}

/// Compiled access rules.
#[derive(Debug, Clone)]
pub struct AccessRules {
    auth: PathMatcher,
    exclude: PathMatcher,
    roles: Vec<(Authority, PathMatcher)>,
}

impl AccessRules {
    pub fn compile(config: &SecurityConfig) -> Result<Self, PatternError> {
        Ok(Self {
            auth: PathMatcher::compile(&config.auth_paths)?,
            exclude: PathMatcher::compile(&config.exclude_paths)?,
            roles: vec![
                (Authority::Admin, PathMatcher::compile(&config.admin_paths)?),
                (Authority::User, PathMatcher::compile(&config.user_paths)?),
            ],
        })
    }

    pub fn evaluate(&self, path: &str, account: Option<&Account>) -> Verdict {
        if !self.auth.matches(path) {
            return Verdict::Unprotected;
        }
        if self.exclude.matches(path) {
            return Verdict::Excluded;
        }
        let Some(account) = account else {
            return Verdict::Denied;
        };

        let granted = self
            .roles
            .iter()
            .any(|(role, paths)| *role == account.authority && paths.matches(path));
        if granted {
            Verdict::Granted(account.authority)
        } else {
            Verdict::Denied
        }
    }
}

/// Pipeline stage enforcing `AccessRules`.
pub struct AuthorizationGate {
    rules: Arc<AccessRules>,
}

impl AuthorizationGate {
    pub fn new(rules: AccessRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }
}

#[async_trait]
impl Interceptor for AuthorizationGate {
    fn name(&self) -> &'static str {
        "authorization"
    }

    async fn intercept(&self, request: Request, next: Next) -> Response {
        let path = request.uri().path().to_string();
        let session = request.extensions().get::<Session>().cloned();
        let account = match &session {
            Some(session) => session.current_account().await,
            None => None,
        };

        let verdict = self.rules.evaluate(&path, account.as_ref());
        tracing::debug!(path = %path, verdict = ?verdict, "Authorization evaluated");

        if verdict.persists_session() {
            if let Some(session) = &session {
                session.persist().await;
            }
        }

        if !verdict.is_allowed() {
            tracing::info!(
                path = %path,
                account = account.as_ref().map(|a| a.name.as_str()).unwrap_or("None"),
                "Access denied"
            );
            let mut response = unauthorized();
            response.extensions_mut().insert(GateState::Denied);
            return response;
        }

        let mut response = next.run(request).await;
        response.extensions_mut().insert(verdict.state());
        response
    }
}

/// The rejection sent for a denied request: 401 with a JSON `false` body.
pub fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(false)).into_response()
}
