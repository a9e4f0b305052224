//! Authenticated identity carried by a session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role classification determining path-level access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Authority {
    Admin,
    User,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Admin => "Admin",
            Authority::User => "User",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated account bound to a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    pub name: String,
    pub authority: Authority,
}

impl Account {
    pub fn new(name: impl Into<String>, authority: Authority) -> Self {
        Self {
            name: name.into(),
            authority,
        }
    }
}
