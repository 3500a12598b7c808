//! Session context: the bearer token and admin id, held together.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storeadmin_core::AdminId;

use crate::AuthError;

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: AdminId,
}

/// An authenticated admin.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    admin_id: AdminId,
    logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, admin_id: AdminId, logged_in_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            admin_id,
            logged_in_at,
        }
    }

    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Self {
        Self::new(response.access_token, response.user_id, now)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn admin_id(&self) -> AdminId {
        self.admin_id
    }

    pub fn logged_in_at(&self) -> DateTime<Utc> {
        self.logged_in_at
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("admin_id", &self.admin_id)
            .field("logged_in_at", &self.logged_in_at)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Shared holder of the current session.
///
/// Token and admin id are replaced and cleared in a single write, so a reader
/// never sees one without the other.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }

    pub fn login(&self, session: Session) {
        tracing::info!(admin_id = %session.admin_id(), "session started");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Clear the session. Returns the session that was active, if any.
    pub fn logout(&self) -> Option<Session> {
        let previous = self.current.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(session) = &previous {
            tracing::info!(admin_id = %session.admin_id(), "session cleared");
        }
        previous
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Token for the `Authorization: Bearer` header.
    pub fn bearer(&self) -> Result<String, AuthError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token().to_string())
            .ok_or(AuthError::Unauthenticated)
    }

    pub fn admin_id(&self) -> Result<AdminId, AuthError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Session::admin_id)
            .ok_or(AuthError::Unauthenticated)
    }
}
