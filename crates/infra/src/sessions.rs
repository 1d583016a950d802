//! Login sessions backing issued bearer tokens.
//!
//! A token is only honoured while its session is live: not revoked and not
//! past `expires_at`. Logout revokes the session, which invalidates the token
//! even though its signature is still good.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use tillpoint_core::{SessionId, UserId};

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

pub trait SessionStore: Send + Sync {
    /// Start a session for `user_id` lasting `ttl`.
    fn open(&self, user_id: UserId, now: DateTime<Utc>, ttl: Duration)
        -> Result<Session, StoreError>;

    /// The session if it exists and is live at `now`.
    fn resolve(&self, id: SessionId, now: DateTime<Utc>) -> Option<Session>;

    /// Revoke a session. Returns `false` if it was unknown or already revoked.
    fn revoke(&self, id: SessionId, now: DateTime<Utc>) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn open(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Session, StoreError> {
        let session = Session {
            id: SessionId::new(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        };
        let mut map = self.inner.write().map_err(|_| {
            tracing::error!("session store lock poisoned; session not opened");
            StoreError::Poisoned
        })?;
        map.insert(session.id, session.clone());
        Ok(session)
    }

    fn resolve(&self, id: SessionId, now: DateTime<Utc>) -> Option<Session> {
        let map = self.inner.read().ok()?;
        map.get(&id).filter(|s| s.is_live(now)).cloned()
    }

    fn revoke(&self, id: SessionId, now: DateTime<Utc>) -> bool {
        let Ok(mut map) = self.inner.write() else {
            return false;
        };
        match map.get_mut(&id) {
            Some(session) if session.revoked_at.is_none() => {
                session.revoked_at = Some(now);
                true
            }
            _ => false,
        }
    }
}
