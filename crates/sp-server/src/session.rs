//! In-memory session store.
//!
//! Sessions are keyed by the value of the session cookie. Only authenticated
//! sessions are stored; each holds the CSRF token protecting its logout and
//! the user's [`SessionToken`]. Sessions idle for longer than the configured
//! timeout are evicted on access and by [`SessionStore::remove_expired`].

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sp_security::SessionToken;
use uuid::Uuid;

use crate::csrf::generate_csrf_token;

/// Server-side session data.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID, the cookie value.
    pub id: String,
    /// CSRF token protecting the logout route.
    pub csrf_token: String,
    /// Token of the authenticated user.
    pub token: SessionToken,
    /// Last time the session was used.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Checks if the session has been idle for longer than `idle_timeout`.
    #[must_use]
    pub fn is_expired(&self, idle_timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity > idle_timeout
    }
}

/// Thread-safe in-memory session store.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Creates an empty store evicting sessions idle for `idle_timeout_secs`.
    #[must_use]
    pub fn new(idle_timeout_secs: i64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::seconds(idle_timeout_secs),
        }
    }

    /// Starts an authenticated session.
    pub fn create(&self, token: SessionToken) -> Session {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            csrf_token: generate_csrf_token(),
            token,
            last_activity: Utc::now(),
        };
        self.sessions
            .write()
            .insert(session.id.clone(), session.clone());
        session
    }

    /// Looks up a live session and marks it as used.
    ///
    /// An expired session is removed and reported as missing.
    pub fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(id)?;
        if session.is_expired(self.idle_timeout, now) {
            sessions.remove(id);
            tracing::debug!(session_id = id, "Session expired");
            return None;
        }
        session.last_activity = now;
        Some(session.clone())
    }

    /// Ends a session.
    pub fn invalidate(&self, id: &str) -> Option<Session> {
        self.sessions.write().remove(id)
    }

    /// Removes every idle session. Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let initial_len = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.idle_timeout, now));
        initial_len - sessions.len()
    }
}

/// Reads the cookie named `name` from the request headers.
#[must_use]
pub fn session_id_from_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value removing the session cookie.
#[must_use]
pub fn expired_session_cookie(name: &str, path: &str) -> String {
    format!("{name}=; Path={path}; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use sp_security::SamlSessionAttributes;

    use super::*;

    fn saml_token() -> SessionToken {
        SessionToken::saml("alice", SamlSessionAttributes::new(None))
    }

    fn backdate(store: &SessionStore, id: &str, secs: i64) {
        if let Some(session) = store.sessions.write().get_mut(id) {
            session.last_activity = session.last_activity - Duration::seconds(secs);
        }
    }

    #[test]
    fn session_lifecycle() {
        let store = SessionStore::new(1800);
        let session = store.create(saml_token());
        assert_eq!(session.csrf_token.len(), 32);
        assert_eq!(store.get(&session.id).unwrap().token, saml_token());

        assert!(store.invalidate(&session.id).is_some());
        assert!(store.get(&session.id).is_none());
        assert!(store.invalidate(&session.id).is_none());
    }

    #[test]
    fn idle_sessions_expire_on_access() {
        let store = SessionStore::new(1800);
        let session = store.create(saml_token());

        backdate(&store, &session.id, 1700);
        assert!(store.get(&session.id).is_some());

        // The lookup above refreshed the activity timestamp.
        backdate(&store, &session.id, 1700);
        assert!(store.get(&session.id).is_some());

        backdate(&store, &session.id, 1801);
        assert!(store.get(&session.id).is_none());
        assert!(store.sessions.read().is_empty());
    }

    #[test]
    fn stale_sessions_are_swept() {
        let store = SessionStore::new(1800);
        let stale = store.create(saml_token());
        let fresh = store.create(SessionToken::local("bob"));
        backdate(&store, &stale.id, 3600);

        assert_eq!(store.remove_expired(), 1);
        assert!(store.get(&stale.id).is_none());
        assert!(store.get(&fresh.id).is_some());
        assert_eq!(store.remove_expired(), 0);
    }

    #[test]
    fn cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; SPSESSID=abc123; lang=en"),
        );
        assert_eq!(
            session_id_from_headers(&headers, "SPSESSID").as_deref(),
            Some("abc123")
        );
        assert_eq!(session_id_from_headers(&headers, "OTHER"), None);
    }
}
