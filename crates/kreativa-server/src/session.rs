//! Server-side admin sessions: opaque bearer tokens mapped to an admin
//! email, expiring after a fixed TTL.

use std::{
    collections::HashMap,
    fmt::Write as _,
    sync::Arc,
    time::{Duration, Instant},
};

use rand::RngCore;
use tokio::sync::Mutex;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct Session {
    email: String,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    ttl: Duration,
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Starts a session for `email` and returns its bearer token.
    pub async fn issue(&self, email: &str) -> String {
        let token = new_token();
        self.sessions.lock().await.insert(
            token.clone(),
            Session {
                email: email.to_lowercase(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Returns the email bound to `token` if the session is still live.
    pub async fn resolve(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some(s) if Instant::now() < s.expires_at => Some(s.email.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }

    /// Drops expired sessions. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| now < s.expires_at);
        before - sessions.len()
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_token_resolves_to_lowercased_email() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.issue("Admin@Kreativa.ng").await;
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert_eq!(store.resolve(&token).await.as_deref(), Some("admin@kreativa.ng"));
        assert!(store.resolve("not-a-token").await.is_none());
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.issue("a@x.ng").await;
        let b = store.issue("a@x.ng").await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn revoked_and_expired_sessions_do_not_resolve() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.issue("a@x.ng").await;
        assert!(store.revoke(&token).await);
        assert!(!store.revoke(&token).await);
        assert!(store.resolve(&token).await.is_none());

        let expired = SessionStore::new(Duration::ZERO);
        let token = expired.issue("a@x.ng").await;
        assert!(expired.resolve(&token).await.is_none());
    }

    #[tokio::test]
    async fn sweep_drops_expired_sessions() {
        let store = SessionStore::new(Duration::ZERO);
        store.issue("a@x.ng").await;
        store.issue("b@x.ng").await;
        assert_eq!(store.sweep().await, 2);
    }
}
