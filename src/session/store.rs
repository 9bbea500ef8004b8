//! Session Store
//!
//! Current auth token and user. Subscribers get a `watch` receiver and see
//! every replacement of the session.

use std::sync::Arc;
use tokio::sync::watch;

use super::TokenStore;
use crate::api::dto::{LoginResponse, User};
use crate::api::IncubatorClient;
use crate::transport::ApiResult;

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

/// Shared session handle. Clones observe the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: watch::Sender<Session>,
    token_store: Option<TokenStore>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// In-memory session, nothing persisted
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(SessionInner {
                state,
                token_store: None,
            }),
        }
    }

    /// Session backed by a token file; a stored token is restored immediately
    pub fn with_token_store(token_store: TokenStore) -> Self {
        let token = match token_store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore access token");
                None
            }
        };

        if token.is_some() {
            tracing::debug!(path = ?token_store.path(), "Restored access token");
        }

        let (state, _) = watch::channel(Session { token, user: None });
        Self {
            inner: Arc::new(SessionInner {
                state,
                token_store: Some(token_store),
            }),
        }
    }

    /// Receiver notified on every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().token.is_some()
    }

    /// Replace token and user together
    pub fn set_session(&self, token: Option<String>, user: Option<User>) {
        self.persist(token.as_deref());
        self.inner.state.send_replace(Session { token, user });
    }

    /// Replace the user, keep the token
    pub fn set_user(&self, user: Option<User>) {
        self.inner.state.send_modify(|session| session.user = user);
    }

    pub fn clear(&self) {
        self.set_session(None, None);
    }

    /// Use `token` when no token is held yet. Not persisted.
    pub fn seed_token(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        self.inner.state.send_if_modified(|session| {
            if session.token.is_some() {
                return false;
            }
            session.token = Some(token.to_string());
            true
        })
    }

    /// Reload the user from `/auth/me`
    pub async fn refresh_me(&self, client: &IncubatorClient) -> ApiResult<User> {
        let user = client.me().await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Log in and store whatever the backend hands back.
    ///
    /// A token response replaces the session; when it carries no user the
    /// user is fetched from `/auth/me`. A bare user response keeps the
    /// current token.
    pub async fn login(
        &self,
        client: &IncubatorClient,
        email: &str,
        password: &str,
    ) -> ApiResult<User> {
        match client.login(email.trim(), password).await? {
            LoginResponse::Token {
                access_token, user, ..
            } => {
                self.set_session(Some(access_token), user.clone());
                match user {
                    Some(user) => Ok(user),
                    None => self.refresh_me(client).await,
                }
            }
            LoginResponse::User(user) => {
                self.set_user(Some(user.clone()));
                Ok(user)
            }
        }
    }

    fn persist(&self, token: Option<&str>) {
        let Some(store) = &self.inner.token_store else {
            return;
        };

        let result = match token {
            Some(token) => store.save(token),
            None => store.clear(),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist access token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user(id: u64) -> User {
        User {
            id,
            email: format!("user{}@example.org", id),
            name: format!("User {}", id),
            role: "user".to_string(),
            founder_id: None,
            investor_id: None,
        }
    }

    #[test]
    fn test_set_and_clear() {
        let session = SessionStore::new();
        assert!(!session.is_authenticated());

        session.set_session(Some("t1".to_string()), Some(user(1)));
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("t1"));
        assert_eq!(session.user().map(|u| u.id), Some(1));

        session.clear();
        assert_eq!(session.snapshot(), Session::default());
    }

    #[test]
    fn test_seed_token_only_when_empty() {
        let session = SessionStore::new();
        assert!(session.seed_token("boot"));
        assert_eq!(session.token().as_deref(), Some("boot"));

        assert!(!session.seed_token("other"));
        assert_eq!(session.token().as_deref(), Some("boot"));
        assert!(!SessionStore::new().seed_token("  "));
    }

    #[test]
    fn test_clones_share_state() {
        let a = SessionStore::new();
        let b = a.clone();
        a.set_session(Some("shared".to_string()), None);
        assert_eq!(b.token().as_deref(), Some("shared"));
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let session = SessionStore::new();
        let mut rx = session.subscribe();

        session.set_session(Some("t".to_string()), Some(user(2)));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user.as_ref().map(|u| u.id), Some(2));

        session.set_user(None);
        rx.changed().await.unwrap();
        assert!(rx.borrow().user.is_none());
        assert_eq!(rx.borrow().token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_login_with_token_then_me() {
        use crate::test_support::{serve, StubResponse};
        use crate::transport::{HttpTransport, TransportConfig};

        let (base, mut requests) = serve(vec![
            StubResponse::json(200, r#"{"access_token": "jwt", "token_type": "bearer"}"#),
            StubResponse::json(200, r#"{"id": 8, "email": "a@b.io", "name": "A", "role": "admin"}"#),
        ])
        .await;

        let session = SessionStore::new();
        let config = TransportConfig {
            base_url: base,
            ..TransportConfig::default()
        };
        let transport = HttpTransport::with_session(config, session.clone()).unwrap();
        let client = IncubatorClient::new(Arc::new(transport));

        let logged_in = session.login(&client, " a@b.io ", "pw").await.unwrap();
        assert_eq!(logged_in.id, 8);
        assert_eq!(session.token().as_deref(), Some("jwt"));
        assert_eq!(session.user().map(|u| u.role), Some("admin".to_string()));

        let login_request = requests.recv().await.unwrap();
        assert!(login_request.starts_with("POST /auth/login HTTP/1.1"));
        assert!(login_request.contains(r#""email":"a@b.io""#));

        let me_request = requests.recv().await.unwrap();
        assert!(me_request.starts_with("GET /auth/me HTTP/1.1"));
        assert!(me_request.to_lowercase().contains("authorization: bearer jwt"));
    }

    #[test]
    fn test_token_persisted_and_restored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access_token");

        let session = SessionStore::with_token_store(TokenStore::new(&path));
        session.set_session(Some("persisted".to_string()), Some(user(3)));

        let restored = SessionStore::with_token_store(TokenStore::new(&path));
        assert_eq!(restored.token().as_deref(), Some("persisted"));
        // The user is not persisted, only the token
        assert!(restored.user().is_none());

        restored.clear();
        let after_clear = SessionStore::with_token_store(TokenStore::new(&path));
        assert!(!after_clear.is_authenticated());
    }
}
