use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::api::{ApiClient, ClientError};
use crate::routes::{Navigator, Route};
use crate::store::{StoreError, TokenStore};

/// Role name that unlocks the admin-only surfaces.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("API error: {0}")]
    Client(#[from] ClientError),
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

/// In-memory session flags.
///
/// `initialized` is true after any `initialize()` or `set_authenticated()`
/// completes, success or failure — route guards must never wait forever on
/// a failed verification.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub authenticated: bool,
    pub initialized: bool,
    pub role: String,
}

/// Lazily-initialized auth session, shared across all navigations.
///
/// Concurrent `initialize()` calls are coalesced: the async init guard
/// admits one verification round-trip; everyone else observes its result.
pub struct SessionState {
    init_guard: Mutex<()>,
    inner: RwLock<Session>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            init_guard: Mutex::new(()),
            inner: RwLock::new(Session::default()),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.authenticated
    }

    /// True iff the session role is the literal admin role.
    pub async fn is_admin(&self) -> bool {
        self.inner.read().await.role == ADMIN_ROLE
    }

    /// Populate the session, at most once per lifetime.
    ///
    /// No stored token: stay anonymous without touching the network. Stored
    /// token: one verify round-trip; any failure — expired token, network
    /// down — leaves the session anonymous and is never propagated.
    pub async fn initialize(&self, api: &ApiClient, tokens: &TokenStore) {
        if self.inner.read().await.initialized {
            return;
        }

        let _guard = self.init_guard.lock().await;
        if self.inner.read().await.initialized {
            return;
        }

        let token = match tokens.token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Credential store unreadable; treating as logged out");
                None
            }
        };

        let mut verified_role: Option<String> = None;
        if token.is_some() {
            match api.verify().await {
                Ok(response) => {
                    if let Err(e) = tokens.set_role(&response.user) {
                        tracing::warn!(error = %e, "Failed to refresh cached role");
                    }
                    verified_role = Some(response.user);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Session verification failed");
                }
            }
        }

        let mut session = self.inner.write().await;
        session.authenticated = verified_role.is_some();
        session.role = verified_role.unwrap_or_default();
        session.initialized = true;
        tracing::debug!(authenticated = session.authenticated, "Session initialized");
    }

    /// Direct override, used right after a successful login so the fresh
    /// token is not immediately re-verified.
    pub async fn set_authenticated(&self, value: bool, role: &str) {
        let mut session = self.inner.write().await;
        session.authenticated = value;
        session.initialized = true;
        session.role = if value { role.to_string() } else { String::new() };
    }

    /// Exchange a PIN for a token, persist it, and mark the session live.
    pub async fn login(
        &self,
        api: &ApiClient,
        tokens: &TokenStore,
        pin: &str,
    ) -> Result<String, SessionError> {
        let response = api.login(pin).await?;
        tokens.set(&response.token, &response.role)?;
        self.set_authenticated(true, &response.role).await;
        tracing::info!(role = %response.role, "Logged in");
        Ok(response.role)
    }

    /// Drop the stored credentials and return to the login entry point.
    pub async fn logout(
        &self,
        tokens: &TokenStore,
        navigator: &dyn Navigator,
    ) -> Result<(), SessionError> {
        tokens.clear()?;
        self.set_authenticated(false, "").await;
        navigator.redirect(Route::Login, None);
        tracing::info!("Logged out");
        Ok(())
    }
}
