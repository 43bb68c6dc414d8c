//! Session store: the single writer of session state

use super::context::{Session, SessionStatus, SessionView};
use porter_http::types::LoginResponse;
use porter_http::{ApiClient, ClientError, TokenStore};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owns the session and every path that changes it
///
/// Clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Create the store, restoring the token from the durable slot
    ///
    /// The store registers itself on the client's auth error hook, so a token rejected
    /// on any endpoint drops the in-memory session too. The hook has a single slot: build
    /// one store per client, as a later store on the same client takes the hook over.
    pub fn new(client: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        let token = match tokens.get() {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(err) => {
                warn!(error = %err, "Failed to read stored token, starting anonymous");
                None
            }
        };

        let (state, _) = watch::channel(Session::restored(token));
        let inner = Arc::new(Inner {
            client,
            tokens,
            state,
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        inner.client.auth_errors().set_callback(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                debug!("Token rejected by backend, dropping session");
                inner.state.send_modify(Session::clear);
            }
        }));

        Self { inner }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Read-only view that follows every change
    pub fn subscribe(&self) -> SessionView {
        SessionView::new(self.inner.state.subscribe())
    }

    /// Call `callback` with every new session until the store is dropped
    ///
    /// Must be called within a Tokio runtime.
    pub fn on_change<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(&Session) + Send + 'static,
    {
        let mut rx = self.inner.state.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                callback(&session);
            }
        })
    }

    /// Log in and load the identity behind the new token
    ///
    /// On failure the session is torn down and the error returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.inner
            .state
            .send_modify(|s| s.status = SessionStatus::Authenticating);

        match self.establish(username, password).await {
            Ok(response) => {
                self.fetch_user_data().await;
                Ok(response)
            }
            Err(err) => {
                warn!(username, error = %err, "Login failed");
                self.reset();
                Err(err)
            }
        }
    }

    /// Persist the token before anything reads it back
    async fn establish(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self.inner.client.login(username, password).await?;
        self.inner.tokens.set(&response.access_token)?;

        let token = response.access_token.clone();
        self.inner.state.send_modify(|s| {
            s.token = Some(token);
            s.authenticated = true;
        });
        info!(username, "Logged in");

        Ok(response)
    }

    /// Ask the backend for the identity behind the current token
    ///
    /// Never fails: any error, a network outage included, ends the session.
    pub async fn fetch_user_data(&self) {
        match self.inner.client.protected().await {
            Ok(response) => {
                // A token written to the slot by someone else is adopted here
                let stored = if self.inner.state.borrow().token.is_none() {
                    self.inner
                        .tokens
                        .get()
                        .ok()
                        .flatten()
                        .filter(|token| !token.is_empty())
                } else {
                    None
                };

                self.inner.state.send_modify(|s| {
                    if s.token.is_none() {
                        s.token = stored;
                    }
                    // An identity without a token behind it is not a session
                    if s.token.is_some() {
                        s.user = Some(response.logged_in_as);
                        s.authenticated = true;
                        s.status = SessionStatus::Authenticated;
                    } else {
                        s.clear();
                    }
                });

                let session = self.inner.state.borrow();
                if session.authenticated {
                    debug!(user = ?session.user, "Identity loaded");
                } else {
                    debug!("Identity check answered but no token is held, staying anonymous");
                }
            }
            Err(err) => {
                warn!(error = %err, "Identity check failed, dropping session");
                self.reset();
            }
        }
    }

    /// Drop the session. No network call.
    pub fn logout(&self) {
        info!("Logging out");
        self.reset();
    }

    fn reset(&self) {
        self.inner.state.send_modify(Session::clear);
        if let Err(err) = self.inner.tokens.remove() {
            warn!(error = %err, "Failed to clear stored token");
        }
    }
}
