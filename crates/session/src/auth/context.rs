//! Session entity and read-only views of it

use porter_http::Identity;
use std::fmt;
use tokio::sync::watch;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Anonymous,
    /// A login is in flight
    Authenticating,
    Authenticated,
}

/// Authentication state
///
/// `authenticated` implies `token` is present. The reverse need not hold: a restored
/// token waiting on its identity check is a valid state.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<Identity>,
    pub token: Option<String>,
    pub status: SessionStatus,
}

impl Session {
    /// Session as rebuilt from the durable slot at startup
    pub fn restored(token: Option<String>) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Reset to the empty anonymous state
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.authenticated)
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("status", &self.status)
            .finish()
    }
}

/// Read-only handle on the current session
#[derive(Debug, Clone)]
pub struct SessionView {
    rx: watch::Receiver<Session>,
}

impl SessionView {
    pub(crate) const fn new(rx: watch::Receiver<Session>) -> Self {
        Self { rx }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().authenticated
    }

    pub fn user(&self) -> Option<Identity> {
        self.rx.borrow().user.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.rx.borrow().status
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
