//! Read-mostly handle for front ends

use super::context::{Session, SessionView};
use super::store::SessionStore;
use porter_http::types::LoginResponse;
use porter_http::{ClientError, Identity};
use tracing::debug;

/// What a front end needs from the session: read-only state, login, logout and
/// startup rehydration
#[derive(Clone)]
pub struct SessionFacade {
    store: SessionStore,
    view: SessionView,
}

impl SessionFacade {
    pub fn new(store: SessionStore) -> Self {
        let view = store.subscribe();
        Self { store, view }
    }

    pub fn is_authenticated(&self) -> bool {
        self.view.is_authenticated()
    }

    pub fn user(&self) -> Option<Identity> {
        self.view.user()
    }

    pub fn snapshot(&self) -> Session {
        self.view.snapshot()
    }

    /// A fresh view for callers that want to await changes
    pub fn view(&self) -> SessionView {
        self.store.subscribe()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.store.login(username, password).await
    }

    pub fn logout(&self) {
        self.store.logout();
    }

    /// Pick up a session left behind by a previous run
    ///
    /// Checks the identity only when a token was restored. Concurrent calls each issue
    /// their own request; whichever finishes last decides the session.
    pub async fn init_auth(&self) {
        if self.store.snapshot().token.is_some() {
            self.store.fetch_user_data().await;
        } else {
            debug!("No stored token, staying anonymous");
        }
    }
}
