//! Auth error hook
//!
//! Lets the owner of session state react to a rejected token no matter which call
//! observed it, without every caller checking for it.

use std::sync::{Arc, Mutex, PoisonError};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Single-slot callback fired when the backend rejects the bearer token
#[derive(Clone, Default)]
pub struct AuthErrorHandler {
    callback: Arc<Mutex<Option<Callback>>>,
}

impl AuthErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback, replacing any previous one
    pub fn set_callback(&self, callback: Callback) {
        if self.lock().replace(callback).is_some() {
            debug!("Replaced registered auth error callback");
        }
    }

    /// Clear the callback
    pub fn clear_callback(&self) {
        self.lock().take();
    }

    /// Fire the callback, if one is set
    pub fn trigger(&self) {
        // Clone out so the callback may replace itself
        let callback = self.lock().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Callback>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AuthErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthErrorHandler")
            .field("registered", &self.lock().is_some())
            .finish()
    }
}
