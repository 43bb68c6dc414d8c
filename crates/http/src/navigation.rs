//! Navigation seam
//!
//! An authorization failure sends the user back to the login view. What that means
//! depends on the front end, so the client only asks a [`Navigator`] to do it.

/// Performs a full navigation to an application path
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
