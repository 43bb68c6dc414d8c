//! Porter session state
//!
//! The [`SessionStore`] is the only writer of the [`Session`]; everything else reads it
//! through a [`SessionView`] or the [`SessionFacade`].

pub mod auth;

pub use auth::context::{Session, SessionStatus, SessionView};
pub use auth::facade::SessionFacade;
pub use auth::store::SessionStore;
