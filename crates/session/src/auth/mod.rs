//! Authentication session

pub mod context;
pub mod facade;
pub mod store;

pub use context::{Session, SessionStatus, SessionView};
pub use facade::SessionFacade;
pub use store::SessionStore;
