//! Porter HTTP transport
//!
//! A preconfigured client for the Porter deploy console API. Every call runs through an
//! ordered request pipeline: outbound middleware attaches the bearer credential from the
//! durable token slot, inbound middleware reacts to authorization failures by clearing
//! that slot and sending the user back to the login view.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod navigation;
pub mod storage;
pub mod types;

pub use client::error::ClientError;
pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use navigation::Navigator;
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
pub use types::Identity;
