//! Request and response payloads for the deploy console API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Identity the backend reports for the bearer of a token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Credentials posted to the login and register endpoints
#[derive(Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login response
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Any additional fields the backend returns
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"<redacted>")
            .field("extra", &self.extra)
            .finish()
    }
}

/// Response of the protected identity check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub logged_in_as: Identity,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}

/// Host resource usage reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStats {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub uptime: String,
}

/// Repository configuration keyed by repository name
pub type Repositories = BTreeMap<String, JsonValue>;

/// Log excerpts for a single repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoLogs {
    #[serde(default)]
    pub deployment_logs: Vec<String>,
    #[serde(default)]
    pub access_logs: Vec<String>,
    #[serde(default)]
    pub error_logs: Vec<String>,
}
