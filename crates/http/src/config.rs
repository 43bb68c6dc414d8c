//! Client configuration

use crate::storage::ACCESS_TOKEN_KEY;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `PORTER_BASE_ENDPOINT`
pub const ENV_PREFIX: &str = "PORTER";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target origin for all API calls
    pub base_endpoint: String,

    /// Path the user is sent to when the backend rejects the token
    pub login_path: String,

    /// Key of the durable token slot
    pub token_key: String,

    /// Per-request timeout in seconds; unset means no timeout
    pub timeout_secs: Option<u64>,

    /// Directory holding the token file; unset means the platform data directory
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_endpoint: "http://localhost:3000".to_string(),
            login_path: "/login".to_string(),
            token_key: ACCESS_TOKEN_KEY.to_string(),
            timeout_secs: None,
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults, an optional file and `PORTER_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("base_endpoint", defaults.base_endpoint)?
            .set_default("login_path", defaults.login_path)?
            .set_default("token_key", defaults.token_key)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder.add_source(env).build()?.try_deserialize()
    }
}
