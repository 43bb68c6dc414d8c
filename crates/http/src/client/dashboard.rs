//! Dashboard endpoints (all require a bearer token)

use super::{ApiClient, ClientError};
use crate::types::{RepoLogs, Repositories, ServerStats};
use reqwest::Method;

impl ApiClient {
    /// Host resource usage
    pub async fn stats(&self) -> Result<ServerStats, ClientError> {
        let request = self.request(Method::GET, "/api/stats");
        self.execute(request).await
    }

    /// Configured repositories
    pub async fn repositories(&self) -> Result<Repositories, ClientError> {
        let request = self.request(Method::GET, "/api/repos");
        self.execute(request).await
    }

    /// Deployment and web server logs for one repository
    pub async fn repository_logs(&self, name: &str) -> Result<RepoLogs, ClientError> {
        if name.is_empty() || name.contains('/') {
            return Err(ClientError::InvalidInput(format!(
                "invalid repository name: {name:?}"
            )));
        }

        let request = self.request(Method::GET, &format!("/api/logs/{name}"));
        self.execute(request).await
    }
}
