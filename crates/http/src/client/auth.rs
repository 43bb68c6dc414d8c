//! Authentication endpoints

use super::{ApiClient, ClientError};
use crate::types::{CredentialsRequest, LoginResponse, ProtectedResponse, RegisterResponse};
use reqwest::Method;

impl ApiClient {
    /// Exchange credentials for a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = self
            .request(Method::POST, "/api/login")
            .json(&CredentialsRequest { username, password });
        self.execute(request).await
    }

    /// Ask the backend who the current bearer token belongs to
    pub async fn protected(&self) -> Result<ProtectedResponse, ClientError> {
        let request = self.request(Method::GET, "/api/protected");
        self.execute(request).await
    }

    /// Create an account
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let request = self
            .request(Method::POST, "/api/register")
            .json(&CredentialsRequest { username, password });
        self.execute(request).await
    }
}
