//! Porter API client

pub mod auth;
pub mod auth_errors;
pub mod dashboard;
pub mod error;
pub mod middleware;

use crate::config::ClientConfig;
use crate::navigation::Navigator;
use crate::storage::TokenStore;
use auth_errors::AuthErrorHandler;
use error::ClientError;
use middleware::{
    BearerAuth, RequestContext, RequestMiddleware, ResponseMiddleware, UnauthorizedRedirect,
};
use reqwest::{Client, ClientBuilder, Response, Url, header};
use std::sync::Arc;
use std::time::Duration;

/// Porter API client
///
/// Cheap to clone; clones share the connection pool, the pipeline and the auth error hook.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_middleware: Arc<[Arc<dyn RequestMiddleware>]>,
    response_middleware: Arc<[Arc<dyn ResponseMiddleware>]>,
    auth_errors: AuthErrorHandler,
}

impl ApiClient {
    /// Create a client with no middleware
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Create the application client: bearer credential on the way out, login redirect
    /// on a rejected token on the way back
    pub fn with_session_guard(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let auth_errors = AuthErrorHandler::new();

        let mut builder = Self::builder()
            .base_url(&config.base_endpoint)
            .auth_errors(auth_errors.clone())
            .request_middleware(BearerAuth::new(tokens.clone()))
            .response_middleware(UnauthorizedRedirect::new(
                tokens,
                navigator,
                &config.login_path,
                auth_errors,
            ));

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hook fired when the backend rejects the bearer token
    pub fn auth_errors(&self) -> &AuthErrorHandler {
        &self.auth_errors
    }

    /// Create a request builder for a path below the base URL
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request, false).await?;
        decode(response).await
    }

    /// Execute a request the caller is re-issuing after a failure
    ///
    /// Response middleware sees `retried == true`, so a second 401 is handed straight
    /// back instead of triggering another login redirect.
    pub async fn execute_retry<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request, true).await?;
        decode(response).await
    }

    /// Run a request through the pipeline and return the raw response
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
        retried: bool,
    ) -> Result<Response, ClientError> {
        let mut request = request.build()?;

        for middleware in self.request_middleware.iter() {
            middleware.on_request(&mut request).await?;
        }

        let ctx = RequestContext {
            method: request.method().clone(),
            url: request.url().clone(),
            retried,
        };
        debug!(method = %ctx.method, url = %ctx.url, "Sending request");

        let mut outcome = match self.client.execute(request).await {
            Ok(response) => check_status(response).await,
            Err(err) => Err(ClientError::Network(err)),
        };

        for middleware in self.response_middleware.iter() {
            outcome = match outcome {
                Ok(response) => middleware.on_response(response, &ctx).await,
                Err(error) => middleware.on_error(error, &ctx).await,
            };
        }

        if let Err(error) = &outcome {
            debug!(method = %ctx.method, url = %ctx.url, %error, "Request failed");
        }

        outcome
    }
}

/// Turn a non-success status into an error
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status, &body))
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    response_middleware: Vec<Arc<dyn ResponseMiddleware>>,
    auth_errors: Option<AuthErrorHandler>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append a request middleware
    pub fn request_middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request_middleware.push(Arc::new(middleware));
        self
    }

    /// Append a response middleware
    pub fn response_middleware(mut self, middleware: impl ResponseMiddleware + 'static) -> Self {
        self.response_middleware.push(Arc::new(middleware));
        self
    }

    /// Share an auth error hook with middleware built outside the client
    pub fn auth_errors(mut self, handler: AuthErrorHandler) -> Self {
        self.auth_errors = Some(handler);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url}: {e}")))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = ClientBuilder::new().default_headers(headers);

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(concat!("porter/", env!("CARGO_PKG_VERSION")));

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            request_middleware: self.request_middleware.into(),
            response_middleware: self.response_middleware.into(),
            auth_errors: self.auth_errors.unwrap_or_default(),
        })
    }
}
