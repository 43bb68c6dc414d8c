//! Request pipeline middleware
//!
//! Request middleware runs in registration order before a request is dispatched and may
//! abort it by returning an error. Response middleware runs in registration order on the
//! outcome: successes go to [`ResponseMiddleware::on_response`], failures (including
//! non-success statuses) go to [`ResponseMiddleware::on_error`]. Either hook may swap a
//! response for an error or the other way round.

use super::auth_errors::AuthErrorHandler;
use super::error::ClientError;
use crate::navigation::Navigator;
use crate::storage::TokenStore;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, Response, Url};
use std::sync::Arc;

/// What response middleware knows about the request behind an outcome
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub url: Url,
    /// Set when the caller is re-issuing a request that already failed
    pub retried: bool,
}

/// Runs before a request is sent
#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    async fn on_request(&self, request: &mut Request) -> Result<(), ClientError>;
}

/// Runs on the outcome of a request
#[async_trait]
pub trait ResponseMiddleware: Send + Sync {
    async fn on_response(
        &self,
        response: Response,
        _ctx: &RequestContext,
    ) -> Result<Response, ClientError> {
        Ok(response)
    }

    async fn on_error(
        &self,
        error: ClientError,
        _ctx: &RequestContext,
    ) -> Result<Response, ClientError> {
        Err(error)
    }
}

/// Attaches the stored bearer token to every outgoing request
pub struct BearerAuth {
    tokens: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl RequestMiddleware for BearerAuth {
    async fn on_request(&self, request: &mut Request) -> Result<(), ClientError> {
        let Some(token) = self.tokens.get()?.filter(|token| !token.is_empty()) else {
            return Ok(());
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Drops the stored token and returns the user to the login view on a 401
///
/// The error is always propagated unchanged; nothing is retried here.
pub struct UnauthorizedRedirect {
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    auth_errors: AuthErrorHandler,
}

impl UnauthorizedRedirect {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
        auth_errors: AuthErrorHandler,
    ) -> Self {
        Self {
            tokens,
            navigator,
            login_path: login_path.into(),
            auth_errors,
        }
    }
}

#[async_trait]
impl ResponseMiddleware for UnauthorizedRedirect {
    async fn on_error(
        &self,
        error: ClientError,
        ctx: &RequestContext,
    ) -> Result<Response, ClientError> {
        if error.is_unauthorized() && !ctx.retried {
            warn!(
                method = %ctx.method,
                url = %ctx.url,
                "Token rejected, clearing stored credential"
            );

            if let Err(err) = self.tokens.remove() {
                warn!(error = %err, "Failed to clear stored token");
            }

            self.auth_errors.trigger();
            self.navigator.navigate(&self.login_path);
        }

        Err(error)
    }
}
