//! Authenticated request client.
//!
//! DESIGN
//! ======
//! `ApiClient` decorates a [`Transport`] with two behaviours:
//!
//! 1. Every request carries `Authorization: Bearer <access token>` when the
//!    token store holds one.
//! 2. A 401 triggers at most one refresh-and-retry per original request. The
//!    retry marker on the descriptor is set before the refresh is attempted,
//!    so the replay's own 401 is handed back to the caller untouched.
//!
//! A failed refresh returns the original 401 and leaves stored tokens alone;
//! deciding to log out belongs to the caller.
//!
//! CONCURRENCY
//! ===========
//! Clones share one transport and one token store. Requests that hit 401 at
//! the same time each run their own refresh; the last successful refresh wins
//! the access-token slot. There is no coalescing.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{self, AccessToken, TokenPair};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::token_store::{TokenKind, TokenStore};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    /// Build a client over the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), tokens))
    }

    /// Send `request` with bearer attachment and single-shot refresh-and-retry.
    ///
    /// Any HTTP status comes back as `Ok`; callers that want non-2xx as an
    /// error use [`ApiClient::send_json`] or [`ApiResponse::error_for_status`].
    ///
    /// If the store cannot save a refreshed access token, the failure is
    /// logged and the replay still goes out with the new token; the store
    /// keeps its previous value and the next request refreshes again.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`] if the original or replayed request got no
    /// response, [`ApiError::InvalidHeader`] if a stored token is not a valid
    /// header value.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Some(token) = self.tokens.get(TokenKind::Access) {
            request.set_bearer(&token)?;
        }

        loop {
            let response = self.transport.dispatch(&request).await?;
            if response.status != StatusCode::UNAUTHORIZED || request.retried {
                return Ok(response);
            }

            request.retried = true;
            let Some(refresh_token) = self.tokens.get(TokenKind::Refresh) else {
                tracing::debug!(path = %request.path, "401 with no refresh token stored");
                return Ok(response);
            };

            match self.refresh_access_token(&refresh_token).await {
                Ok(AccessToken { access }) => {
                    if let Err(e) = self.tokens.set(TokenKind::Access, &access) {
                        tracing::warn!(error = %e, "refreshed access token could not be stored");
                    }
                    request.set_bearer(&access)?;
                    tracing::info!(path = %request.path, "access token refreshed; replaying request");
                }
                Err(e) => {
                    tracing::warn!(path = %request.path, error = %e, "token refresh failed");
                    return Ok(response);
                }
            }
        }
    }

    /// Send and decode a success body as `T`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] for a non-2xx final response, [`ApiError::Decode`]
    /// if the body does not match `T`, plus anything [`ApiClient::send`] returns.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.error_for_status()?.json()
    }

    /// Send and discard the success body.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] for a non-2xx final response.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await?.error_for_status()?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ApiClient::send_json`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send_json`].
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        self.send_json(ApiRequest::post(path, body)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send_json`].
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        self.send_json(ApiRequest::put(path, body)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send_empty`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(path)).await
    }

    /// Persist a freshly issued pair.
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if the store cannot persist the pair.
    pub fn store_credentials(&self, pair: &TokenPair) -> Result<(), ApiError> {
        self.tokens.set(TokenKind::Access, &pair.access)?;
        self.tokens.set(TokenKind::Refresh, &pair.refresh)
    }

    /// Forget both tokens.
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if persisted tokens cannot be removed.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.tokens.clear()
    }

    /// An access token is stored. Says nothing about whether it is still valid.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens.get(TokenKind::Access).is_some()
    }

    // Dispatched straight on the transport: no bearer header and no retry path.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken, ApiError> {
        let response = self
            .transport
            .dispatch(&auth::refresh_request(refresh_token))
            .await?;
        auth::parse_refresh(response)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
