//! Auth endpoints: login, register and access-token refresh.
//!
//! These are stateless pass-throughs. Persisting the returned pair is the
//! caller's decision (see [`ApiClient::store_credentials`]).

use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse};

pub const LOGIN_PATH: &str = "token/";
pub const REFRESH_PATH: &str = "token/refresh/";
pub const REGISTER_PATH: &str = "register/";

/// Credential pair issued by a successful login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Payload of a successful refresh; the refresh token itself is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

/// Descriptor for `POST token/refresh/`. Built with the retry marker set: a
/// refresh that fails is never itself refreshed.
pub(crate) fn refresh_request(refresh_token: &str) -> ApiRequest {
    ApiRequest::post(REFRESH_PATH, json!({ "refresh": refresh_token })).without_retry()
}

pub(crate) fn parse_refresh(response: ApiResponse) -> Result<AccessToken, ApiError> {
    response.error_for_status()?.json()
}

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for an access/refresh pair.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] with the server's payload on rejection, or a
    /// transport/decode error.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH, json!({ "username": username, "password": password }));
        self.client.send_json(request).await
    }

    /// Create an account. The success payload is whatever the server returns.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] with the server's payload on rejection.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<Value, ApiError> {
        let request = ApiRequest::post(
            REGISTER_PATH,
            json!({ "username": username, "password": password, "email": email }),
        );
        let response = self.client.send(request).await?.error_for_status()?;
        Ok(response.body_value())
    }

    /// Mint a new access token from `refresh_token`. Not retried on failure.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] if the refresh token is rejected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, ApiError> {
        let response = self.client.send(refresh_request(refresh_token)).await?;
        parse_refresh(response)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
