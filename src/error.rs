//! Error taxonomy shared by the transport, the token stores and the API layer.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced an HTTP response (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status. `body` is the server's
    /// error payload, or the raw text wrapped in a JSON string when it is not JSON.
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: Value },

    /// A success response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// A token could not be encoded as an HTTP header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// The token store could not persist or remove credentials.
    #[error("token storage failed: {0}")]
    Storage(String),

    /// A request was rejected locally before reaching the network.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

impl ApiError {
    /// HTTP status carried by this error, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the server rejected the caller's credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
