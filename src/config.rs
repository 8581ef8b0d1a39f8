//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TOKEN_FILE_NAME: &str = ".ghostwriter-tokens.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, always ending in `/` so relative endpoint paths join under it.
    pub base_url: String,
    pub token_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build a config for `base_url` with default timeouts and token file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token_file: default_token_file(std::env::var("HOME").ok().as_deref()),
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `GHOSTWRITER_BASE_URL`: default `http://localhost:8000/api/`
    /// - `GHOSTWRITER_TOKEN_FILE`: default `$HOME/.ghostwriter-tokens.json`
    /// - `GHOSTWRITER_REQUEST_TIMEOUT_SECS`: default 30
    /// - `GHOSTWRITER_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for a malformed base URL or timeout.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = normalize_base_url(
            std::env::var("GHOSTWRITER_BASE_URL")
                .ok()
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let token_file = std::env::var_os("GHOSTWRITER_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_token_file(std::env::var("HOME").ok().as_deref()));
        let timeouts = Timeouts {
            request_secs: env_parse_u64("GHOSTWRITER_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("GHOSTWRITER_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { base_url, token_file, timeouts })
    }

    /// Replace the base URL, re-validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if `base_url` is not an http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ApiError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ApiError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ApiError::Config(format!("{key} must be a whole number of seconds, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ApiError::Config(format!("base URL must start with http:// or https://, got '{trimmed}'")));
    }
    Ok(format!("{}/", trimmed.trim_end_matches('/')))
}

fn default_token_file(home: Option<&str>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_TOKEN_FILE_NAME),
        _ => PathBuf::from(DEFAULT_TOKEN_FILE_NAME),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
