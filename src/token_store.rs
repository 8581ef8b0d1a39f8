//! Token stores: where the access/refresh credential pair lives.
//!
//! SYSTEM CONTEXT
//! ==============
//! The request client reads the access token on every dispatch and the refresh
//! token on a 401. Stores are opaque string holders: nothing here inspects or
//! validates token contents.
//!
//! `FileTokenStore` is the durable variant. It keeps the pair as one JSON
//! object under the `access_token` and `refresh_token` keys so a later process
//! picks up where the last one left off.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Persisted credential holder shared by every in-flight request.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the value cannot be persisted.
    fn set(&self, kind: TokenKind, value: &str) -> Result<(), ApiError>;

    /// Remove both tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if persisted state cannot be removed.
    fn clear(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredTokens {
    fn get(&self, kind: TokenKind) -> Option<String> {
        match kind {
            TokenKind::Access => self.access_token.clone(),
            TokenKind::Refresh => self.refresh_token.clone(),
        }
    }

    fn set(&mut self, kind: TokenKind, value: &str) {
        let slot = match kind {
            TokenKind::Access => &mut self.access_token,
            TokenKind::Refresh => &mut self.refresh_token,
        };
        *slot = Some(value.to_owned());
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local store. Tokens vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(kind)
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<(), ApiError> {
        self.tokens
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .set(kind, value);
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self
            .tokens
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = StoredTokens::default();
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-file-backed store. Reads are served from an in-memory copy loaded at
/// open; every mutation writes a sibling temp file readable only by the owner
/// and renames it over the store, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: RwLock<StoredTokens>,
}

impl FileTokenStore {
    /// Open the store at `path`. A missing file means no tokens; an unreadable
    /// or corrupt file is logged and treated as empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tokens = load_tokens(&path);
        Self { path, tokens: RwLock::new(tokens) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(&self.path, &e))?;
        }
        let json = serde_json::to_vec_pretty(tokens).map_err(|e| ApiError::Storage(e.to_string()))?;
        let tmp = temp_path(&self.path);
        write_private(&tmp, &json)
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                storage_error(&self.path, &e)
            })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(kind)
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<(), ApiError> {
        let mut tokens = self
            .tokens
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut next = tokens.clone();
        next.set(kind, value);
        self.persist(&next)?;
        *tokens = next;
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut tokens = self
            .tokens
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(storage_error(&self.path, &e)),
        }
        *tokens = StoredTokens::default();
        Ok(())
    }
}

fn load_tokens(path: &Path) -> StoredTokens {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredTokens::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "token file unreadable; starting without credentials");
            return StoredTokens::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "token file corrupt; starting without credentials");
            StoredTokens::default()
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    // Owner read/write only; the file holds a long-lived refresh token.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on create; tighten a temp file left by an earlier crash.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

fn storage_error(path: &Path, err: &std::io::Error) -> ApiError {
    ApiError::Storage(format!("{}: {err}", path.display()))
}

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;
