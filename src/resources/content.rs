//! Generated content pieces ("blog posts").

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;

pub const CONTENT_PATH: &str = "content/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPiece {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub persona: Option<u64>,
    #[serde(default)]
    pub persona_name: Option<String>,
    /// `draft`, `published` or `archived`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl ContentPiece {
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

fn content_path(id: u64) -> String {
    format!("{CONTENT_PATH}{id}/")
}

#[derive(Clone)]
pub struct ContentPieces {
    client: ApiClient,
}

impl ContentPieces {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn list(&self) -> Result<Vec<ContentPiece>, ApiError> {
        self.client.get(CONTENT_PATH).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn get(&self, id: u64) -> Result<ContentPiece, ApiError> {
        self.client.get(&content_path(id)).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&content_path(id)).await
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;
