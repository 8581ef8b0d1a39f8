//! Persona endpoints: list, fetch, create from a writing sample, edit, delete,
//! and content generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::content::ContentPiece;
use crate::client::ApiClient;
use crate::error::ApiError;

pub const PERSONAS_PATH: &str = "personas/";

const READ_ONLY_FIELDS: [&str; 4] = ["id", "content_count", "created_at", "updated_at"];

/// A backend-analysed writing persona.
///
/// Only identifying fields are typed. The dozens of style attributes
/// (`vocabulary_complexity`, `tone`, `formality_level`, ...) are carried
/// verbatim in `attributes` so a fetch/edit/save cycle never drops one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content_count: Option<u64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Persona {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set one editable field. `name`, `description` and `is_active` update the
    /// typed fields; anything else lands in `attributes`.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidInput`] for server-managed fields or a value of the
    /// wrong JSON type for a typed field.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), ApiError> {
        if READ_ONLY_FIELDS.contains(&key) {
            return Err(ApiError::InvalidInput("field is managed by the server"));
        }
        match key {
            "name" => self.name = optional_string(value)?,
            "description" => self.description = optional_string(value)?,
            "is_active" => {
                self.is_active = match value {
                    Value::Null => None,
                    Value::Bool(b) => Some(b),
                    _ => return Err(ApiError::InvalidInput("is_active must be true or false")),
                };
            }
            _ => {
                self.attributes.insert(key.to_owned(), value);
            }
        }
        Ok(())
    }
}

fn optional_string(value: Value) -> Result<Option<String>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        // Bare words on the command line may parse as numbers or bools.
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(ApiError::InvalidInput("expected a string value")),
    }
}

fn persona_path(id: u64) -> String {
    format!("{PERSONAS_PATH}{id}/")
}

#[derive(Clone)]
pub struct Personas {
    client: ApiClient,
}

impl Personas {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn list(&self) -> Result<Vec<Persona>, ApiError> {
        self.client.get(PERSONAS_PATH).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn get(&self, id: u64) -> Result<Persona, ApiError> {
        self.client.get(&persona_path(id)).await
    }

    /// Upload a writing sample; the backend analyses it into a new persona.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidInput`] for a blank name or sample, otherwise any
    /// request error (the server answers 400 when analysis fails).
    pub async fn create_from_sample(&self, name: &str, writing_sample: &str) -> Result<Persona, ApiError> {
        let name = name.trim();
        let writing_sample = writing_sample.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("persona name is required"));
        }
        if writing_sample.is_empty() {
            return Err(ApiError::InvalidInput("writing sample is required"));
        }
        self.client
            .post(PERSONAS_PATH, json!({ "name": name, "writing_sample": writing_sample }))
            .await
    }

    /// Replace a persona with `persona` (full `PUT`).
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from serialization or the request.
    pub async fn update(&self, persona: &Persona) -> Result<Persona, ApiError> {
        let body = serde_json::to_value(persona).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.client.put(&persona_path(persona.id), body).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&persona_path(id)).await
    }

    /// Ask the backend to write a post in this persona's voice. The result is
    /// stored server-side as a draft content piece and returned.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidInput`] for a blank prompt, otherwise any request
    /// error (the server answers 500 when generation fails).
    pub async fn generate_content(&self, id: u64, prompt: &str) -> Result<ContentPiece, ApiError> {
        if prompt.trim().is_empty() {
            return Err(ApiError::InvalidInput("prompt is required"));
        }
        let path = format!("{}generate-content/", persona_path(id));
        self.client.post(&path, json!({ "prompt": prompt })).await
    }
}

#[cfg(test)]
#[path = "personas_test.rs"]
mod personas_test;
