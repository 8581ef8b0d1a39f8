//! Typed wrappers for the persona and content endpoints.
//!
//! Plain pass-throughs over [`ApiClient`](crate::client::ApiClient): build the
//! path, send, decode. Persona attribute semantics belong to the backend, so
//! attributes beyond the identifying fields stay opaque JSON.

pub mod content;
pub mod personas;

pub use content::{ContentPiece, ContentPieces};
pub use personas::{Persona, Personas};
