//! Ghostwriter API client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The Ghostwriter backend turns writing samples into personas and writes blog
//! posts in a persona's voice. This crate is the client side:
//!
//! - [`token_store`]: where the access/refresh pair lives.
//! - [`transport`]: request descriptors and the reqwest-backed HTTP seam.
//! - [`client`]: bearer attachment plus single-shot refresh-and-retry on 401.
//! - [`auth`]: login, register and refresh.
//! - [`resources`]: persona and content endpoints.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod token_store;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use auth::{AccessToken, AuthService, TokenPair};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use resources::{ContentPiece, ContentPieces, Persona, Personas};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenKind, TokenStore};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
