//! Scripted transport shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::token_store::{MemoryTokenStore, TokenKind, TokenStore};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Replays canned responses in order and records every request it sees.
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<ApiResponse, ApiError>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) })
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {} {}", request.method, request.path))
    }
}

pub(crate) fn reply(status: u16, body: Value) -> Result<ApiResponse, ApiError> {
    let body = if body.is_null() { String::new() } else { body.to_string() };
    Ok(ApiResponse::new(StatusCode::from_u16(status).unwrap(), body))
}

pub(crate) fn unauthorized() -> Result<ApiResponse, ApiError> {
    reply(401, serde_json::json!({ "detail": "Given token not valid for any token type" }))
}

pub(crate) fn store_with(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryTokenStore> {
    let store = MemoryTokenStore::new();
    if let Some(access) = access {
        store.set(TokenKind::Access, access).unwrap();
    }
    if let Some(refresh) = refresh {
        store.set(TokenKind::Refresh, refresh).unwrap();
    }
    Arc::new(store)
}

pub(crate) fn client_over(transport: &Arc<ScriptedTransport>, store: &Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(transport.clone(), store.clone())
}
