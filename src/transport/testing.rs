//! In-memory transport for unit tests
//!
//! Responses are queued up front and handed out in order; every request is
//! kept so tests can assert on what was sent.

use super::{ApiRequest, ApiResponse, Transport};
use crate::types::BankError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_ok(&self, body: &str) {
        self.push(ApiResponse::ok(body));
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.push(ApiResponse {
            status,
            body: body.to_string(),
            cookies: Default::default(),
        });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, BankError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BankError::Transport {
                message: format!("no scripted response for {}", request.fixture),
            })
    }
}
