#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlgate::api::{ChatModel, ModelResponse};
use sqlgate::backend::{QueryOutcome, SqlBackend};
use sqlgate::error::{GatewayError, Result};
use sqlgate::models::{Message, ToolCall};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order, then repeats `fallback` forever.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    fallback: ModelResponse,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: ModelResponse::text(""),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: ModelResponse) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: response,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call(&self, index: usize) -> Vec<Message> {
        self.calls.lock().unwrap()[index].clone()
    }

    pub fn last_call(&self) -> Vec<Message> {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[Message]) -> Result<ModelResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Fails on the call with the given index (0-based) and answers "ok" before that.
pub struct FailingModel {
    fail_at: usize,
    calls: Mutex<usize>,
    before_failure: ModelResponse,
}

impl FailingModel {
    pub fn immediately() -> Self {
        Self::after(0, ModelResponse::text("ok"))
    }

    pub fn after(fail_at: usize, before_failure: ModelResponse) -> Self {
        Self {
            fail_at,
            calls: Mutex::new(0),
            before_failure,
        }
    }
}

#[async_trait]
impl ChatModel for FailingModel {
    async fn complete(&self, _messages: &[Message]) -> Result<ModelResponse> {
        let mut calls = self.calls.lock().unwrap();
        let index = *calls;
        *calls += 1;
        if index >= self.fail_at {
            Err(GatewayError::ApiError {
                status: 503,
                message: "upstream overloaded".to_string(),
            })
        } else {
            Ok(self.before_failure.clone())
        }
    }
}

/// Returns the same outcome for every query and records what it was asked.
pub struct StubBackend {
    outcome: QueryOutcome,
    queries: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn rows(rows: Value) -> Self {
        Self::with_outcome(QueryOutcome::Rows(rows))
    }

    pub fn empty() -> Self {
        Self::rows(json!([]))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_outcome(QueryOutcome::Failed(message.to_string()))
    }

    pub fn with_outcome(outcome: QueryOutcome) -> Self {
        Self {
            outcome,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn execute(&self, query: &str) -> Result<QueryOutcome> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.outcome.clone())
    }
}

/// Backend whose transport is down.
pub struct UnreachableBackend;

#[async_trait]
impl SqlBackend for UnreachableBackend {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn execute(&self, _query: &str) -> Result<QueryOutcome> {
        Err(GatewayError::BackendError("connection refused".to_string()))
    }
}

pub fn sql_call(id: &str, query: &str) -> ToolCall {
    ToolCall::function(id, "execute_sql", json!({ "query": query }).to_string())
}

pub fn sql_request(id: &str, query: &str) -> ModelResponse {
    ModelResponse::tool_call(sql_call(id, query))
}
