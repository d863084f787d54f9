//! Request boundary: JSON-shaped request in, JSON-shaped response out.
//!
//! Input problems are rejected here before the orchestrator runs. Fatal faults
//! from the orchestrator are logged in full and replaced by a generic message.

use crate::backend::QueryOutcome;
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::models::Usage;
use crate::orchestrator::{seed_history, Orchestrator};
use crate::recovery::RecoveryKind;
use crate::session::{append_exchange, load_history, ConversationStore, DEFAULT_HISTORY_LIMIT};
use crate::tools::ToolExecution;
use colored::*;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, I ran into a problem processing your request. Please try again.";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a data assistant for a commission-tracking \
dashboard. Answer questions about funded deals, sales reps and commission payouts by querying \
the database with the execute_sql tool. Always use one statement per call, prefer ILIKE for \
name searches, and show the actual data you found in your answer.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Parses `{"message": "...", "conversation_id": "..."}` and checks it.
    pub fn from_json(body: &Value, max_length: usize) -> Result<Self> {
        let message = match body.get("message") {
            None | Some(Value::Null) => {
                return Err(GatewayError::InvalidInput("Message is required".into()))
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(GatewayError::InvalidInput("Message must be a string".into()))
            }
        };

        let conversation_id = match body.get("conversation_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(GatewayError::InvalidInput(
                    "conversation_id must be a string".into(),
                ))
            }
        };

        let request = Self {
            message,
            conversation_id,
        };
        request.validate(max_length)?;
        Ok(request)
    }

    pub fn validate(&self, max_length: usize) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(GatewayError::InvalidInput("Message is required".into()));
        }
        if self.message.chars().count() > max_length {
            return Err(GatewayError::InvalidInput(format!(
                "Message too long (max {} characters)",
                max_length
            )));
        }
        if let Some(id) = &self.conversation_id {
            Uuid::parse_str(id).map_err(|_| {
                GatewayError::InvalidInput("conversation_id must be a UUID".into())
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExecutedQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ToolExecution> for ExecutedQuery {
    fn from(execution: &ToolExecution) -> Self {
        let (row_count, error) = match &execution.outcome {
            QueryOutcome::Rows(Value::Array(rows)) => (Some(rows.len()), None),
            QueryOutcome::Rows(_) => (None, None),
            QueryOutcome::Failed(message) => (None, Some(message.clone())),
        };
        Self {
            query: execution.query.clone(),
            row_count,
            error,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseMetadata {
    pub iterations: usize,
    pub tool_executions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<RecoveryKind>,
    pub usage: Usage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<ExecutedQuery>,
    pub error: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub conversation_id: String,
    pub metadata: ResponseMetadata,
}

pub struct Gateway {
    orchestrator: Orchestrator,
    store: Arc<dyn ConversationStore>,
    system_prompt: String,
    max_message_length: usize,
    history_limit: usize,
    verbose: bool,
}

impl Gateway {
    pub fn new(orchestrator: Orchestrator, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_message_length: 2000,
            history_limit: DEFAULT_HISTORY_LIMIT,
            verbose: false,
        }
    }

    pub fn from_config(
        config: &Config,
        orchestrator: Orchestrator,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        let mut gateway = Self::new(orchestrator, store)
            .with_max_message_length(config.max_message_length)
            .with_history_limit(config.history_limit)
            .with_verbose(config.verbose);
        if let Some(prompt) = &config.system_prompt {
            gateway.system_prompt = prompt.clone();
        }
        gateway
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Runs one request. Only input errors come back as `Err`.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse> {
        request.validate(self.max_message_length)?;

        let conversation_id = request
            .conversation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let prior = match load_history(self.store.as_ref(), &conversation_id, self.history_limit) {
            Ok(prior) => prior,
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("[store] Could not load history for {}: {}", conversation_id, e)
                        .yellow()
                );
                Vec::new()
            }
        };

        if self.verbose {
            eprintln!(
                "{}",
                format!(
                    "[loop] Conversation {} with {} prior messages",
                    conversation_id,
                    prior.len()
                )
                .dimmed()
            );
        }

        let messages = seed_history(&self.build_system_prompt(), prior, &request.message);

        let outcome = match self.orchestrator.run(messages).await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("[gateway] Request failed in conversation {}: {}", conversation_id, e)
                        .red()
                );
                return Ok(ChatResponse {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                    conversation_id,
                    metadata: ResponseMetadata {
                        error: true,
                        ..Default::default()
                    },
                });
            }
        };

        if let Err(e) = append_exchange(
            self.store.as_ref(),
            &conversation_id,
            &request.message,
            &outcome.message,
        ) {
            eprintln!(
                "{}",
                format!("[store] Failed to save conversation {}: {}", conversation_id, e).yellow()
            );
        }

        Ok(ChatResponse {
            message: outcome.message,
            conversation_id,
            metadata: ResponseMetadata {
                iterations: outcome.iterations,
                tool_executions: outcome.executions.len(),
                recovery: Some(outcome.recovery),
                usage: outcome.usage,
                queries: outcome.executions.iter().map(ExecutedQuery::from).collect(),
                error: false,
            },
        })
    }

    /// JSON in, (HTTP-style status, JSON out).
    pub async fn handle_json(&self, body: &Value) -> (u16, Value) {
        let request = match ChatRequest::from_json(body, self.max_message_length) {
            Ok(request) => request,
            Err(e) => return (400, json!({ "error": e.to_string() })),
        };

        match self.handle(request).await {
            Ok(response) => {
                let status = if response.metadata.error { 500 } else { 200 };
                let body = serde_json::to_value(&response)
                    .unwrap_or_else(|_| json!({ "message": GENERIC_FAILURE_MESSAGE }));
                (status, body)
            }
            Err(e) if e.is_caller_facing() => (400, json!({ "error": e.to_string() })),
            Err(e) => {
                eprintln!("{}", format!("[gateway] Unexpected failure: {}", e).red());
                (500, json!({ "error": GENERIC_FAILURE_MESSAGE }))
            }
        }
    }

    fn build_system_prompt(&self) -> String {
        let tables = self
            .orchestrator
            .guardrail()
            .allowed_tables()
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Today's date is {}.\n\n{}\n\nTables you can query: {}.",
            Config::get_current_date(),
            self.system_prompt,
            tables
        )
    }
}
