use crate::backend::{QueryOutcome, SqlBackend};
use crate::error::Result;
use crate::guardrail::SqlGuardrail;
use colored::*;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::args::decode_arguments;
use super::definitions::EXECUTE_SQL_TOOL;

/// What gets fed back to the model for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Rows(Value),
    Error(String),
}

impl ToolResult {
    fn error(message: impl Into<String>) -> Self {
        ToolResult::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    /// JSON text placed in the `tool` message.
    pub fn to_message_content(&self) -> String {
        match self {
            ToolResult::Rows(rows) => rows.to_string(),
            ToolResult::Error(message) => json!({ "error": message }).to_string(),
        }
    }
}

/// A query that passed the guardrail and was sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolExecution {
    pub query: String,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: QueryOutcome,
}

fn serialize_outcome<S: serde::Serializer>(
    outcome: &QueryOutcome,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match outcome {
        QueryOutcome::Rows(rows) => json!({ "rows": rows }).serialize(serializer),
        QueryOutcome::Failed(message) => json!({ "error": message }).serialize(serializer),
    }
}

/// Routes tool calls to their handler and keeps the log of attempted executions.
///
/// One dispatcher lives for exactly one request; it performs no retries.
pub struct ToolDispatcher {
    guardrail: Arc<SqlGuardrail>,
    backend: Arc<dyn SqlBackend>,
    executions: Vec<ToolExecution>,
    verbose: bool,
}

impl ToolDispatcher {
    pub fn new(guardrail: Arc<SqlGuardrail>, backend: Arc<dyn SqlBackend>, verbose: bool) -> Self {
        Self {
            guardrail,
            backend,
            executions: Vec::new(),
            verbose,
        }
    }

    pub fn guardrail(&self) -> &SqlGuardrail {
        &self.guardrail
    }

    pub fn executions(&self) -> &[ToolExecution] {
        &self.executions
    }

    pub fn into_executions(self) -> Vec<ToolExecution> {
        self.executions
    }

    /// Handles one tool call. Only backend transport faults come back as `Err`.
    pub async fn dispatch(&mut self, name: &str, raw_arguments: &str) -> Result<ToolResult> {
        match name {
            EXECUTE_SQL_TOOL => self.execute_sql(raw_arguments).await,
            _ => {
                self.trace(&format!("unknown tool requested: {}", name));
                Ok(ToolResult::error(format!("Unknown tool: {}", name)))
            }
        }
    }

    async fn execute_sql(&mut self, raw_arguments: &str) -> Result<ToolResult> {
        let arguments = match decode_arguments(raw_arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                self.trace(&e.to_string());
                return Ok(ToolResult::error("Invalid tool arguments"));
            }
        };

        let Some(query) = arguments.query() else {
            return Ok(ToolResult::error("Query parameter required"));
        };

        let verdict = self.guardrail.validate(query);
        let operation = match verdict.into_result() {
            Ok(operation) => operation,
            Err(reason) => {
                self.trace(&format!("rejected: {} ({})", reason, preview(query)));
                return Ok(ToolResult::error(reason));
            }
        };

        self.trace(&format!(
            "{} via {}: {}",
            operation,
            self.backend.name(),
            preview(query)
        ));

        let outcome = self.backend.execute(query).await?;
        let result = match &outcome {
            QueryOutcome::Rows(rows) => ToolResult::Rows(rows.clone()),
            QueryOutcome::Failed(message) => {
                if self.verbose {
                    eprintln!("{}", format!("[sql] backend error: {}", message).yellow());
                }
                ToolResult::error(message.clone())
            }
        };

        self.executions.push(ToolExecution {
            query: query.to_string(),
            outcome,
        });

        Ok(result)
    }

    fn trace(&self, message: &str) {
        if self.verbose {
            eprintln!("{}", format!("[sql] {}", message).dimmed());
        }
    }
}

fn preview(query: &str) -> String {
    if query.chars().count() > 100 {
        format!("{}...", query.chars().take(100).collect::<String>())
    } else {
        query.to_string()
    }
}
