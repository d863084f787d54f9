use crate::api::ChatModel;
use crate::backend::SqlBackend;
use crate::error::Result;
use crate::guardrail::SqlGuardrail;
use crate::models::{Message, Usage};
use crate::recovery::{resolve_final_answer, RecoveryKind};
use crate::tools::{ToolDispatcher, ToolExecution};
use colored::*;
use std::sync::Arc;

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Drives one request: model call, at most one tool dispatch per turn, repeat,
/// then recovery. Holds no per-request state, so one instance can serve many
/// requests concurrently.
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    backend: Arc<dyn SqlBackend>,
    guardrail: Arc<SqlGuardrail>,
    max_iterations: usize,
    verbose: bool,
}

pub struct ConversationOutcome {
    pub message: String,
    pub recovery: RecoveryKind,
    /// Number of tool dispatches performed.
    pub iterations: usize,
    pub executions: Vec<ToolExecution>,
    pub usage: Usage,
    /// Full in-flight history, tool traffic included.
    pub transcript: Vec<Message>,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn ChatModel>,
        backend: Arc<dyn SqlBackend>,
        guardrail: Arc<SqlGuardrail>,
    ) -> Self {
        Self {
            model,
            backend,
            guardrail,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn guardrail(&self) -> &SqlGuardrail {
        &self.guardrail
    }

    pub async fn run(&self, mut messages: Vec<Message>) -> Result<ConversationOutcome> {
        let mut dispatcher =
            ToolDispatcher::new(self.guardrail.clone(), self.backend.clone(), self.verbose);
        let mut usage = Usage::default();
        let mut iterations = 0;

        let final_content = loop {
            let response = self.model.complete(&messages).await?;
            if let Some(u) = &response.usage {
                usage.add(u);
            }

            // Extra calls in the same turn are dropped; the model sees only the
            // first call and its result and can ask again next turn.
            let Some(call) = response.tool_calls.first().cloned() else {
                break response.content;
            };

            if response.tool_calls.len() > 1 && self.verbose {
                eprintln!(
                    "{}",
                    format!(
                        "[loop] Model requested {} tool calls, dispatching only '{}'",
                        response.tool_calls.len(),
                        call.id
                    )
                    .yellow()
                );
            }

            if self.verbose {
                eprintln!(
                    "{}",
                    format!(
                        "[loop] Iteration {}/{}: calling tool '{}'",
                        iterations + 1,
                        self.max_iterations,
                        call.function.name
                    )
                    .dimmed()
                );
            }

            let result = dispatcher
                .dispatch(&call.function.name, &call.function.arguments)
                .await?;

            let call_id = call.id.clone();
            messages.push(Message::assistant_tool_call(response.content.clone(), call));
            messages.push(Message::tool_result(call_id, result.to_message_content()));
            iterations += 1;

            if iterations >= self.max_iterations {
                if self.verbose {
                    eprintln!(
                        "{}",
                        format!("[loop] Reached iteration cap ({})", self.max_iterations).yellow()
                    );
                }
                break response.content;
            }
        };

        let executions = dispatcher.into_executions();
        let answer = resolve_final_answer(
            self.model.as_ref(),
            &mut messages,
            final_content,
            &executions,
            &mut usage,
            self.verbose,
        )
        .await?;

        Ok(ConversationOutcome {
            message: answer.message,
            recovery: answer.kind,
            iterations,
            executions,
            usage,
            transcript: messages,
        })
    }
}

/// Initial window: system prompt, then prior turns oldest first, then the new message.
pub fn seed_history(system_prompt: &str, prior: Vec<Message>, user_message: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(prior.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(prior.into_iter().filter(|m| m.is_conversational()));
    messages.push(Message::user(user_message));
    messages
}
