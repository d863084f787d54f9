//! Guarantees the caller always gets a non-empty, informative answer.
//!
//! Models sometimes run a query and then reply with nothing. The policy first
//! keeps any real answer, then asks the model once to summarize what it
//! retrieved, and finally falls back to a message built from the last query
//! result.

use crate::api::ChatModel;
use crate::backend::QueryOutcome;
use crate::error::Result;
use crate::models::{Message, Usage};
use crate::tools::ToolExecution;
use colored::*;
use serde::Serialize;
use serde_json::Value;

pub const SUMMARY_INSTRUCTION: &str =
    "Please summarize the results you just retrieved, showing the actual data.";

pub const MAX_RAW_PREVIEW_CHARS: usize = 500;

/// Which rule produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryKind {
    ModelAnswer,
    Summarized,
    NoExecutions,
    NoResults,
    RawResults,
    EmptyResponse,
}

pub struct RecoveredAnswer {
    pub kind: RecoveryKind,
    pub message: String,
}

/// Applies the recovery rules in order. Makes at most one extra model call.
pub async fn resolve_final_answer(
    model: &dyn ChatModel,
    messages: &mut Vec<Message>,
    final_content: Option<String>,
    executions: &[ToolExecution],
    usage: &mut Usage,
    verbose: bool,
) -> Result<RecoveredAnswer> {
    if let Some(content) = final_content.filter(|c| !c.trim().is_empty()) {
        return Ok(RecoveredAnswer {
            kind: RecoveryKind::ModelAnswer,
            message: content,
        });
    }

    if !executions.is_empty() {
        if verbose {
            eprintln!(
                "{}",
                "[loop] Empty answer after tool use, asking for a summary".dimmed()
            );
        }
        messages.push(Message::user(SUMMARY_INSTRUCTION));
        let response = model.complete(messages.as_slice()).await?;
        if let Some(u) = &response.usage {
            usage.add(u);
        }
        if let Some(content) = response.content.filter(|c| !c.trim().is_empty()) {
            messages.push(Message::assistant(content.clone()));
            return Ok(RecoveredAnswer {
                kind: RecoveryKind::Summarized,
                message: content,
            });
        }
    }

    if verbose {
        eprintln!(
            "{}",
            "[loop] Model produced no answer, using fallback message".yellow()
        );
    }
    Ok(fallback_answer(executions))
}

/// Deterministic answer derived from the last logged execution.
pub fn fallback_answer(executions: &[ToolExecution]) -> RecoveredAnswer {
    let Some(last) = executions.last() else {
        return RecoveredAnswer {
            kind: RecoveryKind::NoExecutions,
            message: "I'm sorry, I wasn't able to process that request. \
                      Could you try rephrasing your question?"
                .to_string(),
        };
    };

    match &last.outcome {
        QueryOutcome::Rows(Value::Array(rows)) if rows.is_empty() => RecoveredAnswer {
            kind: RecoveryKind::NoResults,
            message: "I searched the database but found no results. \
                      Try a different search term or check the spelling."
                .to_string(),
        },
        QueryOutcome::Rows(rows @ Value::Array(items)) => RecoveredAnswer {
            kind: RecoveryKind::RawResults,
            message: format!(
                "I found {} result{}, but couldn't put together a summary. Here is the raw data:\n{}",
                items.len(),
                if items.len() == 1 { "" } else { "s" },
                truncate_chars(&rows.to_string(), MAX_RAW_PREVIEW_CHARS)
            ),
        },
        _ => RecoveredAnswer {
            kind: RecoveryKind::EmptyResponse,
            message: "The query executed but the response was empty. \
                      Please try rephrasing your question."
                .to_string(),
        },
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(600);
        let truncated = truncate_chars(&text, 500);
        assert_eq!(truncated.chars().count(), 500);
    }
}
