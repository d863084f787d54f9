use crate::error::{GatewayError, Result};
use crate::models::{ToolCall, Usage};
use colored::*;
use serde_json::Value;

use super::models::ModelResponse;

fn first_message(response_json: &Value) -> Result<&Value> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| GatewayError::Other("No choices in response".to_string()))?;

    let first_choice = choices
        .first()
        .ok_or_else(|| GatewayError::Other("Empty choices array".to_string()))?;

    first_choice
        .get("message")
        .ok_or_else(|| GatewayError::Other("No message in response".to_string()))
}

/// Parse a non-streaming API response and extract tool calls if present
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<Value>>> {
    let message = first_message(response_json)?;

    if let Some(tool_calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) {
        if !tool_calls.is_empty() {
            return Ok(Some(tool_calls.clone()));
        }
    }

    Ok(None)
}

/// Extract content from a non-streaming response
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string()))
}

/// Token accounting, when the provider reports it
pub fn extract_usage(response_json: &Value) -> Option<Usage> {
    response_json
        .get("usage")
        .and_then(|u| serde_json::from_value(u.clone()).ok())
}

/// Build a typed response, dropping tool calls too malformed to answer.
///
/// A tool call needs an id so its result can be paired with it; calls without
/// one are skipped. A missing function name is kept as an empty name so the
/// dispatcher can report it back. The argument text itself is kept as-is and
/// judged later by the dispatcher.
pub fn parse_model_response(response_json: &Value, verbose: bool) -> Result<ModelResponse> {
    let content = extract_content(response_json)?;
    let raw_calls = parse_tool_calls(response_json)?.unwrap_or_default();

    let mut tool_calls = Vec::with_capacity(raw_calls.len());
    for raw in raw_calls {
        let Some(id) = raw.get("id").and_then(|i| i.as_str()).filter(|i| !i.is_empty()) else {
            if verbose {
                eprintln!(
                    "{}",
                    format!("[AI] Skipping tool call without id: {}", raw).yellow()
                );
            }
            continue;
        };
        let name = raw
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default();

        // Some providers send arguments as an object instead of a JSON string.
        let arguments = match raw.get("function").and_then(|f| f.get("arguments")) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        tool_calls.push(ToolCall::function(id, name, arguments));
    }

    Ok(ModelResponse {
        content,
        tool_calls,
        usage: extract_usage(response_json),
    })
}
