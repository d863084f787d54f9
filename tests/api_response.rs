use serde_json::json;
use sqlgate::api::response::{extract_content, extract_usage, parse_model_response, parse_tool_calls};

#[test]
fn test_extract_content_with_content() {
    let response = json!({
        "choices": [{
            "message": {
                "content": "There are 4 reps.",
                "role": "assistant"
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, Some("There are 4 reps.".to_string()));
}

#[test]
fn test_extract_content_without_content() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, None);
}

#[test]
fn test_extract_content_empty_choices() {
    let response = json!({
        "choices": []
    });

    let result = extract_content(&response);
    assert!(result.is_err());
}

#[test]
fn test_parse_tool_calls_with_tools() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "execute_sql",
                            "arguments": "{\"query\": \"SELECT * FROM reps\"}"
                        }
                    }
                ]
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    assert!(tool_calls.is_some());
    let calls = tool_calls.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["id"], "call_123");
}

#[test]
fn test_parse_tool_calls_empty_array() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": []
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    assert!(tool_calls.is_none());
}

#[test]
fn test_parse_model_response_plain_answer() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "No query needed"
            }
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    });

    let parsed = parse_model_response(&response, false).unwrap();
    assert_eq!(parsed.content_str(), "No query needed");
    assert!(!parsed.has_tool_calls());
    assert_eq!(parsed.usage.unwrap().total_tokens, 15);
}

#[test]
fn test_parse_model_response_keeps_raw_argument_text() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "execute_sql", "arguments": "{not json"}
                }]
            }
        }]
    });

    let parsed = parse_model_response(&response, false).unwrap();
    assert_eq!(parsed.content, None);
    assert_eq!(parsed.tool_calls.len(), 1);
    assert_eq!(parsed.tool_calls[0].id, "call_1");
    assert_eq!(parsed.tool_calls[0].function.arguments, "{not json");
}

#[test]
fn test_parse_model_response_stringifies_object_arguments() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [{
                    "id": "call_1",
                    "function": {"name": "execute_sql", "arguments": {"query": "SELECT 1"}}
                }]
            }
        }]
    });

    let parsed = parse_model_response(&response, false).unwrap();
    let arguments: serde_json::Value =
        serde_json::from_str(&parsed.tool_calls[0].function.arguments).unwrap();
    assert_eq!(arguments, json!({"query": "SELECT 1"}));
    assert_eq!(parsed.tool_calls[0].tool_type, "function");
}

#[test]
fn test_parse_model_response_skips_calls_without_id() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {"function": {"name": "execute_sql", "arguments": "{}"}},
                    {"id": "", "function": {"name": "execute_sql", "arguments": "{}"}},
                    {"id": "call_3", "function": {"name": "execute_sql"}}
                ]
            }
        }]
    });

    let parsed = parse_model_response(&response, false).unwrap();
    assert_eq!(parsed.tool_calls.len(), 1);
    assert_eq!(parsed.tool_calls[0].id, "call_3");
    assert_eq!(parsed.tool_calls[0].function.arguments, "");
}

#[test]
fn test_parse_model_response_keeps_nameless_call_with_id() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {"id": "call_2", "function": {"arguments": "{}"}},
                    {"id": "call_4"}
                ]
            }
        }]
    });

    let parsed = parse_model_response(&response, false).unwrap();
    assert_eq!(parsed.tool_calls.len(), 2);
    assert_eq!(parsed.tool_calls[0].id, "call_2");
    assert_eq!(parsed.tool_calls[0].function.name, "");
    assert_eq!(parsed.tool_calls[0].function.arguments, "{}");
    assert_eq!(parsed.tool_calls[1].function.name, "");
}

#[test]
fn test_extract_usage_missing_or_malformed() {
    assert!(extract_usage(&json!({"choices": []})).is_none());
    assert!(extract_usage(&json!({"usage": "lots"})).is_none());

    let partial = extract_usage(&json!({"usage": {"total_tokens": 9}})).unwrap();
    assert_eq!(partial.total_tokens, 9);
    assert_eq!(partial.prompt_tokens, 0);
}
