mod common;

use common::{FailingModel, ScriptedModel};
use serde_json::{json, Value};
use sqlgate::api::ModelResponse;
use sqlgate::backend::QueryOutcome;
use sqlgate::models::{Message, Usage};
use sqlgate::recovery::{
    fallback_answer, resolve_final_answer, RecoveryKind, MAX_RAW_PREVIEW_CHARS,
    SUMMARY_INSTRUCTION,
};
use sqlgate::tools::ToolExecution;

fn execution(outcome: QueryOutcome) -> ToolExecution {
    ToolExecution {
        query: "SELECT * FROM reps".to_string(),
        outcome,
    }
}

#[test]
fn test_fallback_without_executions() {
    let answer = fallback_answer(&[]);
    assert_eq!(answer.kind, RecoveryKind::NoExecutions);
    assert!(answer.message.contains("wasn't able to process"));
}

#[test]
fn test_fallback_with_empty_rows() {
    let answer = fallback_answer(&[execution(QueryOutcome::Rows(json!([])))]);
    assert_eq!(answer.kind, RecoveryKind::NoResults);
    assert!(answer.message.contains("found no results"));
    assert!(answer.message.contains("check the spelling"));
}

#[test]
fn test_fallback_with_rows_counts_and_previews() {
    let rows: Vec<Value> = (0..100)
        .map(|i| json!({"id": i, "name": format!("Rep number {}", i)}))
        .collect();
    let answer = fallback_answer(&[execution(QueryOutcome::Rows(Value::Array(rows)))]);

    assert_eq!(answer.kind, RecoveryKind::RawResults);
    assert!(answer.message.contains("100 results"));
    let (_, preview) = answer.message.split_once('\n').unwrap();
    assert_eq!(preview.chars().count(), MAX_RAW_PREVIEW_CHARS);
    assert!(preview.starts_with(r#"[{"id":0"#));
}

#[test]
fn test_fallback_single_row_is_singular() {
    let answer = fallback_answer(&[execution(QueryOutcome::Rows(json!([{"id": 1}])))]);
    assert!(answer.message.contains("1 result,"));
    assert!(answer.message.ends_with(r#"[{"id":1}]"#));
}

#[test]
fn test_fallback_uses_last_execution() {
    let answer = fallback_answer(&[
        execution(QueryOutcome::Rows(json!([{"id": 1}]))),
        execution(QueryOutcome::Rows(json!([]))),
    ]);
    assert_eq!(answer.kind, RecoveryKind::NoResults);
}

#[test]
fn test_fallback_with_failed_or_non_list_result() {
    for outcome in [
        QueryOutcome::Failed("syntax error".to_string()),
        QueryOutcome::Rows(json!({"count": 3})),
        QueryOutcome::Rows(Value::Null),
    ] {
        let answer = fallback_answer(&[execution(outcome)]);
        assert_eq!(answer.kind, RecoveryKind::EmptyResponse);
        assert!(answer.message.contains("response was empty"));
    }
}

#[tokio::test]
async fn test_model_answer_is_kept_without_extra_call() {
    let model = ScriptedModel::new(vec![]);
    let mut messages = vec![Message::user("hi")];
    let mut usage = Usage::default();

    let answer = resolve_final_answer(
        &model,
        &mut messages,
        Some("Here you go.".to_string()),
        &[execution(QueryOutcome::Rows(json!([])))],
        &mut usage,
        false,
    )
    .await
    .unwrap();

    assert_eq!(answer.kind, RecoveryKind::ModelAnswer);
    assert_eq!(answer.message, "Here you go.");
    assert_eq!(model.call_count(), 0);
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_summary_call_appends_instruction_and_answer() {
    let mut summary = ModelResponse::text("Three reps matched.");
    summary.usage = Some(Usage {
        prompt_tokens: 40,
        completion_tokens: 6,
        total_tokens: 46,
    });
    let model = ScriptedModel::new(vec![summary]);
    let mut messages = vec![Message::user("How many reps?")];
    let mut usage = Usage::default();

    let answer = resolve_final_answer(
        &model,
        &mut messages,
        None,
        &[execution(QueryOutcome::Rows(json!([{}, {}, {}])))],
        &mut usage,
        false,
    )
    .await
    .unwrap();

    assert_eq!(answer.kind, RecoveryKind::Summarized);
    assert_eq!(answer.message, "Three reps matched.");
    assert_eq!(usage.total_tokens, 46);
    assert_eq!(messages[1].content_str(), SUMMARY_INSTRUCTION);
    assert_eq!(messages[2].content_str(), "Three reps matched.");
}

#[tokio::test]
async fn test_blank_summary_falls_through_to_raw_results() {
    let model = ScriptedModel::new(vec![ModelResponse::text("  \n")]);
    let mut messages = vec![Message::user("Who is rep 7?")];
    let mut usage = Usage::default();

    let answer = resolve_final_answer(
        &model,
        &mut messages,
        Some("".to_string()),
        &[execution(QueryOutcome::Rows(json!([{"id": 7}])))],
        &mut usage,
        false,
    )
    .await
    .unwrap();

    assert_eq!(model.call_count(), 1);
    assert_eq!(answer.kind, RecoveryKind::RawResults);
    assert!(answer.message.contains(r#"{"id":7}"#));
}

#[tokio::test]
async fn test_summary_call_failure_propagates() {
    let model = FailingModel::immediately();
    let mut messages = vec![Message::user("?")];
    let mut usage = Usage::default();

    let result = resolve_final_answer(
        &model,
        &mut messages,
        None,
        &[execution(QueryOutcome::Rows(json!([])))],
        &mut usage,
        false,
    )
    .await;

    assert!(result.is_err());
}
