use super::{QueryOutcome, SqlBackend};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use colored::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// Runs statements through a PostgREST-style `rpc/execute_sql` function using a service key.
pub struct HttpRpcBackend {
    client: reqwest::Client,
    rpc_url: String,
    verbose: bool,
}

impl HttpRpcBackend {
    pub fn new(rpc_url: &str, service_key: &str, timeout_secs: u64, verbose: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_key))
                .map_err(|e| GatewayError::ConfigError(format!("Invalid service key: {}", e)))?,
        );
        headers.insert(
            "apikey",
            HeaderValue::from_str(service_key)
                .map_err(|e| GatewayError::ConfigError(format!("Invalid service key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            verbose,
        })
    }
}

#[async_trait]
impl SqlBackend for HttpRpcBackend {
    fn name(&self) -> &str {
        "http-rpc"
    }

    async fn execute(&self, query: &str) -> Result<QueryOutcome> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if self.verbose {
            eprintln!(
                "{}",
                format!("[sql] backend status {} ({} bytes)", status, body.len()).dimmed()
            );
        }

        outcome_from_status(status, &body)
    }
}

/// Maps an RPC reply onto a query outcome or a transport fault.
pub(crate) fn outcome_from_status(status: StatusCode, body: &str) -> Result<QueryOutcome> {
    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(QueryOutcome::Rows(Value::Array(vec![])));
        }
        let rows: Value = serde_json::from_str(body).map_err(|e| {
            GatewayError::BackendError(format!("Unreadable result payload: {}", e))
        })?;
        return Ok(QueryOutcome::Rows(rows));
    }

    // Gateway-level failures say nothing about the query; treat them as transport faults.
    if matches!(status.as_u16(), 401 | 403 | 502 | 503 | 504) {
        return Err(GatewayError::BackendError(format!(
            "status {}: {}",
            status.as_u16(),
            body
        )));
    }

    Ok(QueryOutcome::Failed(error_message_from_body(body)))
}

/// Pulls the most useful message out of a PostgREST error body.
pub(crate) fn error_message_from_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => ["message", "error", "details", "hint"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .unwrap_or_else(|| value.to_string()),
        Err(_) if body.trim().is_empty() => "Query failed".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        let body = r#"{"code":"42703","message":"column \"nme\" does not exist","details":null}"#;
        assert_eq!(error_message_from_body(body), "column \"nme\" does not exist");
    }

    #[test]
    fn test_error_message_plain_text_body() {
        assert_eq!(error_message_from_body("  boom \n"), "boom");
        assert_eq!(error_message_from_body(""), "Query failed");
    }

    #[test]
    fn test_success_body_becomes_rows() {
        let outcome = outcome_from_status(StatusCode::OK, r#"[{"id":1}]"#).unwrap();
        assert_eq!(outcome, QueryOutcome::Rows(json!([{"id": 1}])));
    }

    #[test]
    fn test_empty_success_body_is_empty_row_set() {
        for body in ["", "  \n"] {
            let outcome = outcome_from_status(StatusCode::OK, body).unwrap();
            assert_eq!(outcome, QueryOutcome::Rows(json!([])));
        }
        let outcome = outcome_from_status(StatusCode::NO_CONTENT, "").unwrap();
        assert_eq!(outcome, QueryOutcome::Rows(json!([])));
    }

    #[test]
    fn test_unreadable_success_body_is_fault() {
        let result = outcome_from_status(StatusCode::OK, "<html>oops</html>");
        assert!(matches!(result, Err(GatewayError::BackendError(_))));
    }

    #[test]
    fn test_gateway_statuses_are_transport_faults() {
        for status in [
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            let result = outcome_from_status(status, r#"{"message":"denied"}"#);
            assert!(
                matches!(result, Err(GatewayError::BackendError(_))),
                "status {} should be fatal",
                status
            );
        }
    }

    #[test]
    fn test_other_error_statuses_are_database_failures() {
        let body = r#"{"code":"42P01","message":"relation \"repz\" does not exist"}"#;
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::CONFLICT,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let outcome = outcome_from_status(status, body).unwrap();
            assert_eq!(
                outcome,
                QueryOutcome::Failed("relation \"repz\" does not exist".to_string())
            );
        }
    }
}
