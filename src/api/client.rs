use crate::api::models::{ModelResponse, RequestBody};
use crate::api::response::parse_model_response;
use crate::error::{GatewayError, Result};
use crate::models::Message;
use async_trait::async_trait;
use colored::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// The language model as seen by the orchestrator.
///
/// Any `Err` is a fatal fault for the request in progress.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<ModelResponse>;
}

/// Chat-completions client for OpenRouter and other OpenAI-compatible endpoints.
pub struct OpenAiCompatibleModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    tools: Vec<Value>,
    verbose: bool,
}

impl OpenAiCompatibleModel {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        model: &str,
        tools: Vec<Value>,
        timeout_secs: u64,
        verbose: bool,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| GatewayError::Other(format!("Invalid authorization header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            tools,
            verbose,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    async fn complete(&self, messages: &[Message]) -> Result<ModelResponse> {
        let request_body = RequestBody {
            model: self.model.clone(),
            messages: messages.to_vec(),
            stream: false,
            tools: if self.tools.is_empty() {
                None
            } else {
                Some(self.tools.clone())
            },
            tool_choice: if self.tools.is_empty() {
                None
            } else {
                Some("auto".to_string())
            },
        };

        if self.verbose {
            eprintln!(
                "{}",
                format!(
                    "[AI] Request to {} ({} messages)",
                    self.model,
                    request_body.messages.len()
                )
                .dimmed()
            );
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        if self.verbose {
            eprintln!(
                "{}",
                format!("[AI] Response status: {}", response.status()).dimmed()
            );
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::ApiError {
                status,
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        if self.verbose {
            eprintln!("{}", format!("[AI] Raw response: {}", response_text).dimmed());
        }

        let response_json: Value = serde_json::from_str(&response_text)?;
        parse_model_response(&response_json, self.verbose)
    }
}

/// Accepts a base URL, a `/v1` URL, or a full chat-completions URL.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/chat/completions", endpoint)
    } else if endpoint.ends_with("/v1/") {
        format!("{}chat/completions", endpoint)
    } else {
        format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
    }
}
