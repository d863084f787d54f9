pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

pub fn default_api_timeout() -> u64 {
    60
}

pub fn default_db_timeout() -> u64 {
    30
}

pub fn default_max_iterations() -> usize {
    crate::orchestrator::DEFAULT_MAX_ITERATIONS
}

pub fn default_max_message_length() -> usize {
    2000
}

pub fn default_history_limit() -> usize {
    crate::session::DEFAULT_HISTORY_LIMIT
}

pub fn default_allowed_tables() -> Vec<String> {
    crate::guardrail::DEFAULT_ALLOWED_TABLES
        .iter()
        .map(|t| t.to_string())
        .collect()
}
