use serde::{Deserialize, Serialize};

use super::defaults::{default_history_limit, default_max_iterations, default_max_message_length};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// RPC endpoint that executes one statement, e.g. `${SUPABASE_URL}/rest/v1/rpc/execute_sql`
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub allowed_tables: Option<Vec<String>>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_message_length: default_max_message_length(),
            history_limit: default_history_limit(),
        }
    }
}
