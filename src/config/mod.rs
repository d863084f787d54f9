mod api;
mod database;
mod defaults;
mod validation;

use crate::api::normalize_endpoint;
use crate::cli::Args;
use crate::error::{GatewayError, Result as GatewayResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use api::{ApiConfig, ModelConfig};
pub use database::{AgentConfig, DatabaseConfig};
pub use defaults::{DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
pub use validation::{expand_env_var_in_string, parse_flag, parse_table_list};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

pub struct Config {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub api_timeout: u64,
    pub verbose: bool,
    pub rpc_url: String,
    pub service_key: String,
    pub db_timeout: u64,
    pub allowed_tables: Vec<String>,
    pub max_iterations: usize,
    pub max_message_length: usize,
    pub history_limit: usize,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> GatewayResult<Self> {
        let json_config = JsonConfig::load().map_err(GatewayError::from)?;
        Self::from_parts(args, json_config)
    }

    /// Resolve every setting: CLI args > env vars > config file > defaults
    pub fn from_parts(args: &Args, json_config: JsonConfig) -> GatewayResult<Self> {
        // Secrets only ever come from the environment
        let api_key = env::var("OPENROUTER_API_KEY").map_err(|_| {
            GatewayError::ConfigError("OPENROUTER_API_KEY environment variable not set".into())
        })?;
        let service_key = env::var("SQLGATE_SERVICE_KEY").map_err(|_| {
            GatewayError::ConfigError("SQLGATE_SERVICE_KEY environment variable not set".into())
        })?;

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env::var("AI_API_ENDPOINT").ok())
            .or(json_config.api.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let model = args
            .model
            .clone()
            .or_else(|| env::var("AI_MODEL").ok())
            .or(json_config.model.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let system_prompt = env::var("AI_SYSTEM_PROMPT")
            .ok()
            .or(json_config.model.system_prompt.clone());

        let api_timeout = json_config
            .api
            .timeout_secs
            .unwrap_or_else(defaults::default_api_timeout);

        let verbose = args.verbose
            || env::var("AI_VERBOSE")
                .ok()
                .map(|v| parse_flag(&v))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        let rpc_url = env::var("SQLGATE_RPC_URL")
            .ok()
            .or(json_config.database.rpc_url.clone())
            .map(|url| expand_env_var_in_string(&url))
            .ok_or_else(|| {
                GatewayError::ConfigError(
                    "No database RPC URL configured (set SQLGATE_RPC_URL or database.rpc_url)"
                        .into(),
                )
            })?;

        let db_timeout = json_config
            .database
            .timeout_secs
            .unwrap_or_else(defaults::default_db_timeout);

        let max_iterations = env::var("SQLGATE_MAX_ITERATIONS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(json_config.agent.max_iterations);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            system_prompt,
            api_timeout,
            verbose,
            rpc_url,
            service_key,
            db_timeout,
            allowed_tables: resolve_allowed_tables(&json_config),
            max_iterations,
            max_message_length: json_config.agent.max_message_length,
            history_limit: json_config.agent.history_limit,
        })
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }
}

/// Table allowlist: env var > config file > built-in defaults
pub fn resolve_allowed_tables(json_config: &JsonConfig) -> Vec<String> {
    env::var("SQLGATE_ALLOWED_TABLES")
        .ok()
        .map(|v| parse_table_list(&v))
        .filter(|tables| !tables.is_empty())
        .or_else(|| json_config.database.allowed_tables.clone())
        .unwrap_or_else(defaults::default_allowed_tables)
}

pub const EXAMPLE_CONFIG: &str = r#"# sqlgate configuration
# Secrets are read from the environment only:
#   OPENROUTER_API_KEY   - model provider key
#   SQLGATE_SERVICE_KEY  - privileged database service key

api:
  endpoint: https://openrouter.ai/api/v1
  timeout_secs: 60

model:
  default_model: openai/gpt-4o-mini
  system_prompt: |
    You help the sales team answer questions about funded deals, reps and
    commission payouts. Use the execute_sql tool to look data up.

database:
  rpc_url: ${SUPABASE_URL}/rest/v1/rpc/execute_sql
  timeout_secs: 30
  allowed_tables:
    - funded_deals
    - reps
    - commission_payouts
    - commission_payout_reps
    - lenders

agent:
  max_iterations: 5
  max_message_length: 2000
  history_limit: 10

session:
  verbose: false
"#;

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: JsonConfig = if is_yaml {
            serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse YAML config file: {}", path.display())
            })?
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse JSON config file: {}", path.display())
            })?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // Current directory first (local override)
            PathBuf::from(".sqlgate.yaml"),
            PathBuf::from(".sqlgate.yml"),
            PathBuf::from(".sqlgate.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("sqlgate");
            paths.push(config_dir.join("sqlgate.yaml"));
            paths.push(config_dir.join("sqlgate.yml"));
            paths.push(config_dir.join("sqlgate.json"));
        }

        paths
    }

    /// Write the example config to `~/.config/sqlgate/sqlgate.yaml` unless one exists
    pub fn write_example() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        let config_dir = home_dir.join(".config").join("sqlgate");
        let path = config_dir.join("sqlgate.yaml");
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        fs::write(&path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
