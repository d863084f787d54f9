use serde::Deserialize;
use std::fmt;

/// Arguments of the `execute_sql` tool after decoding.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SqlArguments {
    #[serde(default)]
    query: Option<String>,
}

impl SqlArguments {
    /// The query, if the model actually supplied one.
    pub fn query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode tool arguments: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Decodes the raw argument text the model attached to a tool call.
pub fn decode_arguments(raw: &str) -> Result<SqlArguments, DecodeError> {
    serde_json::from_str::<SqlArguments>(raw).map_err(|e| DecodeError {
        message: e.to_string(),
    })
}
