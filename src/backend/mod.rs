mod http;

pub use http::HttpRpcBackend;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// What the database made of a statement that already passed the guardrail.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Value),
    /// Rejected by the database itself (syntax, permissions, constraint).
    Failed(String),
}

impl QueryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

/// Privileged executor for validated SQL.
///
/// `Err` is reserved for transport faults; database-level errors come back as
/// `QueryOutcome::Failed` so the model can see them and try again.
#[async_trait]
pub trait SqlBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, query: &str) -> Result<QueryOutcome>;
}
