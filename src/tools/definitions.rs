use crate::guardrail::SqlGuardrail;
use serde_json::{json, Value};

pub const EXECUTE_SQL_TOOL: &str = "execute_sql";

/// Function definitions advertised to the model on every call.
pub fn format_tools_for_llm(guardrail: &SqlGuardrail) -> Vec<Value> {
    let tables = guardrail.allowed_tables().collect::<Vec<_>>().join(", ");
    vec![json!({
        "type": "function",
        "function": {
            "name": EXECUTE_SQL_TOOL,
            "description": format!(
                "Run a single PostgreSQL SELECT, UPDATE or INSERT statement against the \
                 commissions database and return the resulting rows as JSON. \
                 Only these tables are reachable: {}.",
                tables
            ),
            "parameters": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "One SQL statement. No comments, no DDL, no DELETE."
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }
        }
    })]
}
