use serde::Serialize;
use std::fmt;

/// Statement kinds the gateway is willing to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlOperation {
    Select,
    Update,
    Insert,
}

impl SqlOperation {
    pub const ALL: [SqlOperation; 3] = [SqlOperation::Select, SqlOperation::Update, SqlOperation::Insert];

    pub fn as_str(&self) -> &'static str {
        match self {
            SqlOperation::Select => "SELECT",
            SqlOperation::Update => "UPDATE",
            SqlOperation::Insert => "INSERT",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked in this order; the first hit is the one reported.
pub const BLOCKED_KEYWORDS: [&str; 9] = [
    "DROP",
    "DELETE",
    "TRUNCATE",
    "ALTER",
    "CREATE",
    "GRANT",
    "REVOKE",
    "EXEC",
    "EXECUTE PROCEDURE",
];

pub const DEFAULT_ALLOWED_TABLES: [&str; 5] = [
    "funded_deals",
    "reps",
    "commission_payouts",
    "commission_payout_reps",
    "lenders",
];

/// Schema under which unqualified tables live; other schemas are never reachable.
pub const DEFAULT_SCHEMA: &str = "public";
